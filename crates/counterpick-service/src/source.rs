use std::path::{Path, PathBuf};

use counterpick_evaluator::bundle::{BundleError, ModelBundle};

/// Where a [`PredictionService`](crate::PredictionService) gets its bundle from.
///
/// `load` is called at most once per service.
pub trait BundleSource: Send + Sync {
    fn load(&self) -> Result<ModelBundle, BundleError>;
}

/// Reads the bundle from a JSON file.
#[derive(Debug, Clone)]
pub struct FileBundleSource {
    path: PathBuf,
}

impl FileBundleSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BundleSource for FileBundleSource {
    fn load(&self) -> Result<ModelBundle, BundleError> {
        ModelBundle::open(&self.path)
    }
}

/// A bundle that is already in memory. It is still validated on load.
#[derive(Debug, Clone)]
pub struct PreloadedBundle(pub ModelBundle);

impl BundleSource for PreloadedBundle {
    fn load(&self) -> Result<ModelBundle, BundleError> {
        self.0.validate()?;
        Ok(self.0.clone())
    }
}
