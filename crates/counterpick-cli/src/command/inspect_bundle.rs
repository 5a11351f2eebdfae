use std::{collections::BTreeMap, path::PathBuf};

use chrono::{DateTime, Utc};
use counterpick_evaluator::bundle::{BundleMetadata, ModelBundle};
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct InspectBundleArg {
    /// Model bundle to inspect
    #[arg(long)]
    bundle: PathBuf,
    /// Include the full column list
    #[arg(long)]
    columns: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BundleSummary<'a> {
    name: &'a str,
    format_version: u32,
    trained_at: DateTime<Utc>,
    classifier: &'static str,
    column_count: usize,
    /// Observed values per categorical slot.
    vocabulary_sizes: BTreeMap<&'a str, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<&'a [String]>,
    metadata: &'a BundleMetadata,
}

impl<'a> BundleSummary<'a> {
    fn new(bundle: &'a ModelBundle, with_columns: bool) -> Self {
        Self {
            name: &bundle.name,
            format_version: bundle.format_version,
            trained_at: bundle.trained_at,
            classifier: bundle.classifier.family(),
            column_count: bundle.features.columns().len(),
            vocabulary_sizes: bundle
                .features
                .vocabulary()
                .iter()
                .map(|(slot, values)| (slot.as_str(), values.len()))
                .collect(),
            columns: with_columns.then(|| bundle.features.columns()),
            metadata: &bundle.metadata,
        }
    }
}

pub(crate) fn run(arg: &InspectBundleArg) -> anyhow::Result<()> {
    let InspectBundleArg {
        bundle,
        columns,
        output,
    } = arg;

    let bundle = util::read_bundle_file(bundle)?;
    let summary = BundleSummary::new(&bundle, *columns);

    eprintln!("Bundle: {}", summary.name);
    eprintln!("  Format version: {}", summary.format_version);
    eprintln!("  Trained at: {}", summary.trained_at);
    eprintln!("  Classifier: {}", summary.classifier);
    eprintln!("  Features: {} columns", summary.column_count);
    eprintln!(
        "  Round: level {}, seed {}",
        bundle.metadata.round.level, bundle.metadata.round.seed
    );
    if let Some(dataset) = &bundle.metadata.dataset {
        eprintln!(
            "  Dataset: {} records ({} / {}), {} skipped pairs",
            dataset.records, dataset.positive, dataset.negative, dataset.skipped_pairs
        );
    }

    Output::save_json(&summary, output.clone())?;
    Ok(())
}
