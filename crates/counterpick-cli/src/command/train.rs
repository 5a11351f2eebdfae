use std::path::PathBuf;

use anyhow::Context;
use counterpick_training::trainer;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Labeled dataset produced by `generate-dataset`
    #[arg(long)]
    dataset: PathBuf,
    /// Training config JSON file; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// Model name recorded in the bundle
    #[arg(long, default_value = "counterpick")]
    name: String,
    #[arg(long)]
    seed: Option<u64>,
    /// Share of each label held out for evaluation
    #[arg(long)]
    test_fraction: Option<f64>,
    #[arg(long)]
    learning_rate: Option<f64>,
    #[arg(long)]
    epochs: Option<usize>,
    /// L2 penalty on the weights
    #[arg(long)]
    l2: Option<f64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        dataset,
        config,
        name,
        seed,
        test_fraction,
        learning_rate,
        epochs,
        l2,
        output,
    } = arg;

    let dataset = util::read_dataset_file(dataset)?;
    let mut config = util::read_training_config(config.as_deref())?;
    if let Some(seed) = seed {
        config.seed = *seed;
    }
    if let Some(test_fraction) = test_fraction {
        config.test_fraction = *test_fraction;
    }
    if let Some(learning_rate) = learning_rate {
        config.learning_rate = *learning_rate;
    }
    if let Some(epochs) = epochs {
        config.epochs = *epochs;
    }
    if let Some(l2) = l2 {
        config.l2 = *l2;
    }

    let bundle = trainer::train_bundle(name, &dataset, &config)
        .context("Failed to train model bundle")?;
    Output::save_json(&bundle, output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", bundle.name);
    eprintln!("  Trained at: {}", bundle.trained_at);
    eprintln!("  Features: {} columns", bundle.features.columns().len());
    for (partition, metrics) in &bundle.metadata.metrics {
        eprintln!(
            "  {partition}: accuracy {:.3}, log-loss {:.4}, AUC {}",
            metrics.accuracy,
            metrics.log_loss,
            metrics
                .roc_auc
                .map_or_else(|| "n/a".to_owned(), |auc| format!("{auc:.3}")),
        );
    }

    Ok(())
}
