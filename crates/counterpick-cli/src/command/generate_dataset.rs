use std::path::PathBuf;

use anyhow::Context;
use counterpick_dataset::generator::DatasetGenerator;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GenerateDatasetArg {
    /// Catalog JSON file with combatants and moves
    #[arg(long)]
    catalog: PathBuf,
    /// Generator config JSON file; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    /// Level the rounds are fought at
    #[arg(long)]
    level: Option<u8>,
    /// Retained majority records per minority record
    #[arg(long)]
    target_ratio: Option<f64>,
    /// Sample at most this many ordered pairs
    #[arg(long)]
    max_pairs: Option<usize>,
    /// Worker threads (0 = available parallelism)
    #[arg(long)]
    threads: Option<usize>,
    /// Keep every record instead of balancing the labels
    #[arg(long)]
    no_balance: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &GenerateDatasetArg) -> anyhow::Result<()> {
    let GenerateDatasetArg {
        catalog,
        config,
        seed,
        level,
        target_ratio,
        max_pairs,
        threads,
        no_balance,
        output,
    } = arg;

    let catalog = util::read_catalog_file(catalog)?;
    let mut config = util::read_generator_config(config.as_deref())?;
    if let Some(seed) = seed {
        config.seed = *seed;
    }
    if let Some(level) = level {
        config.level = *level;
    }
    if let Some(target_ratio) = target_ratio {
        config.target_ratio = *target_ratio;
    }
    if max_pairs.is_some() {
        config.max_pairs = *max_pairs;
    }
    if let Some(threads) = threads {
        config.threads = *threads;
    }
    if *no_balance {
        config.balance = false;
    }

    let generator = DatasetGenerator::new(&catalog, config).context("Invalid generator config")?;
    let dataset = generator
        .generate()
        .context("Failed to generate matchup dataset")?;
    Output::save_json(&dataset, output.clone())?;

    eprintln!();
    eprintln!("Dataset saved successfully");
    if let Some(path) = &output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Records: {}", dataset.summary.records);
    eprintln!(
        "  Labels: {} A wins / {} B wins",
        dataset.summary.positive, dataset.summary.negative
    );
    eprintln!("  Skipped pairs: {}", dataset.summary.skipped_pairs);

    Ok(())
}
