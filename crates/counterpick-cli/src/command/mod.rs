use clap::{Parser, Subcommand};

use self::{
    generate_dataset::GenerateDatasetArg, inspect_bundle::InspectBundleArg,
    recommend::RecommendArg, train::TrainArg,
};

mod generate_dataset;
mod inspect_bundle;
mod recommend;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Simulate every matchup in a catalog and write a labeled dataset
    GenerateDataset(#[clap(flatten)] GenerateDatasetArg),
    /// Train a model bundle from a labeled dataset
    Train(#[clap(flatten)] TrainArg),
    /// Rank an attacker's moves against a defender
    Recommend(#[clap(flatten)] RecommendArg),
    /// Print the metadata and feature schema of a model bundle
    InspectBundle(#[clap(flatten)] InspectBundleArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::GenerateDataset(arg) => generate_dataset::run(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Recommend(arg) => recommend::run(&arg)?,
        Mode::InspectBundle(arg) => inspect_bundle::run(&arg)?,
    }
    Ok(())
}
