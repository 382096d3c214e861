//! GraphStorm CLI - resolve and check a GraphStorm run configuration
//!
//! Loads the YAML config file, applies the command line overrides the
//! training and inference launchers accept, verifies the result and prints
//! the resolved tasks and hyperparameters.

mod summary;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use graphstorm_config::{GsArgs, GsConfig};
use tracing::debug;

/// Check a GraphStorm configuration the way a launcher would resolve it.
#[derive(Parser, Debug)]
#[command(
    name = "graphstorm-cli",
    author,
    version,
    about = "GraphStorm - resolve and verify a run configuration"
)]
struct Cli {
    /// Verify for inference, skipping training-only settings
    #[arg(long)]
    inference: bool,

    /// Print the resolved configuration as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    args: GsArgs,
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let yaml = cli.args.yaml_config_file.display().to_string();
    let config = GsConfig::from_args(&cli.args).with_context(|| format!("Failed to load configuration {yaml}"))?;
    config.verify_arguments(!cli.inference).with_context(|| format!("Invalid configuration {yaml}"))?;
    debug!("Configuration {} verified", yaml);

    let summary = summary::RunSummary::collect(&config, cli.inference)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print();
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            for cause in e.chain().skip(1) {
                eprintln!("  {} {}", "caused by:".dimmed(), cause);
            }
            ExitCode::FAILURE
        }
    }
}
