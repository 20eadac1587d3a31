//! pollinet - find duplicate plant-pollinator networks
//!
//! Prints the number of networks retained after deduplication, or the whole
//! run report with `--json`.

use std::path::PathBuf;

use clap::Parser;
use pollinet_cli::{run, CliConfig, CliError};
use tracing_subscriber::EnvFilter;

/// Detect duplicate networks across CSV directories
#[derive(Parser)]
#[command(name = "pollinet", version)]
#[command(about = "Detect duplicate plant-pollinator networks")]
struct Cli {
    /// Directories holding one CSV file per network
    #[arg(required = true)]
    dirs: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Allowed share of missing interactions, relative to the mean network size
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Seed for random tie-breaks
    #[arg(long)]
    seed: Option<u64>,

    /// Treat interactions with different strengths as missing
    #[arg(long)]
    compare_values: bool,

    /// Treat interactions of unpaired taxa as missing
    #[arg(long)]
    count_unmapped: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn load_config(&self) -> Result<CliConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
                    path: path.clone(),
                    source,
                })?;
                CliConfig::from_toml(&text)?
            }
            None => CliConfig::default(),
        };

        let classifier = &mut config.dedup.classifier;
        if let Some(threshold) = self.threshold {
            classifier.threshold_fraction = threshold;
        }
        if self.compare_values {
            classifier.compare.compare_values = true;
        }
        if self.count_unmapped {
            classifier.compare.count_unmapped_as_missing = true;
        }
        if self.seed.is_some() {
            config.dedup.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries the result
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    let summary = run(&cli.dirs, &config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.retained_count());
    }

    Ok(())
}
