//! pollinet-cli - Command-line driver for pollinet-dedup
//!
//! Loads CSV networks from directories, cleans unidentified taxa and runs the
//! corpus deduplicator. All matching logic lives in `pollinet-dedup`.

pub mod clean;
pub mod error;
pub mod ingest;

use std::path::PathBuf;

use pollinet_dedup::{resolve_duplicates_seeded, ConfigError, DedupConfig, ResolutionReport};
use serde::{Deserialize, Serialize};

pub use clean::{clean_corpus, clean_network, is_unidentified, unidentified_rate, CleaningConfig};
pub use error::{CliError, Result};
pub use ingest::{load_corpus, read_network, LoadedCorpus, RejectedFile};

/// Configuration file contents: the engine settings plus a `[cleaning]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(flatten)]
    pub dedup: DedupConfig,
    pub cleaning: CleaningConfig,
}

impl CliConfig {
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.dedup.validate()?;
        self.cleaning.validate()
    }
}

/// Everything a run decided
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub networks_loaded: usize,
    /// Files skipped because a network of the same name was already loaded
    pub duplicate_files: Vec<String>,
    /// Files that do not hold a valid network
    pub rejected_files: Vec<RejectedFile>,
    /// Networks flagged for too many unidentified taxa
    pub partial: Vec<String>,
    pub report: ResolutionReport,
    pub retained: Vec<String>,
}

impl RunSummary {
    pub fn retained_count(&self) -> usize {
        self.retained.len()
    }
}

/// Load, clean and deduplicate the networks of `dirs`
pub fn run(dirs: &[PathBuf], config: &CliConfig) -> Result<RunSummary> {
    config.validate()?;

    let LoadedCorpus {
        corpus,
        duplicate_names,
        rejected,
    } = load_corpus(dirs)?;
    tracing::info!("loaded {} networks", corpus.len());

    let (cleaned, partial) = clean_corpus(&corpus, &config.cleaning)?;
    let report = resolve_duplicates_seeded(
        &cleaned,
        &config.dedup.classifier,
        &partial,
        config.dedup.seed_or_default(),
    )?;
    let retained: Vec<String> = report
        .retained(&cleaned)
        .into_iter()
        .map(str::to_string)
        .collect();
    tracing::info!(
        "{} duplicates, {} partial, {} retained",
        report.duplicates.len(),
        partial.len(),
        retained.len()
    );

    let mut partial: Vec<String> = partial.into_iter().collect();
    partial.sort();

    Ok(RunSummary {
        networks_loaded: cleaned.len(),
        duplicate_files: duplicate_names,
        rejected_files: rejected,
        partial,
        report,
        retained,
    })
}
