//! Unidentified-taxon cleaning
//!
//! Field studies often record taxa only as "Unidentified ...". Networks where
//! too many plants (or pollinators) are unidentified are flagged as partial
//! and kept out of the duplicate pass; the unidentified rows or columns of
//! the remaining networks are optionally dropped.

use std::collections::HashSet;

use pollinet_dedup::{ConfigError, Corpus, NetworkTable};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const UNIDENTIFIED_PREFIX: &str = "unidentified";

/// Cleaning thresholds and switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Flag a network whose unidentified plant rate exceeds this
    pub plant_threshold: f64,
    /// Flag a network whose unidentified pollinator rate exceeds this
    pub pollinator_threshold: f64,
    pub drop_unidentified_plants: bool,
    pub drop_unidentified_pollinators: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            plant_threshold: 0.25,
            pollinator_threshold: 1.0,
            drop_unidentified_plants: true,
            drop_unidentified_pollinators: false,
        }
    }
}

impl CleaningConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        for (name, value) in [
            ("plant_threshold", self.plant_threshold),
            ("pollinator_threshold", self.pollinator_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

pub fn is_unidentified(label: &str) -> bool {
    label
        .trim_start()
        .get(..UNIDENTIFIED_PREFIX.len())
        .map(|head| head.eq_ignore_ascii_case(UNIDENTIFIED_PREFIX))
        .unwrap_or(false)
}

/// Share of unidentified labels; 0 for an empty axis
pub fn unidentified_rate(labels: &[String]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let count = labels.iter().filter(|l| is_unidentified(l)).count();
    count as f64 / labels.len() as f64
}

/// Outcome of cleaning one network
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedNetwork {
    pub table: NetworkTable,
    /// Too many unidentified taxa to take part in duplicate detection
    pub partial: bool,
    pub plant_rate: f64,
    pub pollinator_rate: f64,
}

/// Rates are measured on the table as loaded, before anything is dropped.
pub fn clean_network(table: &NetworkTable, config: &CleaningConfig) -> CleanedNetwork {
    let plant_rate = unidentified_rate(table.rows());
    let pollinator_rate = unidentified_rate(table.cols());
    let partial =
        plant_rate > config.plant_threshold || pollinator_rate > config.pollinator_threshold;

    let table = if config.drop_unidentified_plants || config.drop_unidentified_pollinators {
        table.retain_labels(
            |row| !(config.drop_unidentified_plants && is_unidentified(row)),
            |col| !(config.drop_unidentified_pollinators && is_unidentified(col)),
        )
    } else {
        table.clone()
    };

    CleanedNetwork {
        table,
        partial,
        plant_rate,
        pollinator_rate,
    }
}

/// Clean every network of a corpus. Returns the cleaned corpus, in the same
/// order, and the names of the partial networks.
pub fn clean_corpus(corpus: &Corpus, config: &CleaningConfig) -> Result<(Corpus, HashSet<String>)> {
    config.validate()?;

    let mut cleaned = Corpus::new();
    let mut partial = HashSet::new();
    for (name, table) in corpus.iter() {
        let result = clean_network(table, config);
        if result.partial {
            tracing::info!(
                "{} flagged as partial (unidentified plants {:.2}, pollinators {:.2})",
                name,
                result.plant_rate,
                result.pollinator_rate
            );
            partial.insert(name.to_string());
        }
        cleaned.insert(name, result.table)?;
    }
    Ok((cleaned, partial))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> NetworkTable {
        NetworkTable::new(
            labels(&["Cistus albidus", "Unidentified plant", "Thymus vulgaris"]),
            labels(&["Apis mellifera", "unidentified Diptera"]),
            vec![vec![1.0, 0.0], vec![2.0, 1.0], vec![0.0, 3.0]],
        )
        .unwrap()
    }

    #[test]
    fn prefix_is_case_insensitive() {
        assert!(is_unidentified("Unidentified"));
        assert!(is_unidentified("UNIDENTIFIED sp1"));
        assert!(!is_unidentified("Apis unidentified"));
        assert!(!is_unidentified("Unid"));
    }

    #[test]
    fn empty_axis_rate_is_zero() {
        assert_eq!(unidentified_rate(&[]), 0.0);
        assert_eq!(unidentified_rate(&labels(&["Unidentified", "Apis"])), 0.5);
    }

    #[test]
    fn drops_plant_rows_by_default() {
        let result = clean_network(&sample(), &CleaningConfig::default());
        assert!(result.partial);
        assert_eq!(result.table.n_rows(), 2);
        assert_eq!(result.table.n_cols(), 2);
        assert_eq!(result.table.get("Unidentified plant", "Apis mellifera"), None);
        assert_eq!(result.table.get("Thymus vulgaris", "unidentified Diptera"), Some(3.0));
    }

    #[test]
    fn rate_below_threshold_is_not_partial() {
        let config = CleaningConfig {
            plant_threshold: 0.5,
            drop_unidentified_pollinators: true,
            ..Default::default()
        };
        let result = clean_network(&sample(), &config);
        assert!(!result.partial);
        assert_eq!(result.table.cols(), &["Apis mellifera".to_string()]);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let config = CleaningConfig {
            plant_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange(_))));
    }
}
