//! Duplicate classification for one pair of networks
//!
//! Gates run cheapest first and stop at the first failure:
//!
//! 1. row count, 2. column count (pure size comparison)
//! 3. row and column mapping coverage (node matching)
//! 4. interaction agreement (matrix comparison)
//!
//! Every gate tolerates a discrepancy of `threshold_fraction` times the mean
//! of the compared quantity, so the test does not depend on network size.

use serde::{Deserialize, Serialize};

use crate::compare::{compare_interactions, CompareOptions, InteractionDiff};
use crate::error::{ConfigError, DedupError, Result};
use crate::matcher::match_node_set;
use crate::network::NetworkTable;
use crate::taxon::parse_taxon;

/// Classifier parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Tolerated discrepancy, as a fraction of the mean compared size
    pub threshold_fraction: f64,
    /// Interaction comparison flags
    pub compare: CompareOptions,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold_fraction: 0.05,
            compare: CompareOptions::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn with_threshold(threshold_fraction: f64) -> Self {
        Self {
            threshold_fraction,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.threshold_fraction.is_finite() || self.threshold_fraction < 0.0 {
            return Err(ConfigError::OutOfRange(format!(
                "threshold_fraction must be a non-negative number, got {}",
                self.threshold_fraction
            )));
        }
        Ok(())
    }
}

/// Why a pair was judged distinct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MismatchReason {
    RowSizeMismatch,
    ColSizeMismatch,
    RowMappingFailure,
    ColMappingFailure,
    InteractionMismatch,
}

impl std::fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowSizeMismatch => write!(f, "row-size-mismatch"),
            Self::ColSizeMismatch => write!(f, "col-size-mismatch"),
            Self::RowMappingFailure => write!(f, "row-mapping-failure"),
            Self::ColMappingFailure => write!(f, "col-mapping-failure"),
            Self::InteractionMismatch => write!(f, "interaction-mismatch"),
        }
    }
}

/// Outcome of classifying one pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum DuplicateVerdict {
    Duplicate,
    Distinct(MismatchReason),
}

impl DuplicateVerdict {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate)
    }

    pub fn reason(&self) -> Option<MismatchReason> {
        match self {
            Self::Duplicate => None,
            Self::Distinct(reason) => Some(*reason),
        }
    }
}

/// Verdict plus the measurements gathered on the way
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairComparison {
    pub verdict: DuplicateVerdict,
    pub unmapped_rows: Option<usize>,
    pub unmapped_cols: Option<usize>,
    pub interactions: Option<InteractionDiff>,
}

impl PairComparison {
    fn rejected(reason: MismatchReason) -> Self {
        Self {
            verdict: DuplicateVerdict::Distinct(reason),
            unmapped_rows: None,
            unmapped_cols: None,
            interactions: None,
        }
    }
}

/// Decide whether two networks record the same observations
pub fn are_duplicates(
    net1: &NetworkTable,
    net2: &NetworkTable,
    config: &ClassifierConfig,
) -> Result<DuplicateVerdict> {
    classify_pair(net1, net2, config).map(|c| c.verdict)
}

/// Same as `are_duplicates`, keeping the intermediate measurements
pub fn classify_pair(
    net1: &NetworkTable,
    net2: &NetworkTable,
    config: &ClassifierConfig,
) -> Result<PairComparison> {
    config.validate()?;
    for net in [net1, net2] {
        if net.n_rows() == 0 || net.n_cols() == 0 {
            return Err(DedupError::DegenerateNetwork {
                rows: net.n_rows(),
                cols: net.n_cols(),
            });
        }
    }

    let t = config.threshold_fraction;
    let mean_rows = mean(net1.n_rows(), net2.n_rows());
    let mean_cols = mean(net1.n_cols(), net2.n_cols());

    let row_gap = net1.n_rows().abs_diff(net2.n_rows());
    if exceeds(row_gap, t, mean_rows) {
        tracing::debug!("row counts differ by {} (mean {:.1})", row_gap, mean_rows);
        return Ok(PairComparison::rejected(MismatchReason::RowSizeMismatch));
    }
    let col_gap = net1.n_cols().abs_diff(net2.n_cols());
    if exceeds(col_gap, t, mean_cols) {
        tracing::debug!("column counts differ by {} (mean {:.1})", col_gap, mean_cols);
        return Ok(PairComparison::rejected(MismatchReason::ColSizeMismatch));
    }

    // Greedy matching depends on which side is scanned first; run it in a
    // canonical direction so the verdict is independent of argument order.
    let swapped = (net2.rows(), net2.cols()) < (net1.rows(), net1.cols());
    let (left, right) = if swapped { (net2, net1) } else { (net1, net2) };

    let rows = match_node_set(left.rows(), right.rows())?;
    let cols = match_node_set(left.cols(), right.cols())?;
    let unmapped_rows = rows.unmapped_count();
    let unmapped_cols = cols.unmapped_count();

    let mut comparison = PairComparison {
        verdict: DuplicateVerdict::Duplicate,
        unmapped_rows: Some(unmapped_rows),
        unmapped_cols: Some(unmapped_cols),
        interactions: None,
    };

    if exceeds(unmapped_rows, t, mean_rows) {
        tracing::debug!("{} plants without a counterpart", unmapped_rows);
        comparison.verdict = DuplicateVerdict::Distinct(MismatchReason::RowMappingFailure);
        return Ok(comparison);
    }
    if exceeds(unmapped_cols, t, mean_cols) {
        tracing::debug!("{} pollinators without a counterpart", unmapped_cols);
        comparison.verdict = DuplicateVerdict::Distinct(MismatchReason::ColMappingFailure);
        return Ok(comparison);
    }

    let mut diff = compare_interactions(left, right, &rows, &cols, config.compare);
    if swapped {
        diff = diff.swapped();
    }
    comparison.interactions = Some(diff);
    if exceeds(diff.missing(), t, diff.mean_total()) {
        tracing::debug!(
            "{} interactions disagree (mean {:.1} interactions)",
            diff.missing(),
            diff.mean_total()
        );
        comparison.verdict = DuplicateVerdict::Distinct(MismatchReason::InteractionMismatch);
    }

    Ok(comparison)
}

/// Check that a network can take part in a comparison at all
pub fn check_network(net: &NetworkTable) -> Result<()> {
    if net.n_rows() == 0 || net.n_cols() == 0 {
        return Err(DedupError::DegenerateNetwork {
            rows: net.n_rows(),
            cols: net.n_cols(),
        });
    }
    for label in net.rows().iter().chain(net.cols()) {
        parse_taxon(label)?;
    }
    Ok(())
}

fn mean(a: usize, b: usize) -> f64 {
    (a + b) as f64 / 2.0
}

fn exceeds(discrepancy: usize, fraction: f64, mean: f64) -> bool {
    discrepancy as f64 > fraction * mean
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn table(rows: &[&str], cols: &[&str], matrix: Vec<Vec<f64>>) -> NetworkTable {
        NetworkTable::new(labels(rows), labels(cols), matrix).unwrap()
    }

    fn square(rows: &[&str]) -> NetworkTable {
        let n = rows.len();
        let cols: Vec<String> = (0..n).map(|i| format!("Bombus sp{i}")).collect();
        let matrix = (0..n)
            .map(|r| (0..n).map(|c| if r == c { 1.0 } else { 0.0 }).collect())
            .collect();
        NetworkTable::new(labels(rows), cols, matrix).unwrap()
    }

    #[test]
    fn identical_tables_are_duplicates() {
        let a = square(&["p1", "p2", "p3"]);
        let c = classify_pair(&a, &a, &ClassifierConfig::default()).unwrap();
        assert!(c.verdict.is_duplicate());
        let diff = c.interactions.unwrap();
        assert_eq!(diff.missing_in_1, 0);
        assert_eq!(diff.missing_in_2, 0);
    }

    #[test]
    fn row_size_gate() {
        let a = square(&["p1", "p2"]);
        let b = table(&["p1", "p2", "p3"], &["Bombus sp0", "Bombus sp1"], vec![vec![1.0, 0.0]; 3]);
        assert_eq!(
            are_duplicates(&a, &b, &ClassifierConfig::default()).unwrap(),
            DuplicateVerdict::Distinct(MismatchReason::RowSizeMismatch)
        );
    }

    #[test]
    fn col_size_gate() {
        let a = square(&["p1", "p2"]);
        let b = table(&["p1", "p2"], &["x", "y", "z"], vec![vec![1.0, 0.0, 0.0]; 2]);
        assert_eq!(
            are_duplicates(&a, &b, &ClassifierConfig::default()).unwrap().reason(),
            Some(MismatchReason::ColSizeMismatch)
        );
    }

    #[test]
    fn row_mapping_gate() {
        let a = square(&["P1", "P2", "P3"]);
        let b = square(&["P1", "P2", "P4"]);
        let c = classify_pair(&a, &b, &ClassifierConfig::with_threshold(0.05)).unwrap();
        assert_eq!(
            c.verdict,
            DuplicateVerdict::Distinct(MismatchReason::RowMappingFailure)
        );
        assert_eq!(c.unmapped_rows, Some(2));
    }

    #[test]
    fn interaction_gate() {
        let a = square(&["p1", "p2", "p3"]);
        let mut matrix = vec![vec![0.0; 3]; 3];
        matrix[0][1] = 1.0;
        let b = table(
            &["p1", "p2", "p3"],
            &["Bombus sp0", "Bombus sp1", "Bombus sp2"],
            matrix,
        );
        assert_eq!(
            are_duplicates(&a, &b, &ClassifierConfig::default()).unwrap(),
            DuplicateVerdict::Distinct(MismatchReason::InteractionMismatch)
        );
    }

    #[test]
    fn generous_threshold_accepts_small_differences() {
        let a = square(&["p1", "p2", "p3", "p4"]);
        let b = square(&["p1", "p2", "p3", "p5"]);
        let strict = are_duplicates(&a, &b, &ClassifierConfig::with_threshold(0.05)).unwrap();
        let loose = are_duplicates(&a, &b, &ClassifierConfig::with_threshold(0.5)).unwrap();
        assert!(!strict.is_duplicate());
        assert!(loose.is_duplicate());
    }

    #[test]
    fn degenerate_network_is_an_error() {
        let empty = table(&[], &["x"], vec![]);
        let a = square(&["p1"]);
        assert_eq!(
            are_duplicates(&empty, &a, &ClassifierConfig::default()),
            Err(DedupError::DegenerateNetwork { rows: 0, cols: 1 })
        );
        assert!(are_duplicates(&a, &empty, &ClassifierConfig::default()).is_err());
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let a = square(&["p1"]);
        assert!(matches!(
            are_duplicates(&a, &a, &ClassifierConfig::with_threshold(-0.1)),
            Err(DedupError::InvalidConfig(_))
        ));
    }

    #[test]
    fn verdict_serializes_with_reason() {
        let v = DuplicateVerdict::Distinct(MismatchReason::RowMappingFailure);
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            r#"{"verdict":"distinct","reason":"row-mapping-failure"}"#
        );
    }
}
