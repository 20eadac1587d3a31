//! Interaction comparison between two networks through node mappings

use serde::{Deserialize, Serialize};

use crate::matcher::NodeMapping;
use crate::network::NetworkTable;

/// How interactions are compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Count an interaction as missing when the other network records it
    /// with a different strength
    pub compare_values: bool,
    /// Count interactions of unpaired plants or pollinators as missing
    pub count_unmapped_as_missing: bool,
}

/// Discrepancy counts between two networks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InteractionDiff {
    /// Interactions of the second network absent from the first
    pub missing_in_1: usize,
    /// Interactions of the first network absent from the second
    pub missing_in_2: usize,
    /// Nonzero cells of the first network
    pub total_in_1: usize,
    /// Nonzero cells of the second network
    pub total_in_2: usize,
}

impl InteractionDiff {
    pub fn missing(&self) -> usize {
        self.missing_in_1 + self.missing_in_2
    }

    pub fn mean_total(&self) -> f64 {
        (self.total_in_1 + self.total_in_2) as f64 / 2.0
    }

    /// The same counts with the two networks' roles exchanged
    pub fn swapped(self) -> Self {
        Self {
            missing_in_1: self.missing_in_2,
            missing_in_2: self.missing_in_1,
            total_in_1: self.total_in_2,
            total_in_2: self.total_in_1,
        }
    }
}

/// Compare the interactions of two networks.
///
/// `rows` and `cols` map labels of `net1` (left) to labels of `net2`
/// (right). Each network's nonzero cells are looked up in the other one
/// through the mappings; the two passes are independent.
pub fn compare_interactions(
    net1: &NetworkTable,
    net2: &NetworkTable,
    rows: &NodeMapping,
    cols: &NodeMapping,
    options: CompareOptions,
) -> InteractionDiff {
    let (total_in_1, missing_in_2) = count_missing(
        net1,
        net2,
        |r| rows.target(r),
        |c| cols.target(c),
        options,
    );
    let (total_in_2, missing_in_1) = count_missing(
        net2,
        net1,
        |r| rows.source(r),
        |c| cols.source(c),
        options,
    );

    InteractionDiff {
        missing_in_1,
        missing_in_2,
        total_in_1,
        total_in_2,
    }
}

/// Returns `(total interactions in from, interactions of from missing in to)`
fn count_missing<'m, R, C>(
    from: &NetworkTable,
    to: &NetworkTable,
    map_row: R,
    map_col: C,
    options: CompareOptions,
) -> (usize, usize)
where
    R: Fn(&str) -> Option<&'m str>,
    C: Fn(&str) -> Option<&'m str>,
{
    let mut total = 0;
    let mut missing = 0;

    for (row, col, value) in from.interactions() {
        total += 1;
        let (Some(mapped_row), Some(mapped_col)) = (map_row(row), map_col(col)) else {
            if options.count_unmapped_as_missing {
                missing += 1;
            }
            continue;
        };

        let other = to.get(mapped_row, mapped_col).unwrap_or(0.0);
        if other == 0.0 || (options.compare_values && other != value) {
            missing += 1;
        }
    }

    (total, missing)
}
