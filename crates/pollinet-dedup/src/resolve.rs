//! Corpus-wide duplicate resolution
//!
//! Every pair of networks still in play is classified once, in corpus
//! insertion order. When a pair is a duplicate the smaller network is
//! excluded and takes no further part in the pass.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::classify::{are_duplicates, check_network, ClassifierConfig};
use crate::error::Result;
use crate::network::{Corpus, NetworkTable};

/// Which member of a pair was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropSide {
    First,
    Second,
}

/// The rule that settled a tie-break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakRule {
    MorePlants,
    MorePollinators,
    Random,
}

/// Pick the network to drop from a duplicate pair.
///
/// Keeps the one with more plant rows, then more pollinator columns, and
/// flips a coin from `rng` when both sizes agree.
pub fn tie_break<R: Rng + ?Sized>(
    first: &NetworkTable,
    second: &NetworkTable,
    rng: &mut R,
) -> (DropSide, TieBreakRule) {
    let drop_smaller = |ordering: Ordering| match ordering {
        Ordering::Less => Some(DropSide::First),
        Ordering::Greater => Some(DropSide::Second),
        Ordering::Equal => None,
    };

    if let Some(drop) = drop_smaller(first.n_rows().cmp(&second.n_rows())) {
        return (drop, TieBreakRule::MorePlants);
    }
    if let Some(drop) = drop_smaller(first.n_cols().cmp(&second.n_cols())) {
        return (drop, TieBreakRule::MorePollinators);
    }
    let drop = if rng.gen_bool(0.5) {
        DropSide::Second
    } else {
        DropSide::First
    };
    (drop, TieBreakRule::Random)
}

/// A duplicate pair and how it was resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPair {
    pub kept: String,
    pub dropped: String,
    pub rule: TieBreakRule,
}

/// A pair whose classification failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErroredPair {
    pub first: String,
    pub second: String,
    pub error: String,
}

/// Result of a resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    /// Pre-excluded names plus every network dropped as a duplicate
    pub excluded: BTreeSet<String>,
    /// Duplicate pairs in the order they were found
    pub duplicates: Vec<ResolvedPair>,
    /// Pairs that could not be classified
    pub errored: Vec<ErroredPair>,
    /// Networks blamed for an errored pair, left out of the pass for review
    pub held_back: BTreeSet<String>,
}

impl ResolutionReport {
    /// Networks to keep for downstream analysis, in corpus order.
    ///
    /// Neither excluded nor held back networks are retained.
    pub fn retained<'c>(&self, corpus: &'c Corpus) -> Vec<&'c str> {
        corpus
            .names()
            .iter()
            .map(String::as_str)
            .filter(|name| !self.excluded.contains(*name) && !self.held_back.contains(*name))
            .collect()
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }

    fn is_out(&self, name: &str) -> bool {
        self.excluded.contains(name) || self.held_back.contains(name)
    }
}

/// Classify every remaining pair of the corpus and exclude duplicates.
///
/// `pre_excluded` names (e.g. networks with too many unidentified taxa) are
/// never compared. A pair that fails to classify is logged and reported but
/// does not stop the pass: the network that fails on its own is held back
/// (both, if neither does) and skipped from then on.
pub fn resolve_duplicates<R: Rng + ?Sized>(
    corpus: &Corpus,
    config: &ClassifierConfig,
    pre_excluded: &HashSet<String>,
    rng: &mut R,
) -> Result<ResolutionReport> {
    config.validate()?;

    let mut report = ResolutionReport {
        excluded: pre_excluded.iter().cloned().collect(),
        ..Default::default()
    };
    let names = corpus.names();

    for (i, first_name) in names.iter().enumerate() {
        if report.is_out(first_name) {
            continue;
        }
        let Some(first) = corpus.get(first_name) else {
            continue;
        };

        for second_name in &names[i + 1..] {
            if report.is_out(second_name) {
                continue;
            }
            let Some(second) = corpus.get(second_name) else {
                continue;
            };

            let verdict = match are_duplicates(first, second, config) {
                Ok(verdict) => verdict,
                Err(e) => {
                    tracing::warn!("cannot compare {} with {}: {}", first_name, second_name, e);
                    report.errored.push(ErroredPair {
                        first: first_name.clone(),
                        second: second_name.clone(),
                        error: e.to_string(),
                    });
                    let mut blamed: Vec<&String> = [(first_name, first), (second_name, second)]
                        .into_iter()
                        .filter(|(_, net)| check_network(net).is_err())
                        .map(|(name, _)| name)
                        .collect();
                    if blamed.is_empty() {
                        blamed = vec![first_name, second_name];
                    }
                    report.held_back.extend(blamed.into_iter().cloned());
                    if report.held_back.contains(first_name) {
                        break;
                    }
                    continue;
                }
            };
            if !verdict.is_duplicate() {
                continue;
            }

            let (drop, rule) = tie_break(first, second, rng);
            let (kept, dropped) = match drop {
                DropSide::First => (second_name, first_name),
                DropSide::Second => (first_name, second_name),
            };
            tracing::info!("{} duplicates {}, dropping {}", first_name, second_name, dropped);
            report.excluded.insert(dropped.clone());
            report.duplicates.push(ResolvedPair {
                kept: kept.clone(),
                dropped: dropped.clone(),
                rule,
            });

            if drop == DropSide::First {
                break;
            }
        }
    }

    Ok(report)
}

/// `resolve_duplicates` with a seeded `StdRng` for reproducible tie-breaks
pub fn resolve_duplicates_seeded(
    corpus: &Corpus,
    config: &ClassifierConfig,
    pre_excluded: &HashSet<String>,
    seed: u64,
) -> Result<ResolutionReport> {
    let mut rng = StdRng::seed_from_u64(seed);
    resolve_duplicates(corpus, config, pre_excluded, &mut rng)
}
