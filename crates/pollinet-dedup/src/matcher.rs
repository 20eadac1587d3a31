//! Node matching between two species label sets
//!
//! Labels are paired in tiers of decreasing strictness. Tier 0 trusts exact
//! label equality, the structured tiers trust a shrinking prefix of
//! `[genus, index, network_tag, extra]`, and the last tier falls back to the
//! species epithet alone. Each tier only sees labels that earlier tiers left
//! unpaired, so the most specific evidence always wins.
//!
//! Within a tier matching is greedy and first-match: labels of the left set
//! are visited in input order and each takes the first free right label (in
//! input order) that agrees on the tier's fields. This is not an optimal
//! assignment; the iteration order is part of the contract.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::{MappingInvariantViolation, Result};
use crate::taxon::{parse_taxon, TaxonField, TaxonIdentifier};

static STRUCTURED_FIELDS: [TaxonField; 4] = [
    TaxonField::Genus,
    TaxonField::Index,
    TaxonField::NetworkTag,
    TaxonField::Extra,
];

/// One matching pass: a field subset and an empty-match policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Identical labels
    Exact,
    /// The first `n` structured fields agree and are non-empty
    Structured(u8),
    /// Same species epithet
    SpeciesOnly,
}

impl MatchTier {
    /// Tiers in the order they are applied
    pub const ALL: [MatchTier; 5] = [
        MatchTier::Exact,
        MatchTier::Structured(4),
        MatchTier::Structured(3),
        MatchTier::Structured(2),
        MatchTier::SpeciesOnly,
    ];

    pub fn fields(&self) -> &'static [TaxonField] {
        match self {
            Self::Exact => &[TaxonField::Origin],
            Self::Structured(n) => {
                let n = (*n as usize).min(STRUCTURED_FIELDS.len());
                &STRUCTURED_FIELDS[..n]
            }
            Self::SpeciesOnly => &[TaxonField::Species],
        }
    }

    /// Whether two empty fields count as agreement.
    ///
    /// Only exact matching allows it. Two labels that both lack an index or a
    /// species epithet carry no evidence of being the same taxon.
    pub fn allow_empty(&self) -> bool {
        matches!(self, Self::Exact)
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.fields().iter().map(|field| field.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Compare two identifiers on a set of fields.
///
/// With no fields the whole identifiers are compared. Otherwise every field
/// must be equal and, unless `allow_empty` is set, non-empty.
pub fn parameterized_equal(
    a: &TaxonIdentifier,
    b: &TaxonIdentifier,
    allow_empty: bool,
    fields: &[TaxonField],
) -> bool {
    if fields.is_empty() {
        return a == b;
    }
    fields.iter().all(|&field| {
        let value = a.field(field);
        value == b.field(field) && (allow_empty || !value.is_empty())
    })
}

/// Owns both directions of a mapping while tiers are being applied
#[derive(Debug, Default)]
pub struct MappingBuilder {
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
    tiers: HashMap<String, MatchTier>,
}

impl MappingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mapped_left(&self, label: &str) -> bool {
        self.forward.contains_key(label)
    }

    pub fn is_mapped_right(&self, label: &str) -> bool {
        self.reverse.contains_key(label)
    }

    fn link(&mut self, left: &str, right: &str) {
        self.forward.insert(left.to_string(), right.to_string());
        self.reverse.insert(right.to_string(), left.to_string());
    }

    fn record_tier(&mut self, left: &str, tier: MatchTier) {
        self.tiers.insert(left.to_string(), tier);
    }

    /// Freeze the mapping, filling every unpaired label with `None`
    pub fn finish(self, left: &[String], right: &[String]) -> NodeMapping {
        let unmapped_left: Vec<String> = left
            .iter()
            .filter(|l| !self.forward.contains_key(*l))
            .cloned()
            .collect();
        let unmapped_right: Vec<String> = right
            .iter()
            .filter(|r| !self.reverse.contains_key(*r))
            .cloned()
            .collect();

        let forward = left
            .iter()
            .map(|l| (l.clone(), self.forward.get(l).cloned()))
            .collect();
        let reverse = right
            .iter()
            .map(|r| (r.clone(), self.reverse.get(r).cloned()))
            .collect();

        NodeMapping {
            left: left.to_vec(),
            right: right.to_vec(),
            forward,
            reverse,
            unmapped_left,
            unmapped_right,
            tiers: self.tiers,
        }
    }
}

/// Pair labels of `set1` with labels of `set2` that agree on `fields`.
///
/// Labels already paired by an earlier pass are skipped on both sides.
/// Returns the left labels paired by this pass, in input order.
pub fn match_by_fields<'a>(
    set1: &'a [TaxonIdentifier],
    set2: &[TaxonIdentifier],
    builder: &mut MappingBuilder,
    allow_empty: bool,
    fields: &[TaxonField],
) -> Vec<&'a str> {
    let mut linked = Vec::new();
    for a in set1 {
        if builder.is_mapped_left(&a.origin) {
            continue;
        }
        let candidate = set2.iter().find(|b| {
            !builder.is_mapped_right(&b.origin) && parameterized_equal(a, b, allow_empty, fields)
        });
        if let Some(b) = candidate {
            builder.link(&a.origin, &b.origin);
            linked.push(a.origin.as_str());
        }
    }
    linked
}

/// A finished bidirectional correspondence between two label sets.
///
/// Every label of both sets is a key of its own map; `None` means no
/// correspondence was found.
#[derive(Debug, Clone, Serialize)]
pub struct NodeMapping {
    left: Vec<String>,
    right: Vec<String>,
    forward: HashMap<String, Option<String>>,
    reverse: HashMap<String, Option<String>>,
    unmapped_left: Vec<String>,
    unmapped_right: Vec<String>,
    tiers: HashMap<String, MatchTier>,
}

impl NodeMapping {
    /// The right-hand label paired with `label`, if any
    pub fn target(&self, label: &str) -> Option<&str> {
        self.forward.get(label).and_then(|t| t.as_deref())
    }

    /// The left-hand label paired with `label`, if any
    pub fn source(&self, label: &str) -> Option<&str> {
        self.reverse.get(label).and_then(|s| s.as_deref())
    }

    pub fn forward(&self) -> &HashMap<String, Option<String>> {
        &self.forward
    }

    pub fn reverse(&self) -> &HashMap<String, Option<String>> {
        &self.reverse
    }

    /// Left labels without a counterpart, in input order
    pub fn unmapped_left(&self) -> &[String] {
        &self.unmapped_left
    }

    /// Right labels without a counterpart, in input order
    pub fn unmapped_right(&self) -> &[String] {
        &self.unmapped_right
    }

    /// Size of the union of both unmapped sets
    pub fn unmapped_count(&self) -> usize {
        self.unmapped_left
            .iter()
            .chain(self.unmapped_right.iter())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn matched_count(&self) -> usize {
        self.forward.values().filter(|t| t.is_some()).count()
    }

    /// The tier that paired a left label, when `match_node_set` built the
    /// mapping
    pub fn tier_of(&self, label: &str) -> Option<MatchTier> {
        self.tiers.get(label).copied()
    }

    /// The same correspondence seen from the right-hand set
    pub fn inverted(&self) -> NodeMapping {
        let tiers = self
            .tiers
            .iter()
            .filter_map(|(l, tier)| self.target(l).map(|r| (r.to_string(), *tier)))
            .collect();
        NodeMapping {
            left: self.right.clone(),
            right: self.left.clone(),
            forward: self.reverse.clone(),
            reverse: self.forward.clone(),
            unmapped_left: self.unmapped_right.clone(),
            unmapped_right: self.unmapped_left.clone(),
            tiers,
        }
    }

    /// Check totality, consistency and injectivity
    pub fn verify(&self) -> std::result::Result<(), MappingInvariantViolation> {
        for label in &self.left {
            if !self.forward.contains_key(label) {
                return Err(MappingInvariantViolation::MissingKey(label.clone()));
            }
        }
        for label in &self.right {
            if !self.reverse.contains_key(label) {
                return Err(MappingInvariantViolation::MissingKey(label.clone()));
            }
        }

        let mut images: HashMap<&str, &str> = HashMap::new();
        for (from, to) in &self.forward {
            let Some(to) = to else { continue };
            let back = self.source(to);
            if back != Some(from.as_str()) {
                return Err(MappingInvariantViolation::Inconsistent {
                    from: from.clone(),
                    to: to.clone(),
                    back: back.map(str::to_string),
                });
            }
            if let Some(first) = images.insert(to.as_str(), from.as_str()) {
                return Err(MappingInvariantViolation::NotInjective {
                    target: to.clone(),
                    first: first.to_string(),
                    second: from.clone(),
                });
            }
        }
        for (from, to) in &self.reverse {
            let Some(to) = to else { continue };
            let back = self.target(to);
            if back != Some(from.as_str()) {
                return Err(MappingInvariantViolation::Inconsistent {
                    from: from.clone(),
                    to: to.clone(),
                    back: back.map(str::to_string),
                });
            }
        }
        Ok(())
    }
}

/// Match two label sets tier by tier.
///
/// Fails only when a label cannot be parsed. A mapping that breaks its own
/// invariants is a bug in this module and panics.
pub fn match_node_set(set1: &[String], set2: &[String]) -> Result<NodeMapping> {
    let parsed1 = set1
        .iter()
        .map(|label| parse_taxon(label))
        .collect::<Result<Vec<_>>>()?;
    let parsed2 = set2
        .iter()
        .map(|label| parse_taxon(label))
        .collect::<Result<Vec<_>>>()?;

    let mut builder = MappingBuilder::new();
    for tier in MatchTier::ALL {
        let linked =
            match_by_fields(&parsed1, &parsed2, &mut builder, tier.allow_empty(), tier.fields());
        if !linked.is_empty() {
            tracing::trace!("tier {} paired {} labels", tier, linked.len());
        }
        for label in linked {
            builder.record_tier(label, tier);
        }
    }

    let mapping = builder.finish(set1, set2);
    if let Err(violation) = mapping.verify() {
        panic!("node mapping invariant violated: {violation}");
    }
    Ok(mapping)
}
