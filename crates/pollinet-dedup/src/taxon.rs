//! Taxon label parsing
//!
//! Species labels in aggregated networks come in two shapes:
//!
//! - resolved: `Genus species [extra...]`
//! - unresolved: `Genus sp[.] [index] [network tag] [extra...]`, where the
//!   marker may also be `n.i.` and the index may be glued to it (`sp1`)
//!
//! Parsing breaks a label into fields so that node matching can compare
//! labels on subsets of those fields.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DedupError, Result};

lazy_static! {
    // Second token of an unresolved label: `sp`, `sp.`, `sp..`, `n.i.`,
    // or `sp` directly followed by a non-letter (`sp1`, `sp.3`)
    static ref UNRESOLVED_MARKER: Regex = Regex::new(
        r"^(?:sp\.{0,2}|n\.i\.)$|^sp[^a-zA-Z]"
    ).unwrap();

    // Everything after the genus of an unresolved label, with whitespace
    // collapsed to single spaces. Network tags follow the Web of Life code
    // convention (M_PL_001, M_PL_061_12)
    static ref UNRESOLVED_TAIL: Regex = Regex::new(
        r"^ (?:sp\.{0,2}|n\.i\.)\s?(?P<index>[0-9]*)\s?(?P<tag>[A-Z]_[A-Z]{2}_[0-9]{3}(?:_[0-9]{1,3})?)?\s?(?P<extra>.*)$"
    ).unwrap();
}

/// Structured form of a species label.
///
/// Every field is a required string; an empty string means "not present".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxonIdentifier {
    pub genus: String,
    pub species: String,
    pub index: String,
    pub network_tag: String,
    pub extra: String,
    /// The unmodified label, used as the identity key
    pub origin: String,
}

impl TaxonIdentifier {
    /// Whether the label names a species rather than just a genus
    pub fn is_resolved(&self) -> bool {
        !self.species.is_empty()
    }

    /// Value of one field
    pub fn field(&self, field: TaxonField) -> &str {
        match field {
            TaxonField::Origin => &self.origin,
            TaxonField::Genus => &self.genus,
            TaxonField::Species => &self.species,
            TaxonField::Index => &self.index,
            TaxonField::NetworkTag => &self.network_tag,
            TaxonField::Extra => &self.extra,
        }
    }
}

/// Fields of a `TaxonIdentifier` that matching can compare on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonField {
    Origin,
    Genus,
    Species,
    Index,
    NetworkTag,
    Extra,
}

impl std::fmt::Display for TaxonField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Origin => write!(f, "origin"),
            Self::Genus => write!(f, "genus"),
            Self::Species => write!(f, "species"),
            Self::Index => write!(f, "index"),
            Self::NetworkTag => write!(f, "network_tag"),
            Self::Extra => write!(f, "extra"),
        }
    }
}

/// Parse a raw species label.
///
/// Only a label without any token is an error; anything else degrades to a
/// genus-only or unresolved form.
///
/// # Examples
/// ```
/// use pollinet_dedup::parse_taxon;
///
/// let taxon = parse_taxon("Bombus sp2 M_PL_017").unwrap();
/// assert_eq!(taxon.genus, "Bombus");
/// assert_eq!(taxon.species, "");
/// assert_eq!(taxon.index, "2");
/// assert_eq!(taxon.network_tag, "M_PL_017");
///
/// let taxon = parse_taxon("Apis mellifera L.").unwrap();
/// assert_eq!(taxon.species, "mellifera");
/// assert_eq!(taxon.extra, "L.");
/// ```
pub fn parse_taxon(label: &str) -> Result<TaxonIdentifier> {
    let tokens: Vec<&str> = label.split_whitespace().collect();
    let Some(&genus) = tokens.first() else {
        return Err(DedupError::MalformedLabel(label.to_string()));
    };

    let mut taxon = TaxonIdentifier {
        genus: genus.to_string(),
        species: String::new(),
        index: String::new(),
        network_tag: String::new(),
        extra: String::new(),
        origin: label.to_string(),
    };

    let Some(&second) = tokens.get(1) else {
        return Ok(taxon);
    };

    if !UNRESOLVED_MARKER.is_match(second) {
        taxon.species = second.to_string();
        taxon.extra = tokens[2..].join(" ");
        return Ok(taxon);
    }

    let tail = format!(" {}", tokens[1..].join(" "));
    match UNRESOLVED_TAIL.captures(&tail) {
        Some(caps) => {
            taxon.index = caps
                .name("index")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            taxon.network_tag = caps
                .name("tag")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            taxon.extra = caps
                .name("extra")
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
        }
        None => {
            taxon.extra = tokens[1..].join(" ");
        }
    }

    Ok(taxon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_species() {
        let t = parse_taxon("Apis mellifera").unwrap();
        assert_eq!(t.genus, "Apis");
        assert_eq!(t.species, "mellifera");
        assert!(t.extra.is_empty());
        assert!(t.is_resolved());
    }

    #[test]
    fn resolved_with_authority() {
        let t = parse_taxon("Salvia   verbenaca  L. 1753").unwrap();
        assert_eq!(t.species, "verbenaca");
        assert_eq!(t.extra, "L. 1753");
        assert_eq!(t.origin, "Salvia   verbenaca  L. 1753");
    }

    #[test]
    fn genus_only() {
        let t = parse_taxon("Syrphidae").unwrap();
        assert_eq!(t.genus, "Syrphidae");
        assert!(t.species.is_empty());
        assert!(t.index.is_empty());
        assert!(!t.is_resolved());
    }

    #[test]
    fn empty_label_is_error() {
        assert_eq!(
            parse_taxon(""),
            Err(DedupError::MalformedLabel(String::new()))
        );
        assert!(parse_taxon("  \t ").is_err());
    }

    #[test]
    fn glued_index() {
        let t = parse_taxon("Bug sp1").unwrap();
        assert_eq!(t.genus, "Bug");
        assert_eq!(t.index, "1");
        assert!(t.species.is_empty());
    }

    #[test]
    fn spaced_index_with_tag_and_extra() {
        let t = parse_taxon("Andrena sp. 12 M_PL_061_03 ABC").unwrap();
        assert_eq!(t.index, "12");
        assert_eq!(t.network_tag, "M_PL_061_03");
        assert_eq!(t.extra, "ABC");
    }

    #[test]
    fn whitespace_runs_between_fields() {
        for label in ["Bombus sp  1", "Bombus sp\t\t1", "Bombus sp.   1", " Bombus  sp 1 "] {
            let t = parse_taxon(label).unwrap();
            assert_eq!(t.genus, "Bombus", "{label:?}");
            assert_eq!(t.index, "1", "{label:?}");
            assert!(t.extra.is_empty(), "{label:?}");
        }
        let t = parse_taxon("Andrena sp3  \t M_PL_061_12   XY  Z").unwrap();
        assert_eq!(t.index, "3");
        assert_eq!(t.network_tag, "M_PL_061_12");
        assert_eq!(t.extra, "XY Z");
    }

    #[test]
    fn not_identified_marker() {
        let t = parse_taxon("Lasioglossum n.i. 3").unwrap();
        assert_eq!(t.index, "3");
        assert!(t.species.is_empty());
    }

    #[test]
    fn species_starting_with_sp_is_resolved() {
        let t = parse_taxon("Ophrys sphegodes").unwrap();
        assert_eq!(t.species, "sphegodes");
        assert!(t.index.is_empty());
    }

    #[test]
    fn field_accessor() {
        let t = parse_taxon("Bombus sp 4").unwrap();
        assert_eq!(t.field(TaxonField::Genus), "Bombus");
        assert_eq!(t.field(TaxonField::Index), "4");
        assert_eq!(t.field(TaxonField::Origin), "Bombus sp 4");
    }
}
