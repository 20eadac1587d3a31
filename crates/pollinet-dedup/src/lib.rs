//! pollinet-dedup - Duplicate detection for plant-pollinator networks
//!
//! Network collections aggregated from several sources often contain the
//! same field study more than once, under different species spellings,
//! partial identifications and slightly different table sizes. This crate
//! finds those duplicates:
//!
//! - **Taxon**: parse species labels into genus / species / index / network tag
//! - **Matcher**: pair the plants (or pollinators) of two networks tier by tier
//! - **Compare**: count interactions one network records and the other lacks
//! - **Classify**: decide whether two networks are duplicates
//! - **Resolve**: exclude duplicates across a whole corpus
//!
//! Pure engine crate: it receives pre-loaded tables and returns decisions.
//! No file or network I/O.

pub mod classify;
pub mod compare;
pub mod config;
pub mod error;
pub mod matcher;
pub mod network;
pub mod resolve;
pub mod taxon;

pub use classify::{
    are_duplicates, check_network, classify_pair, ClassifierConfig, DuplicateVerdict,
    MismatchReason, PairComparison,
};
pub use compare::{compare_interactions, CompareOptions, InteractionDiff};
pub use config::DedupConfig;
pub use error::{Axis, ConfigError, DedupError, MappingInvariantViolation, Result, TableError};
pub use matcher::{
    match_by_fields, match_node_set, parameterized_equal, MappingBuilder, MatchTier, NodeMapping,
};
pub use network::{Corpus, NetworkTable};
pub use resolve::{
    resolve_duplicates, resolve_duplicates_seeded, tie_break, DropSide, ErroredPair,
    ResolutionReport, ResolvedPair, TieBreakRule,
};
pub use taxon::{parse_taxon, TaxonField, TaxonIdentifier};
