//! Error types for stat-block extraction.
//!
//! Only structurally mandatory failures are represented here; recoverable
//! ambiguities (unknown keywords, unparseable ability headers) go to the
//! diagnostics channel instead and never abort a block.

use thiserror::Error;

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Fatal, block-level extraction errors.
///
/// Any of these aborts the owning monster block; the batch continues and
/// the error is converted into a per-block failure record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// No `EV <number>` marker in the leading lines of the block.
    #[error("encounter value (EV) marker not found in the first {scanned} lines")]
    MissingEncounterValue {
        /// How many leading lines were scanned
        scanned: usize,
    },

    /// No `Stamina <number>` line anywhere in the block.
    #[error("stamina not found in block")]
    MissingStamina,

    /// No `Speed <number>` line anywhere in the block.
    #[error("speed not found in block")]
    MissingSpeed,

    /// No `Size <size> / Stability <number>` line anywhere in the block.
    #[error("size/stability not found in block")]
    MissingSizeStability,

    /// No `Free Strike <number>` line anywhere in the block.
    #[error("free strike damage not found in block")]
    MissingFreeStrike,

    /// No line carrying all five characteristics.
    #[error("characteristics line not found in block")]
    MissingCharacteristics,

    /// A minion block without a `with captain` line in its stat region.
    #[error("captain bonus not found for minion")]
    MissingCaptainBonus,

    /// A power roll with one or two tier lines instead of zero or three.
    #[error("ability '{ability}' has {found} power roll tiers, expected 3")]
    IncompleteTierSet {
        /// Name of the owning ability
        ability: String,
        /// Number of tier lines actually found
        found: usize,
    },

    /// A tier line that survived normalization but matched no cascade pattern.
    #[error("unmatched power roll line in '{ability}': '{line}' (normalized: '{normalized}')")]
    UnmatchedTierLine {
        /// Name of the owning ability
        ability: String,
        /// The raw tier line
        line: String,
        /// The line after OCR repair
        normalized: String,
    },

    /// A distance line that matched no variant pattern.
    #[error("unmatched distance line: '{line}'")]
    UnmatchedDistance {
        /// The offending line
        line: String,
    },

    /// A distance label with nothing after it.
    #[error("empty distance line: '{line}'")]
    EmptyDistance {
        /// The offending line
        line: String,
    },
}
