//! Damage-type vocabulary and modifier maps.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The fixed damage-type vocabulary. `Untyped` is the plain "damage" entry
/// used by blanket immunities and weaknesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    Acid,
    Cold,
    Corruption,
    #[serde(rename = "damage")]
    Untyped,
    Fire,
    Holy,
    Lightning,
    Poison,
    Psychic,
    Sonic,
}

impl DamageType {
    /// All damage types, in canonical order.
    pub const ALL: &'static [DamageType] = &[
        Self::Acid,
        Self::Cold,
        Self::Corruption,
        Self::Untyped,
        Self::Fire,
        Self::Holy,
        Self::Lightning,
        Self::Poison,
        Self::Psychic,
        Self::Sonic,
    ];

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Acid => "acid",
            Self::Cold => "cold",
            Self::Corruption => "corruption",
            Self::Untyped => "damage",
            Self::Fire => "fire",
            Self::Holy => "holy",
            Self::Lightning => "lightning",
            Self::Poison => "poison",
            Self::Psychic => "psychic",
            Self::Sonic => "sonic",
        }
    }

    /// Parse an OCR token, tolerating the 0-for-o confusion ("c0rrupti0n",
    /// "h0ly", "p0is0n", ...). Returns `None` for unknown types.
    pub fn from_ocr_token(token: &str) -> Option<Self> {
        let cleaned = token.trim().to_lowercase().replace('0', "o");
        Self::ALL.iter().copied().find(|t| t.as_str() == cleaned)
    }

    /// Alternation fragment for embedding in larger patterns.
    pub fn pattern_alternation() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// An immunity or weakness table: damage type to integer modifier,
/// insertion-ordered so output is stable.
pub type DamageModifiers = IndexMap<DamageType, i32>;
