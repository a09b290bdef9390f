//! Distance and target records for abilities.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// The reach of an ability. Exactly one variant by construction, replacing
/// the source document's free-form distance phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    /// "Self": the ability affects only its user
    Personal,
    Melee(u32),
    Ranged(u32),
    MeleeAndRanged { melee: u32, ranged: u32 },
    Burst(u32),
    Cube { size: u32, within: u32 },
    Line { width: u32, length: u32, within: u32 },
    /// Literal "special" fallback
    Special,
}

// Serialized as the flat map shape the importer expects:
// {"self": true}, {"melee": 1}, {"melee": 1, "ranged": 5}, {"burst": 2},
// {"cube": {"size": 3, "within": 1}}, {"line": {...}}, {"special": true}.
impl Serialize for Distance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Area {
            size: u32,
            within: u32,
        }
        #[derive(Serialize)]
        struct LineArea {
            width: u32,
            length: u32,
            within: u32,
        }

        let mut map = serializer.serialize_map(None)?;
        match *self {
            Self::Personal => map.serialize_entry("self", &true)?,
            Self::Melee(melee) => map.serialize_entry("melee", &melee)?,
            Self::Ranged(ranged) => map.serialize_entry("ranged", &ranged)?,
            Self::MeleeAndRanged { melee, ranged } => {
                map.serialize_entry("melee", &melee)?;
                map.serialize_entry("ranged", &ranged)?;
            }
            Self::Burst(size) => map.serialize_entry("burst", &size)?,
            Self::Cube { size, within } => {
                map.serialize_entry("cube", &Area { size, within })?
            }
            Self::Line {
                width,
                length,
                within,
            } => map.serialize_entry("line", &LineArea {
                width,
                length,
                within,
            })?,
            Self::Special => map.serialize_entry("special", &true)?,
        }
        map.end()
    }
}

/// How many creatures or objects an ability targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetCount {
    /// "all", "each", "every"
    All,
    Count(u32),
}

impl Serialize for TargetCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Count(n) => serializer.serialize_u32(*n),
        }
    }
}

/// The target clause of an ability: the normalized text plus the boolean
/// flags and count derived from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Normalized target text
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<TargetCount>,
    #[serde(rename = "self", skip_serializing_if = "std::ops::Not::not")]
    pub is_self: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ally: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub enemy: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub object: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub special: bool,
}
