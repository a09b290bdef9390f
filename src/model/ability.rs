//! Ability records and their header-derived fields.

use serde::{Deserialize, Serialize, Serializer};

use super::distance::{Distance, Target};
use super::effect::Effect;
use super::power_roll::PowerRoll;

/// The action economy slot an ability occupies, or `MonsterTrait` for a
/// passive trait block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AbilityKind {
    MainAction,
    FreeMainAction,
    Maneuver,
    FreeManeuver,
    TriggeredAction,
    FreeTriggeredAction,
    VillainAction,
    MonsterTrait,
}

impl AbilityKind {
    /// Map a lowercased header type phrase to its kind.
    pub fn from_header_phrase(phrase: &str) -> Option<Self> {
        match phrase {
            "action" | "main action" => Some(Self::MainAction),
            "free action" | "free main action" => Some(Self::FreeMainAction),
            "maneuver" => Some(Self::Maneuver),
            "free maneuver" => Some(Self::FreeManeuver),
            "triggered action" => Some(Self::TriggeredAction),
            "free triggered action" => Some(Self::FreeTriggeredAction),
            _ if phrase.starts_with("villain action") => Some(Self::VillainAction),
            _ => None,
        }
    }
}

/// The malice cost of an ability. Absence from [`Ability`] means the
/// ability is free; `Signature` is an explicit marker distinct from a zero
/// cost and never collapses to an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaliceCost {
    Signature,
    Cost(u8),
}

impl Serialize for MaliceCost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Signature => serializer.serialize_str("signature"),
            Self::Cost(n) => serializer.serialize_u8(*n),
        }
    }
}

/// An effect unlocked by spending malice mid-ability
/// (e.g. "2 Malice: the target is also grabbed").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaliceEffect {
    /// Malice that must be spent to apply the effect
    pub cost: u8,
    pub effect: Effect,
}

/// One ability or trait belonging to a monster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub name: String,
    pub kind: AbilityKind,
    /// Use order for villain actions, 1..=3
    #[serde(skip_serializing_if = "Option::is_none")]
    pub villain_action_ordinal: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub malice_cost: Option<MaliceCost>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_roll: Option<PowerRoll>,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<Distance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_power_roll_effect: Option<Effect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub malice_effect: Option<MaliceEffect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_power_roll_effect: Option<Effect>,
    /// Raw header line retained for diagnostics
    pub header_raw: String,
}

impl Ability {
    /// A placeholder for a block whose header failed the grammar; keeps the
    /// raw line so the record is auditable.
    pub fn unparsed(header_raw: impl Into<String>) -> Self {
        Self {
            name: "UNKNOWN".to_string(),
            kind: AbilityKind::MainAction,
            villain_action_ordinal: None,
            malice_cost: None,
            power_roll: None,
            keywords: Vec::new(),
            distance: None,
            target: None,
            trigger: None,
            pre_power_roll_effect: None,
            malice_effect: None,
            post_power_roll_effect: None,
            header_raw: header_raw.into(),
        }
    }

    /// Whether the ability is cost-free (no malice cost and not signature).
    pub fn is_free(&self) -> bool {
        self.malice_cost.is_none()
    }
}
