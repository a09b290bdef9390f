//! Power rolls: the three-tier outcome table of an attack ability.

use serde::{Deserialize, Serialize};

use super::damage::DamageType;
use super::effect::{Effect, PotencyEffect};

/// One outcome tier of a power roll. Any combination of the three facets
/// may be present, including none (a no-effect tier).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerRollTier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_type: Option<DamageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potency_effect: Option<PotencyEffect>,
}

/// A complete power roll. Either absent from an ability or carrying exactly
/// three tiers for the outcome bands <=11, 12-16, and 17+; partial tier
/// sets never construct.
///
/// A roll without a bonus is a resistance test rather than an attack roll;
/// the details live in the ability's pre-roll effect text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerRoll {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus: Option<i8>,
    pub tier1: PowerRollTier,
    pub tier2: PowerRollTier,
    pub tier3: PowerRollTier,
}

impl PowerRoll {
    /// The tiers in band order.
    pub fn tiers(&self) -> [&PowerRollTier; 3] {
        [&self.tier1, &self.tier2, &self.tier3]
    }

    /// Whether this roll is an attack roll (has a bonus) rather than a
    /// resistance test.
    pub fn is_attack(&self) -> bool {
        self.bonus.is_some()
    }
}
