//! Effects, conditions, durations, and potency effects.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::monster::Characteristic;

/// How long an imposed effect persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectDuration {
    SaveEnds,
    EndOfTargetTurn,
    StartOfTargetTurn,
    EndOfEncounter,
}

impl EffectDuration {
    /// Decode a duration phrase ("save ends", "EoE", "end of the
    /// encounter", ...). Returns `None` for unrecognized phrases.
    pub fn from_phrase(phrase: &str) -> Option<Self> {
        let p = phrase.trim().to_lowercase();
        if p.contains("save ends") {
            Some(Self::SaveEnds)
        } else if p == "eoe" || p.contains("end of encounter") || p.contains("end of the encounter")
        {
            Some(Self::EndOfEncounter)
        } else if p.starts_with("start of") {
            Some(Self::StartOfTargetTurn)
        } else if p == "eot" || p.starts_with("end of") {
            Some(Self::EndOfTargetTurn)
        } else {
            None
        }
    }
}

/// Named conditions an effect can impose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Bleeding,
    Frightened,
    Grabbed,
    Prone,
    Restrained,
    Slowed,
    Taunted,
    Weakened,
}

impl Condition {
    const ALL: &'static [Condition] = &[
        Self::Bleeding,
        Self::Frightened,
        Self::Grabbed,
        Self::Prone,
        Self::Restrained,
        Self::Slowed,
        Self::Taunted,
        Self::Weakened,
    ];

    fn keyword(self) -> &'static str {
        match self {
            Self::Bleeding => "bleeding",
            Self::Frightened => "frightened",
            Self::Grabbed => "grabbed",
            Self::Prone => "prone",
            Self::Restrained => "restrained",
            Self::Slowed => "slowed",
            Self::Taunted => "taunted",
            Self::Weakened => "weakened",
        }
    }
}

static PAREN_DURATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]+)\)").unwrap());

/// A free-text effect with the condition flags and duration derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    /// The effect text as written (post OCR repair)
    pub text: String,
    /// Conditions named in the text, in canonical order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub conditions: Vec<Condition>,
    /// Duration, when a recognized phrase appears (usually parenthesized)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<EffectDuration>,
}

impl Effect {
    /// Build an effect from its text, deriving conditions and duration.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let lower = text.to_lowercase();
        let conditions = Condition::ALL
            .iter()
            .copied()
            .filter(|c| lower.contains(c.keyword()))
            .collect();
        let duration = PAREN_DURATION
            .captures_iter(&text)
            .find_map(|c| EffectDuration::from_phrase(&c[1]))
            .or_else(|| EffectDuration::from_phrase(&lower));
        Self {
            text,
            conditions,
            duration,
        }
    }
}

/// A secondary effect gated on the target's characteristic being below a
/// threshold (e.g. `A<1 slowed (save ends)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotencyEffect {
    /// Which characteristic the potency tests
    pub target_characteristic: Characteristic,
    /// Threshold the characteristic must be below, 0..=6
    pub value: u8,
    /// What happens when the potency applies
    pub effect: Effect,
}
