//! Monster headers, blocks, and the final monster record.

use serde::{Deserialize, Serialize};

use super::ability::Ability;
use super::damage::DamageModifiers;

// ============================================================================
// Header vocabulary enums
// ============================================================================

/// Monster organization, the second mandatory token of a header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Organization {
    Minion,
    Horde,
    Platoon,
    Elite,
    Leader,
    Solo,
}

impl Organization {
    /// Title-cased display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minion => "Minion",
            Self::Horde => "Horde",
            Self::Platoon => "Platoon",
            Self::Elite => "Elite",
            Self::Leader => "Leader",
            Self::Solo => "Solo",
        }
    }

    /// Parse a header token, case-insensitively.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "minion" => Some(Self::Minion),
            "horde" => Some(Self::Horde),
            "platoon" => Some(Self::Platoon),
            "elite" => Some(Self::Elite),
            "leader" => Some(Self::Leader),
            "solo" => Some(Self::Solo),
            _ => None,
        }
    }

    /// Solo and Leader monsters never carry a role in the source grammar.
    pub fn forbids_role(self) -> bool {
        matches!(self, Self::Solo | Self::Leader)
    }
}

/// Monster battlefield role, the optional trailing token of a header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Ambusher,
    Artillery,
    Brute,
    Controller,
    Defender,
    Harrier,
    Hexer,
    Mount,
    Support,
    Skirmisher,
}

impl Role {
    /// Title-cased display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ambusher => "Ambusher",
            Self::Artillery => "Artillery",
            Self::Brute => "Brute",
            Self::Controller => "Controller",
            Self::Defender => "Defender",
            Self::Harrier => "Harrier",
            Self::Hexer => "Hexer",
            Self::Mount => "Mount",
            Self::Support => "Support",
            Self::Skirmisher => "Skirmisher",
        }
    }

    /// Parse a header token, case-insensitively.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "ambusher" => Some(Self::Ambusher),
            "artillery" => Some(Self::Artillery),
            "brute" => Some(Self::Brute),
            "controller" => Some(Self::Controller),
            "defender" => Some(Self::Defender),
            "harrier" => Some(Self::Harrier),
            "hexer" => Some(Self::Hexer),
            "mount" => Some(Self::Mount),
            "support" => Some(Self::Support),
            "skirmisher" => Some(Self::Skirmisher),
            _ => None,
        }
    }
}

// ============================================================================
// Characteristics
// ============================================================================

/// One of the five characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Characteristic {
    Might,
    Agility,
    Reason,
    Intuition,
    Presence,
}

impl Characteristic {
    /// Decode the single-letter potency initial (M/A/R/I/P).
    pub fn from_initial(initial: char) -> Option<Self> {
        match initial.to_ascii_lowercase() {
            'm' => Some(Self::Might),
            'a' => Some(Self::Agility),
            'r' => Some(Self::Reason),
            'i' => Some(Self::Intuition),
            'p' => Some(Self::Presence),
            _ => None,
        }
    }
}

/// The five signed characteristic scores. Always complete: a monster
/// without all five is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    pub might: i8,
    pub agility: i8,
    pub reason: i8,
    pub intuition: i8,
    pub presence: i8,
}

impl Characteristics {
    /// Look up one score by characteristic.
    pub fn get(&self, which: Characteristic) -> i8 {
        match which {
            Characteristic::Might => self.might,
            Characteristic::Agility => self.agility,
            Characteristic::Reason => self.reason,
            Characteristic::Intuition => self.intuition,
            Characteristic::Presence => self.presence,
        }
    }
}

// ============================================================================
// Captain bonus (minions)
// ============================================================================

/// The passive modifier a minion squad gains while its captain is alive.
/// Exactly one variant per minion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptainBonus {
    /// Applied effect: the squad gains temporary stamina
    TemporaryStamina(u32),
    /// Derived bonus to speed
    Speed(i32),
    /// Derived bonus to melee distance
    MeleeDistance(i32),
    /// Derived bonus to ranged distance
    RangedDistance(i32),
    /// Derived bonus to strike damage
    StrikeDamage(i32),
    /// Derived edge count on strikes
    StrikeEdge(i32),
    /// Edge granted on every strike
    EdgeOnStrikes(i32),
}

// ============================================================================
// Header / block / monster
// ============================================================================

/// A parsed monster header line. Created by the segmenter, immutable after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterHeader {
    /// Title-cased monster name
    pub name: String,
    /// Monster level, positive
    pub level: u32,
    /// Organization token
    pub organization: Organization,
    /// Role token; never present for Solo or Leader
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// The raw header line, for diagnostics
    pub source_line: String,
    /// Index of the header line in the document
    pub start_line: usize,
    /// Index of the last header line (equal to start for single-line headers)
    pub end_line: usize,
}

/// A monster's slice of the document: header plus the ordered lines that
/// belong to it, with footers and page markers already stripped.
#[derive(Debug, Clone)]
pub struct MonsterBlock {
    pub header: MonsterHeader,
    pub lines: Vec<String>,
}

/// The final extracted record for one monster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Monster {
    pub name: String,
    pub level: u32,
    pub organization: Organization,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Raw header line retained for diagnostics
    pub header_text: String,
    /// Whitelisted keywords, document order preserved
    pub keywords: Vec<String>,
    pub encounter_value: u32,
    pub stamina: u32,
    pub speed: u32,
    /// Movement types from the speed line; `["walk"]` when unparenthesized
    pub movement_types: Vec<String>,
    /// Size token as written (e.g. "1M", "2")
    pub size: String,
    pub stability: u32,
    pub free_strike_damage: u32,
    pub characteristics: Characteristics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weakness: Option<DamageModifiers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub immunity: Option<DamageModifiers>,
    /// Minions only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_captain: Option<CaptainBonus>,
    pub abilities: Vec<Ability>,
}

impl Monster {
    /// Whether this record is a minion (per-squad stamina semantics apply).
    pub fn is_minion(&self) -> bool {
        self.organization == Organization::Minion
    }
}
