//! Fixed vocabularies and document-structure patterns.
//!
//! These tables are the closed grammar of the targeted document family:
//! monster organizations and roles, the monster keyword whitelist, the
//! trait-name vocabulary, page/footer boilerplate, and noise-section
//! headings. Loaded once, never mutated, shared freely across workers.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

// ============================================================================
// Monster organization / role tokens
// ============================================================================

/// The six organization tokens a monster header may carry.
pub const ORGANIZATIONS: &[&str] = &["minion", "horde", "platoon", "elite", "leader", "solo"];

/// The ten role tokens a monster header may carry.
pub const ROLES: &[&str] = &[
    "ambusher",
    "artillery",
    "brute",
    "controller",
    "defender",
    "harrier",
    "hexer",
    "mount",
    "support",
    "skirmisher",
];

// ============================================================================
// Monster keyword whitelist
// ============================================================================

/// Title-cased keyword tokens accepted on the keywords/EV line.
/// Anything else on that line is reported and dropped.
pub static MONSTER_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "Abyssal",
        "Accursed",
        "Angulotl",
        "Animal",
        "Ankheg",
        "Arixx",
        "Basilisk",
        "Beast",
        "Bredbeddle",
        "Bugbear",
        "Chimera",
        "Construct",
        "Corporeal",
        "Demon",
        "Devil",
        "Draconian",
        "Dragon",
        "Dwarf",
        "Elemental",
        "Eyestalk",
        "Fey",
        "Fire Giant",
        "Frost Giant",
        "Giant",
        "Gnoll",
        "Goblin",
        "Griffon",
        "Hag",
        "High Elf",
        "Hill Giant",
        "Hobgoblin",
        "Horror",
        "Human",
        "Humanoid",
        "Incorporeal",
        "Infernal",
        "Kobold",
        "Lightbender",
        "Lizardfolk",
        "Manticore",
        "Medusa",
        "Minotaur",
        "Multivok",
        "Mummy",
        "Mystic Goblin",
        "Ogre",
        "Olothec",
        "Ooze",
        "Orc",
        "Overmind",
        "Planar",
        "Plant",
        "Polder",
        "Radenwight",
        "Rival",
        "Ruinborn",
        "Servok",
        "Shadow Elf",
        "Shambling Mound",
        "Soulraker",
        "Stone Giant",
        "Storm Giant",
        "Swarm",
        "Time Raider",
        "Troll",
        "Undead",
        "Valok",
        "Vampire",
        "Voiceless Talker",
        "War Dog",
        "Water Wolf",
        "Werebeast",
        "Wode Elf",
        "Worm",
        "Wyvern",
    ])
});

// ============================================================================
// Trait vocabulary
// ============================================================================

/// Bare trait names that open an ability block without a parenthesized
/// action type. The single extension point for newly encountered traits.
pub static TRAIT_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "accursed rage",
        "arise",
        "corruptive phasing",
        "crafty",
        "death detonation",
        "death grasp",
        "endless knight",
        "grave talker",
        "loyal mount",
        "magic resistance",
        "relentless",
        "shoot first",
        "soulsight",
        "swarm tactics",
        "the better part of valor",
    ])
});

/// Whether a line is exactly a known trait name (case-insensitive).
pub fn is_trait_name(line: &str) -> bool {
    TRAIT_NAMES.contains(line.trim().to_lowercase().as_str())
}

// ============================================================================
// Page structure and boilerplate
// ============================================================================

/// Left-column page marker; a new left page always terminates a block.
pub static PAGE_LEFT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^--- Page \d+ left ---").unwrap());

/// Any page/column marker; filtered out of block content.
pub static PAGE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^--- Page \d+ (left|right) ---").unwrap());

/// Footer boilerplate; filtered out of block content.
pub static FOOTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)The Delian Tomb.*MCDM Productions|delian tomb|mcdm productions").unwrap()
});

/// Section headings that end a monster block without starting a new one.
pub const NOISE_HEADERS: &[&str] = &["ENCOUNTER D4", "MALICE FEATURES"];

/// Whether a line is a recognized noise-section heading.
pub fn is_noise_header(line: &str) -> bool {
    let normalized = line.trim().to_uppercase();
    NOISE_HEADERS.iter().any(|h| normalized.contains(h))
}

// ============================================================================
// Tests
// ============================================================================
