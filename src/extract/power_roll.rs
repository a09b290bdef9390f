//! Power roll tier-line classification.
//!
//! Tier lines are the noisiest text in the document: damage digits turn
//! into lookalike letters, potency markers lose their `<`, and phrases
//! fuse. Each line gets a repair pass keyed on adjacency to known anchors
//! ("damage", the potency marker), then an ordered cascade of patterns from
//! most to least specific. The ordering is a deliberate tie-break: the
//! permissive patterns are prefixes of the stricter ones and would
//! otherwise swallow structure.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Characteristic, DamageType, Effect, PotencyEffect, PowerRollTier};

// ============================================================================
// Pattern fragments
// ============================================================================

const DURATION: &str = r"(?:save ends|end of target turn|end of targets turn|end of target.?s turn|end of (?:the )?encounter|EoE|EoT|end of \w+ next turn|start of \w+ next turn)";

/// Effect keywords whose presence marks a status/movement effect clause.
const EFFECT_KEYWORDS: &str = r"(?:prone(?:(?:and )?can[' ]?t stand)?|rage|slowed|weakened|frightened|bleeding|grabbed|taunted|restrained|speed|shift\s?[1-9]?|move|push\s?[1-9]?|pull\s?[1-9]?|slide\s?[1-9]?|fly|hover|teleport\s?[1-9]?|stand up|recovery|immunity|weakness|temporary stamina|DURATION)";

/// Effect keywords that carry a trailing number ("push 3", "slide 5").
const NUMBER_KEYWORDS: &str = r"shift|move|push|pull|slide|fly|teleport|immunity|weakness";

fn effect_keywords() -> String {
    EFFECT_KEYWORDS.replace("DURATION", DURATION)
}

fn range_fragment() -> String {
    r"[^1l!]*(?:11|12.16|17[4]?[+]?).?\s*".to_string()
}

fn damage_fragment() -> String {
    format!(
        r"[^0-9]?(?P<damage>[1-9][0-9]?)\s*[^0-9]?(?P<damageType>{})?[^0-9]?\s*damage;?\s*",
        DamageType::pattern_alternation()
    )
}

fn effect_fragment() -> String {
    format!(
        r"[^A-Za-z0-9]*(?P<effectText>[A-Za-z0-9 ,.-]+{kw}[A-Za-z0-9 ,.-]*(?:[(](?:{dur})?[)])?).*",
        kw = effect_keywords(),
        dur = DURATION
    )
}

fn potency_fragment() -> String {
    format!(
        r"[^MARIPmarip]*(?P<potencyChar>[MARIPmarip])\s?<\s?(?P<potencyValue>[0-6])[^A-Za-z0-9]*(?P<potencyText>[A-Za-z0-9;',. +-]+\s*(?:[(](?:{dur})[)])?)",
        dur = DURATION
    )
}

/// Which facets a cascade pattern asserts.
#[derive(Debug, Clone, Copy)]
struct Facets {
    damage: bool,
    effect: bool,
    potency: bool,
}

/// The cascade, most specific first. The first matching pattern wins.
static CASCADE: Lazy<Vec<(Facets, Regex)>> = Lazy::new(|| {
    let range = range_fragment();
    let damage = damage_fragment();
    let effect = effect_fragment();
    let potency = potency_fragment();
    let compile = |body: String| Regex::new(&format!("(?i)^{range}{body}")).unwrap();

    vec![
        (
            Facets { damage: true, effect: true, potency: true },
            compile(format!("{damage}{effect}{potency}.*$")),
        ),
        (
            Facets { damage: true, effect: false, potency: true },
            compile(format!("{damage}{potency}.*$")),
        ),
        (
            Facets { damage: true, effect: true, potency: false },
            compile(format!("{damage}{effect}.*$")),
        ),
        (
            Facets { damage: true, effect: false, potency: false },
            compile(format!("{damage}.*$")),
        ),
        (
            Facets { damage: false, effect: true, potency: true },
            compile(format!("{effect}{potency}.*$")),
        ),
        (
            Facets { damage: false, effect: false, potency: true },
            compile(format!("{potency}.*$")),
        ),
        (
            Facets { damage: false, effect: true, potency: false },
            compile(format!("{effect}.*$")),
        ),
        (
            Facets { damage: false, effect: true, potency: false },
            compile(r"(?P<effectText>No effect).*$".to_string()),
        ),
    ]
});

/// Loose band-prefix shape used to spot tier lines during block scanning.
static TIER_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^1]{0,9}(?:11|12.16|17).").unwrap());

/// Whether a line opens a power roll tier.
pub fn is_tier_line(line: &str) -> bool {
    TIER_LINE.is_match(line.trim())
}

// ============================================================================
// Repairs
// ============================================================================

enum Repair {
    Literal(&'static str, &'static str),
    Rx(Regex, &'static str),
}

/// The ordered repair table. Regex repairs re-insert the anchor text they
/// matched on, so a repair never destroys its own context.
static REPAIRS: Lazy<Vec<Repair>> = Lazy::new(|| {
    let types = DamageType::pattern_alternation();
    let before_damage = |confused: &str| {
        format!(r"{confused}(?P<rest>\s?(?:{types})?\s?damage;?)")
    };
    let rx = |pattern: String, replacement: &'static str| {
        Repair::Rx(Regex::new(&pattern).unwrap(), replacement)
    };

    vec![
        // Outcome bands written out in words
        rx(r"(?i)^\s*(?:<\s*)?11\s+or\s+lower\b".to_string(), "<11"),
        rx(r"(?i)^\s*17\s*or\s*higher\b".to_string(), "17+"),
        rx(r"(?i)^\s*12\s*(?:to|-|–)\s*16\b".to_string(), "12-16"),
        // Recurring whole-word garbles
        Repair::Literal("damase", "damage"),
        Repair::Literal("a aken", "and weakened"),
        Repair::Literal("corruptiond e", "corruption damage;"),
        Repair::Literal("erabbed", "grabbed"),
        Repair::Literal("Verticalsiide", "Vertical slide"),
        Repair::Literal("coruption", "corruption"),
        Repair::Literal("sorruption", "corruption"),
        Repair::Literal("S5S", "5 "),
        // Digits misread as letters, keyed on the following "damage"
        rx(before_damage("Z"), "7 $rest"),
        rx(before_damage("G"), "6 $rest"),
        rx(before_damage("S"), "5 $rest"),
        rx(before_damage("(?:Ji|JQ)"), "10 $rest"),
        rx(before_damage("JL"), "11 $rest"),
        rx(before_damage("[Ii]"), "1 $rest"),
        rx(before_damage("[Oo]"), "0 $rest"),
        // Unglue damage amount from its type
        rx(
            format!(r"(?P<amount>[1-5]?[0-9])(?P<rest>(?:{types})?\s?damage;?)"),
            "$amount $rest ",
        ),
        // Potency marker repairs, keyed on the M/A/R/I/P initial
        rx(r"(?P<c>[MARIPmarip]).?<.?(?P<v>[0-5])".to_string(), "$c<$v"),
        rx(r"(?P<c>[MARIPmarip])[^<](?P<v>[0-5])".to_string(), "$c<$v"),
        rx(r"[1l](?P<rest><(?:[0-5]|[Oo]))".to_string(), "I$rest"),
        rx(r"(?P<c>[MARIPmarip]<)[Oo]".to_string(), "${c}0"),
        rx(r"<.11".to_string(), "<11"),
        rx(r"^[^1<]{0,9}(?P<band><11|17\+|12-16)".to_string(), "$band"),
        rx(r"^\+\s+(?P<rest>11)".to_string(), "<$rest"),
    ]
});

/// Number repairs after movement/value keywords ("push s" -> "push 5").
static NUMBER_KEYWORD_REPAIRS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(&format!(r"(?P<kw>{NUMBER_KEYWORDS})\s?[Ii](?:\b|$)")).unwrap(),
            "$kw 1",
        ),
        (
            Regex::new(&format!(r"(?P<kw>{NUMBER_KEYWORDS})\s?[Ss](?:\b|$)")).unwrap(),
            "$kw 5",
        ),
        (
            Regex::new(&format!(r"(?P<kw>{NUMBER_KEYWORDS})\s?G(?:\b|$)")).unwrap(),
            "$kw 6",
        ),
        (
            Regex::new(&format!(r"(?P<kw>{NUMBER_KEYWORDS})(?P<n>[1-9])")).unwrap(),
            "$kw $n",
        ),
    ]
});

/// Hard phrase reconstructions for garbles no generic rule can reach.
static PHRASE_REPAIRS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"nulls").unwrap(), "pull 5"),
        (
            Regex::new(r"(?P<a>3 corruption damage) 0 (?P<b>weakened \(save ends\))").unwrap(),
            "$a I<0 $b",
        ),
        (Regex::new(r"<11 0prone").unwrap(), "<11 I<0 prone"),
        (
            Regex::new(r"(?P<a>prone.*) As (?P<b>bleeding)").unwrap(),
            "$a A<2 $b",
        ),
        (Regex::new(r"bleedi$").unwrap(), "bleeding (save ends)"),
    ]
});

static JUNK_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9();' <+-]").unwrap());
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ ]{2,}").unwrap());

/// Apply the full repair pass to one tier line.
pub fn normalize_tier_line(line: &str) -> String {
    let mut text = JUNK_CHARS.replace_all(line, " ").to_string();

    for repair in REPAIRS.iter() {
        match repair {
            Repair::Literal(bad, good) => {
                if text.contains(bad) {
                    text = text.replace(bad, good);
                }
            }
            Repair::Rx(pattern, replacement) => {
                text = pattern.replace_all(&text, *replacement).to_string();
            }
        }
    }
    for (pattern, replacement) in NUMBER_KEYWORD_REPAIRS.iter() {
        text = pattern.replace_all(&text, *replacement).to_string();
    }
    text = SPACE_RUN.replace_all(&text, " ").to_string();
    for (pattern, replacement) in PHRASE_REPAIRS.iter() {
        text = pattern.replace_all(&text, *replacement).to_string();
    }
    text = text.replace("can t", "can't");
    text = text.replace(
        "PsZlevitated forthe rest of the encounter",
        "P<3 levitated (EoE)",
    );
    text = text.replace(
        "12 damage M<2 grabbed target has a bane on",
        "12 damage M<2 grabbed, target has a bane on escaping the grab",
    );
    text.trim().to_string()
}

// ============================================================================
// Tier parsing
// ============================================================================

fn decode_potency(caps: &regex::Captures<'_>) -> Option<PotencyEffect> {
    let initial = caps.name("potencyChar")?.as_str().chars().next()?;
    let characteristic = Characteristic::from_initial(initial)?;
    let value: u8 = caps.name("potencyValue")?.as_str().parse().ok()?;
    let text = caps.name("potencyText")?.as_str().trim();
    Some(PotencyEffect {
        target_characteristic: characteristic,
        value,
        effect: Effect::from_text(text),
    })
}

/// Classify one (joined) tier line.
///
/// On success the tier carries exactly the facets asserted by the first
/// matching cascade pattern. On failure the repaired text is returned so
/// the caller can build a diagnostic or a fatal error with full context.
pub fn parse_tier_line(line: &str) -> Result<PowerRollTier, String> {
    let normalized = normalize_tier_line(line);

    for (facets, pattern) in CASCADE.iter() {
        let Some(caps) = pattern.captures(&normalized) else {
            continue;
        };

        let mut tier = PowerRollTier::default();
        if facets.damage {
            tier.damage = caps
                .name("damage")
                .and_then(|m| m.as_str().parse().ok());
            tier.damage_type = caps
                .name("damageType")
                .and_then(|m| DamageType::from_ocr_token(m.as_str()));
        }
        if facets.effect {
            if let Some(text) = caps.name("effectText") {
                tier.effect = Some(Effect::from_text(text.as_str().trim()));
            }
        }
        if facets.potency {
            tier.potency_effect = decode_potency(&caps);
        }
        return Ok(tier);
    }

    Err(normalized)
}

// ============================================================================
// Tests
// ============================================================================
