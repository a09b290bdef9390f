//! Scalar and structured stat fields of a monster block.
//!
//! Every field is located by its own labeled pattern scanned across the
//! block's lines; the source never guarantees line order. The structurally
//! mandatory fields (EV, stamina, speed, size/stability, free strike,
//! characteristics) abort the block when absent; everything else degrades
//! to a diagnostic.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{DiagnosticSink, Stage};
use crate::error::{ExtractError, Result};
use crate::model::{CaptainBonus, Characteristics, DamageModifiers, DamageType};
use crate::normalize::{ocr_int, sanitize_name, title_case};
use crate::vocabulary::MONSTER_KEYWORDS;

/// How many leading lines may carry the keywords/EV row.
const EV_SCAN_LINES: usize = 6;

// ============================================================================
// Keywords and encounter value
// ============================================================================

static EV_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bEV\s*[:\-]?\s*(?P<ev>[0-9Oo]+)").unwrap());

static KEYWORD_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,/]").unwrap());

/// Extract the keyword list and encounter value from the block's leading
/// lines. Unrecognized keyword tokens are reported and dropped; a missing
/// EV marker aborts the block.
pub fn parse_keywords_and_ev(
    lines: &[String],
    sink: &mut DiagnosticSink,
) -> Result<(Vec<String>, u32)> {
    for line in lines.iter().take(EV_SCAN_LINES) {
        let Some(caps) = EV_RE.captures(line) else {
            continue;
        };
        let ev = ocr_int(caps.name("ev").map_or("", |m| m.as_str())).unwrap_or(0).max(0) as u32;

        let marker_start = caps.get(0).map_or(0, |m| m.start());
        let left = &line[..marker_start];

        let mut keywords = Vec::new();
        for candidate in KEYWORD_SPLIT.split(left) {
            let candidate = candidate.trim();
            if candidate.is_empty() {
                continue;
            }
            let token = title_case(&sanitize_name(candidate));
            let lower = token.to_lowercase();
            if MONSTER_KEYWORDS.contains(token.as_str()) {
                keywords.push(token);
            } else if lower == "human rival" {
                // A known two-word compound that stands for two keywords.
                keywords.push("Human".to_string());
                keywords.push("Rival".to_string());
            } else if lower == "angutotl" {
                keywords.push("Angulotl".to_string());
            } else {
                sink.warn(Stage::Metadata, format!("unknown keyword '{token}'"), Some(line));
            }
        }
        return Ok((keywords, ev));
    }
    Err(ExtractError::MissingEncounterValue {
        scanned: lines.len().min(EV_SCAN_LINES),
    })
}

// ============================================================================
// Labeled integers
// ============================================================================

static STAMINA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bStamina\s+(?P<n>[0-9O]+)").unwrap());

static SPEED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bSpeed\s+(?P<n>[0-9O]+)\s*(?:\((?P<types>[^)]+)\))?").unwrap());

static SIZE_STABILITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bSize\s+(?P<size>\w+)\s*/\s*Stability\s*(?P<stability>[0-9O]+)").unwrap()
});

static FREE_STRIKE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bFree Strike\s*(?P<n>[0-9O]+)").unwrap());

/// Find the monster's stamina.
pub fn parse_stamina(lines: &[String]) -> Result<u32> {
    lines
        .iter()
        .find_map(|line| STAMINA_RE.captures(line))
        .and_then(|caps| ocr_int(&caps["n"]))
        .map(|n| n.max(0) as u32)
        .ok_or(ExtractError::MissingStamina)
}

/// Find the monster's speed and parenthesized movement types
/// (defaulting to walking when none are listed).
pub fn parse_speed(lines: &[String]) -> Result<(u32, Vec<String>)> {
    for line in lines {
        let Some(caps) = SPEED_RE.captures(line) else {
            continue;
        };
        let speed = ocr_int(&caps["n"]).unwrap_or(0).max(0) as u32;
        let movement_types = match caps.name("types") {
            Some(types) => types
                .as_str()
                .split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            None => vec!["walk".to_string()],
        };
        return Ok((speed, movement_types));
    }
    Err(ExtractError::MissingSpeed)
}

/// Find the paired size and stability values.
pub fn parse_size_and_stability(lines: &[String]) -> Result<(String, u32)> {
    for line in lines {
        let Some(caps) = SIZE_STABILITY_RE.captures(line) else {
            continue;
        };
        let size = caps["size"].to_string();
        let stability = ocr_int(&caps["stability"]).unwrap_or(0).max(0) as u32;
        return Ok((size, stability));
    }
    Err(ExtractError::MissingSizeStability)
}

/// Find the monster's free-strike damage.
pub fn parse_free_strike(lines: &[String]) -> Result<u32> {
    lines
        .iter()
        .find_map(|line| FREE_STRIKE_RE.captures(line))
        .and_then(|caps| ocr_int(&caps["n"]))
        .map(|n| n.max(0) as u32)
        .ok_or(ExtractError::MissingFreeStrike)
}

// ============================================================================
// Characteristics
// ============================================================================

static STAT_JUNK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9 +-]").unwrap());
static ZERO_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s)[0Oo]+(?:\s|$)").unwrap());
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// OCR garbles of the characteristic labels themselves.
const LABEL_FIXUPS: &[(&str, &str)] = &[
    ("M1ght", "Might"),
    ("Agi1ity", "Agility"),
    ("Reas0n", "Reason"),
    ("Intuiti0n", "Intuition"),
    ("Presense", "Presence"),
];

static CHARACTERISTICS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^Might\s*(?P<might>-?\d)\s*Agility\s*(?P<agility>-?\d)\s*Reason\s*(?P<reason>-?\d)\s*Intuition\s*(?P<intuition>-?\d)\s*Presence\s*(?P<presence>-?\d)",
    )
    .unwrap()
});

fn parse_characteristics_line(line: &str) -> Option<Characteristics> {
    let mut cleaned = STAT_JUNK.replace_all(line, "").to_string();
    for (bad, good) in LABEL_FIXUPS {
        if cleaned.contains(bad) {
            cleaned = cleaned.replace(bad, good);
        }
    }
    let cleaned = cleaned.replace('+', " ");
    let cleaned = ZERO_RUN.replace_all(&cleaned, " 0 ").to_string();
    let cleaned = SPACE_RUN.replace_all(&cleaned, " ").trim().to_string();

    let caps = CHARACTERISTICS_RE.captures(&cleaned)?;
    let score = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<i8>().ok());
    Some(Characteristics {
        might: score("might")?,
        agility: score("agility")?,
        reason: score("reason")?,
        intuition: score("intuition")?,
        presence: score("presence")?,
    })
}

/// Locate the single line carrying all five characteristics. Its index
/// bounds the stat-header region scanned by the weakness/immunity and
/// captain parsers.
pub fn find_characteristics(lines: &[String]) -> Result<(Characteristics, usize)> {
    lines
        .iter()
        .enumerate()
        .find_map(|(index, line)| parse_characteristics_line(line).map(|c| (c, index)))
        .ok_or(ExtractError::MissingCharacteristics)
}

// ============================================================================
// Weakness / immunity
// ============================================================================

static IMMUNITY_WEAKNESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?P<label>Immunity|Weakness)\s+(?P<entries>[^/|]+)").unwrap());

/// Scan the stat-header region for immunity and weakness tables.
/// Unknown damage-type tokens are reported and skipped.
pub fn parse_immunity_and_weakness(
    lines: &[String],
    characteristics_index: usize,
    sink: &mut DiagnosticSink,
) -> (Option<DamageModifiers>, Option<DamageModifiers>) {
    let mut weakness = DamageModifiers::default();
    let mut immunity = DamageModifiers::default();
    if lines.is_empty() {
        return (None, None);
    }

    for line in &lines[..=characteristics_index.min(lines.len() - 1)] {
        let repaired = line.replace(['O', 'o'], "0");
        for field in IMMUNITY_WEAKNESS_RE.captures_iter(&repaired) {
            let is_immunity = field["label"].eq_ignore_ascii_case("immunity");
            for entry in field["entries"].split(',') {
                let tokens: Vec<&str> = entry.split_whitespace().collect();
                let [type_token, value_token] = tokens.as_slice() else {
                    continue;
                };
                let Some(damage_type) = DamageType::from_ocr_token(type_token) else {
                    sink.warn(
                        Stage::Metadata,
                        format!("unknown damage type '{type_token}' in {}", &field["label"]),
                        Some(line),
                    );
                    continue;
                };
                let Ok(value) = value_token.parse::<i32>() else {
                    continue;
                };
                if is_immunity {
                    immunity.insert(damage_type, value);
                } else {
                    weakness.insert(damage_type, value);
                }
            }
        }
    }

    (
        (!weakness.is_empty()).then_some(weakness),
        (!immunity.is_empty()).then_some(immunity),
    )
}

// ============================================================================
// Captain bonus (minions)
// ============================================================================

static WITH_CAPTAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)with captain\s*(?P<rest>.+)").unwrap());

static TEMP_STAMINA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:(?P<pre>\d+)\s+temporary stamina|temporary stamina\s+(?P<post>\d+))")
        .unwrap()
});

static SIGNED_INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[+\-]?\d+").unwrap());

/// Named-bonus phrases in match priority order.
const CAPTAIN_BONUS_PHRASES: &[(&str, fn(i32) -> CaptainBonus)] = &[
    ("speed", CaptainBonus::Speed),
    ("ranged distance", CaptainBonus::RangedDistance),
    ("melee distance", CaptainBonus::MeleeDistance),
    ("strike damage", CaptainBonus::StrikeDamage),
    ("strike edge", CaptainBonus::StrikeEdge),
    ("edge on strikes", CaptainBonus::EdgeOnStrikes),
];

/// Find the minion's `with captain` bonus within the stat-header region.
/// Mandatory for minions; never consulted for other organizations.
pub fn parse_with_captain(lines: &[String], characteristics_index: usize) -> Result<CaptainBonus> {
    if lines.is_empty() {
        return Err(ExtractError::MissingCaptainBonus);
    }
    for line in &lines[..=characteristics_index.min(lines.len() - 1)] {
        let Some(caps) = WITH_CAPTAIN_RE.captures(line) else {
            continue;
        };
        let rest = caps["rest"].trim().to_lowercase();

        if let Some(ts) = TEMP_STAMINA_RE.captures(&rest) {
            let value = ts
                .name("pre")
                .or_else(|| ts.name("post"))
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            return Ok(CaptainBonus::TemporaryStamina(value));
        }

        for (phrase, build) in CAPTAIN_BONUS_PHRASES {
            if rest.contains(phrase) {
                if let Some(m) = SIGNED_INT_RE.find(&rest) {
                    if let Ok(value) = m.as_str().parse() {
                        return Ok(build(value));
                    }
                }
            }
        }
    }
    Err(ExtractError::MissingCaptainBonus)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keywords_and_ev() {
        let mut sink = DiagnosticSink::new();
        let (keywords, ev) =
            parse_keywords_and_ev(&lines(&["Goblin, Humanoid EV 6"]), &mut sink).unwrap();
        assert_eq!(keywords, vec!["Goblin", "Humanoid"]);
        assert_eq!(ev, 6);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_keywords_unknown_token_reported() {
        let mut sink = DiagnosticSink::new();
        let (keywords, ev) =
            parse_keywords_and_ev(&lines(&["Sneaky, Undead EV 12"]), &mut sink).unwrap();
        assert_eq!(keywords, vec!["Undead"]);
        assert_eq!(ev, 12);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_keywords_human_rival_expands() {
        let mut sink = DiagnosticSink::new();
        let (keywords, _) =
            parse_keywords_and_ev(&lines(&["Human Rival EV 9"]), &mut sink).unwrap();
        assert_eq!(keywords, vec!["Human", "Rival"]);
    }

    #[test]
    fn test_ev_ocr_o_confusion() {
        let mut sink = DiagnosticSink::new();
        let (_, ev) = parse_keywords_and_ev(&lines(&["Undead EV 1O"]), &mut sink).unwrap();
        assert_eq!(ev, 10);
    }

    #[test]
    fn test_ev_missing_is_fatal() {
        let mut sink = DiagnosticSink::new();
        let err = parse_keywords_and_ev(&lines(&["no marker here"]), &mut sink).unwrap_err();
        assert!(matches!(err, ExtractError::MissingEncounterValue { .. }));
    }

    #[test]
    fn test_ev_only_scans_leading_lines() {
        let mut sink = DiagnosticSink::new();
        let mut doc = vec!["filler".to_string(); EV_SCAN_LINES];
        doc.push("Undead EV 3".to_string());
        assert!(parse_keywords_and_ev(&doc, &mut sink).is_err());
    }

    #[test]
    fn test_stamina() {
        assert_eq!(parse_stamina(&lines(&["filler", "Stamina 15"])).unwrap(), 15);
        assert_eq!(parse_stamina(&lines(&["Stamina 2O"])).unwrap(), 20);
        assert!(parse_stamina(&lines(&["no stamina"])).is_err());
    }

    #[test]
    fn test_speed_with_movement_types() {
        let (speed, types) = parse_speed(&lines(&["Speed 5 (fly, hover)"])).unwrap();
        assert_eq!(speed, 5);
        assert_eq!(types, vec!["fly", "hover"]);
    }

    #[test]
    fn test_speed_defaults_to_walk() {
        let (speed, types) = parse_speed(&lines(&["Speed 6"])).unwrap();
        assert_eq!(speed, 6);
        assert_eq!(types, vec!["walk"]);
    }

    #[test]
    fn test_size_and_stability() {
        let (size, stability) =
            parse_size_and_stability(&lines(&["Size 1M / Stability 0"])).unwrap();
        assert_eq!(size, "1M");
        assert_eq!(stability, 0);
    }

    #[test]
    fn test_free_strike() {
        assert_eq!(parse_free_strike(&lines(&["Free Strike 2"])).unwrap(), 2);
        assert!(parse_free_strike(&lines(&["nothing"])).is_err());
    }

    #[test]
    fn test_characteristics_plain() {
        let (c, index) = find_characteristics(&lines(&[
            "Stamina 15",
            "Might +2 Agility +1 Reason +0 Intuition -1 Presence -2",
        ]))
        .unwrap();
        assert_eq!(index, 1);
        assert_eq!(c.might, 2);
        assert_eq!(c.agility, 1);
        assert_eq!(c.reason, 0);
        assert_eq!(c.intuition, -1);
        assert_eq!(c.presence, -2);
    }

    #[test]
    fn test_characteristics_ocr_garbles() {
        let (c, _) = find_characteristics(&lines(&[
            "Might -2 Agility +2 Reas0n +O Intuiti0n +0 Presence -2",
        ]))
        .unwrap();
        assert_eq!(c.might, -2);
        assert_eq!(c.agility, 2);
        assert_eq!(c.reason, 0);
        assert_eq!(c.intuition, 0);
        assert_eq!(c.presence, -2);
    }

    #[test]
    fn test_characteristics_missing_is_fatal() {
        let err = find_characteristics(&lines(&["Might +2 Agility +1"])).unwrap_err();
        assert_eq!(err, ExtractError::MissingCharacteristics);
    }

    #[test]
    fn test_weakness_line() {
        let mut sink = DiagnosticSink::new();
        let doc = lines(&[
            "Weakness fire 5, cold 2",
            "Might +0 Agility +0 Reason +0 Intuition +0 Presence +0",
        ]);
        let (weakness, immunity) = parse_immunity_and_weakness(&doc, 1, &mut sink);
        let weakness = weakness.unwrap();
        assert_eq!(weakness.get(&DamageType::Fire), Some(&5));
        assert_eq!(weakness.get(&DamageType::Cold), Some(&2));
        assert!(immunity.is_none());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_immunity_with_zero_garbled_type() {
        let mut sink = DiagnosticSink::new();
        let doc = lines(&[
            "Immunity c0rrupti0n 3, holy 1",
            "Might +0 Agility +0 Reason +0 Intuition +0 Presence +0",
        ]);
        let (_, immunity) = parse_immunity_and_weakness(&doc, 1, &mut sink);
        let immunity = immunity.unwrap();
        assert_eq!(immunity.get(&DamageType::Corruption), Some(&3));
        assert_eq!(immunity.get(&DamageType::Holy), Some(&1));
    }

    #[test]
    fn test_unknown_damage_type_reported() {
        let mut sink = DiagnosticSink::new();
        let doc = lines(&[
            "Weakness radiant 5",
            "Might +0 Agility +0 Reason +0 Intuition +0 Presence +0",
        ]);
        let (weakness, _) = parse_immunity_and_weakness(&doc, 1, &mut sink);
        assert!(weakness.is_none());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_weakness_ignored_after_characteristics() {
        let mut sink = DiagnosticSink::new();
        let doc = lines(&[
            "Might +0 Agility +0 Reason +0 Intuition +0 Presence +0",
            "Weakness fire 5",
        ]);
        let (weakness, _) = parse_immunity_and_weakness(&doc, 0, &mut sink);
        assert!(weakness.is_none());
    }

    #[test]
    fn test_captain_temporary_stamina() {
        let bonus =
            parse_with_captain(&lines(&["With Captain 4 temporary Stamina"]), 0).unwrap();
        assert_eq!(bonus, CaptainBonus::TemporaryStamina(4));
    }

    #[test]
    fn test_captain_named_bonus() {
        let bonus = parse_with_captain(&lines(&["With Captain ranged distance +5"]), 0).unwrap();
        assert_eq!(bonus, CaptainBonus::RangedDistance(5));

        let bonus = parse_with_captain(&lines(&["With Captain strike damage +1"]), 0).unwrap();
        assert_eq!(bonus, CaptainBonus::StrikeDamage(1));
    }

    #[test]
    fn test_captain_speed_bonus() {
        let bonus = parse_with_captain(&lines(&["With Captain speed +2"]), 0).unwrap();
        assert_eq!(bonus, CaptainBonus::Speed(2));
    }

    #[test]
    fn test_captain_missing_is_fatal() {
        let err = parse_with_captain(&lines(&["Stamina 7"]), 0).unwrap_err();
        assert_eq!(err, ExtractError::MissingCaptainBonus);
    }
}
