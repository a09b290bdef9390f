//! Distance and target clause parsing.
//!
//! Distance variants are tried most-specific-first so the melee+ranged pair
//! wins over its melee-only prefix. Target parsing never fails: it derives
//! flags and a count from whatever text is present.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ExtractError, Result};
use crate::model::{Distance, Target, TargetCount};

// ============================================================================
// Distance patterns
// ============================================================================

static SELF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Self").unwrap());

static MELEE_AND_RANGED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Melee\s*(?P<melee>\d\d?).*Ranged\s*(?P<ranged>\d\d?)").unwrap()
});

static MELEE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Melee\s*(?P<melee>\d\d?)").unwrap());

static RANGED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Ranged\s*(?P<ranged>\d\d?)").unwrap());

static BURST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[^0-9]*(?P<size>\d\d?)\s*burst").unwrap());

static CUBE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?P<size>\d\d?)\s*cube\s*within\s*(?P<within>\d\d?)").unwrap()
});

static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?P<width>\d\d?)\s*x\s*(?P<length>\d\d?)\s*line\s*within\s*(?P<within>\d\d?)")
        .unwrap()
});

fn capture_u32(caps: &regex::Captures<'_>, name: &str) -> u32 {
    caps.name(name)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Parse a `Distance ...` line into its variant.
///
/// The label itself is stripped first; what remains is matched against the
/// variant patterns in fixed priority order. An unmatched line is a fatal
/// error for the owning block.
pub fn parse_distance(line: &str) -> Result<Distance> {
    let source = line
        .trim()
        .strip_prefix("Distance")
        .unwrap_or(line)
        .trim()
        .to_string();
    if source.is_empty() {
        return Err(ExtractError::EmptyDistance {
            line: line.to_string(),
        });
    }

    // The target clause often shares the line; it must not feed the
    // distance patterns.
    let distance_part = match source.find("Target") {
        Some(at) => source[..at].trim(),
        None => source.as_str(),
    };

    if SELF_RE.is_match(distance_part) {
        return Ok(Distance::Personal);
    }
    if let Some(caps) = MELEE_AND_RANGED_RE.captures(distance_part) {
        return Ok(Distance::MeleeAndRanged {
            melee: capture_u32(&caps, "melee"),
            ranged: capture_u32(&caps, "ranged"),
        });
    }
    if let Some(caps) = MELEE_RE.captures(distance_part) {
        return Ok(Distance::Melee(capture_u32(&caps, "melee")));
    }
    if let Some(caps) = RANGED_RE.captures(distance_part) {
        return Ok(Distance::Ranged(capture_u32(&caps, "ranged")));
    }
    if let Some(caps) = BURST_RE.captures(distance_part) {
        return Ok(Distance::Burst(capture_u32(&caps, "size")));
    }
    if let Some(caps) = CUBE_RE.captures(distance_part) {
        return Ok(Distance::Cube {
            size: capture_u32(&caps, "size"),
            within: capture_u32(&caps, "within"),
        });
    }
    if let Some(caps) = LINE_RE.captures(distance_part) {
        return Ok(Distance::Line {
            width: capture_u32(&caps, "width"),
            length: capture_u32(&caps, "length"),
            within: capture_u32(&caps, "within"),
        });
    }
    if distance_part.to_lowercase().contains("special") {
        return Ok(Distance::Special);
    }

    Err(ExtractError::UnmatchedDistance {
        line: line.to_string(),
    })
}

// ============================================================================
// Target patterns
// ============================================================================

static IN_THE_AREA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*in the (?:area|aura|burst|cube|line|square)\s*").unwrap());

static NUMBER_WORDS: &[(&str, &str)] = &[
    ("one", "1"),
    ("two", "2"),
    ("three", "3"),
    ("four", "4"),
    ("five", "5"),
];

static ALL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:all|each|every)\b").unwrap());

static COUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[1-5]").unwrap());

static SPECIAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)special").unwrap());
static SELF_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bself\b").unwrap());
static ALLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:ally|allies)\b").unwrap());
static CREATURE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bcreatures?\b").unwrap());
static ENEMY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:enemy|enemies)\b").unwrap());
static HERO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bhero(?:es|s)?\b").unwrap());
static OBJECT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bobjects?\b").unwrap());

/// Parse the `Target ...` clause of a distance-and-target line.
///
/// Returns `None` when no `Target` label is present (unusual, not illegal).
/// Flags are derived by keyword: "creature" implies ally+self+enemy and
/// "hero" implies ally+self.
pub fn parse_target(line: &str) -> Option<Target> {
    let after_label = line.rsplit_once("Target").map(|(_, rest)| rest)?;

    let mut normalized = IN_THE_AREA_RE.replace_all(after_label.trim(), "").to_string();
    for (word, digit) in NUMBER_WORDS {
        let pattern = Regex::new(&format!(r"(?i)\b{word}\s")).unwrap();
        normalized = pattern.replace_all(&normalized, format!("{digit} ")).to_string();
    }
    let normalized = normalized.trim().to_string();

    let mut target = Target {
        text: normalized.clone(),
        ..Target::default()
    };

    if SPECIAL_RE.is_match(&normalized) {
        target.special = true;
    }
    if SELF_WORD_RE.is_match(&normalized) {
        target.is_self = true;
    }
    if ALLY_RE.is_match(&normalized) {
        target.ally = true;
    }
    if CREATURE_RE.is_match(&normalized) {
        target.ally = true;
        target.is_self = true;
        target.enemy = true;
    }
    if ENEMY_RE.is_match(&normalized) {
        target.enemy = true;
    }
    if HERO_RE.is_match(&normalized) {
        target.ally = true;
        target.is_self = true;
    }
    if OBJECT_RE.is_match(&normalized) {
        target.object = true;
    }

    if target.special {
        // "special" replaces a count; the text is the whole contract.
    } else if ALL_RE.is_match(&normalized) {
        target.count = Some(TargetCount::All);
    } else if let Some(m) = COUNT_RE.find(&normalized) {
        if let Ok(n) = m.as_str().parse() {
            target.count = Some(TargetCount::Count(n));
        }
    }

    Some(target)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Distance Self", Distance::Personal)]
    #[case("Distance Melee 1", Distance::Melee(1))]
    #[case("Distance Ranged 12", Distance::Ranged(12))]
    #[case("Distance Melee 1 or Ranged 5", Distance::MeleeAndRanged { melee: 1, ranged: 5 })]
    #[case("Distance 2 burst", Distance::Burst(2))]
    #[case("Distance 3 cube within 1", Distance::Cube { size: 3, within: 1 })]
    #[case("Distance 5 x 1 line within 1", Distance::Line { width: 5, length: 1, within: 1 })]
    #[case("Distance Special", Distance::Special)]
    fn test_distance_variants(#[case] line: &str, #[case] expected: Distance) {
        assert_eq!(parse_distance(line).unwrap(), expected);
    }

    #[test]
    fn test_distance_ignores_target_clause() {
        // The count in "Target 1 creature" must not be read as a burst size.
        let distance = parse_distance("Distance 2 burst Target Each enemy in the burst").unwrap();
        assert_eq!(distance, Distance::Burst(2));
    }

    #[test]
    fn test_distance_unmatched_is_fatal() {
        let err = parse_distance("Distance eldritch nonsense").unwrap_err();
        assert!(matches!(err, ExtractError::UnmatchedDistance { .. }));
    }

    #[test]
    fn test_distance_empty_is_fatal() {
        let err = parse_distance("Distance").unwrap_err();
        assert!(matches!(err, ExtractError::EmptyDistance { .. }));
    }

    #[test]
    fn test_target_one_creature() {
        let target = parse_target("Distance Melee 1 Target One creature").unwrap();
        assert_eq!(target.count, Some(TargetCount::Count(1)));
        assert!(target.ally && target.is_self && target.enemy);
        assert!(!target.object);
    }

    #[test]
    fn test_target_each_enemy_is_all() {
        let target = parse_target("Target Each enemy in the burst").unwrap();
        assert_eq!(target.count, Some(TargetCount::All));
        assert!(target.enemy);
        assert!(!target.ally);
        assert_eq!(target.text, "Each enemy");
    }

    #[test]
    fn test_target_hero_implies_ally_and_self() {
        let target = parse_target("Target 1 hero").unwrap();
        assert!(target.ally && target.is_self);
        assert!(!target.enemy);
        assert_eq!(target.count, Some(TargetCount::Count(1)));
    }

    #[test]
    fn test_target_number_word_substitution() {
        let target = parse_target("Target Two allies").unwrap();
        assert_eq!(target.count, Some(TargetCount::Count(2)));
        assert!(target.ally);
        assert_eq!(target.text, "2 allies");
    }

    #[test]
    fn test_target_special_sets_flag_not_count() {
        let target = parse_target("Target Special").unwrap();
        assert!(target.special);
        assert!(target.count.is_none());
    }

    #[test]
    fn test_target_absent_label() {
        assert!(parse_target("Distance Melee 1").is_none());
    }

    #[test]
    fn test_target_objects_flag() {
        let target = parse_target("Target 2 creatures or objects").unwrap();
        assert!(target.object);
        assert!(target.enemy && target.ally && target.is_self);
        assert_eq!(target.count, Some(TargetCount::Count(2)));
    }
}
