//! Ability header grammar and body field extraction.
//!
//! The header carries name, action type, an optional `2d10 + n` bonus, and
//! an optional cost. The body is a line-oriented state machine: labeled
//! lines (Keywords, Distance, Target, Trigger, Effect) switch state, tier
//! lines accumulate into the power roll, and everything else continues
//! whichever bucket is open.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{DiagnosticSink, Stage};
use crate::error::{ExtractError, Result};
use crate::model::{
    Ability, AbilityKind, Effect, MaliceCost, MaliceEffect, PowerRoll, PowerRollTier,
};
use crate::normalize::title_case;
use crate::vocabulary::is_trait_name;

use super::distance::{parse_distance, parse_target};
use super::power_roll::{is_tier_line, parse_tier_line};

// ============================================================================
// Header grammar
// ============================================================================

static HEADER_JUNK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9!() +-]").unwrap());
static DOUBLE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Known OCR garbles of cost tokens, repaired before the grammar runs.
const HEADER_FIXUPS: &[(&str, &str)] = &[("2 9 3 Malice", "2 3 Malice"), ("2 0 5 Malice", "2 5 Malice")];

static ABILITY_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        ^(?P<name>[A-Za-z][A-Za-z!?\ ]+[A-Za-z!?])\s?
        \((?P<kind>(?:Free\ )?(?:Triggered\ Action|Maneuver|Villain\ Action\ ?[123]?|(?:Main\ )?Action))\)\s?
        (?:2[Dd]1[0oO]\s*\+\s*(?P<bonus>[-+]?[1-5])\s*)?\s?
        (?:(?P<malice>[0-9]{1,2})\s?Malice|(?P<signature>Signature))?",
    )
    .unwrap()
});

static VILLAIN_ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)villain action\s*(?P<n>[123])").unwrap());

/// Header fields before body extraction.
#[derive(Debug)]
pub struct AbilityHeader {
    pub name: String,
    pub kind: AbilityKind,
    pub villain_action_ordinal: Option<u8>,
    pub malice_cost: Option<MaliceCost>,
    pub power_roll_bonus: Option<i8>,
    pub raw: String,
}

/// Parse one ability header line. `None` means the header failed the
/// grammar (recoverable; the caller records a diagnostic).
pub fn parse_ability_header(line: &str) -> Option<AbilityHeader> {
    let mut normalized = HEADER_JUNK.replace_all(line, "").to_string();
    for (bad, good) in HEADER_FIXUPS {
        if normalized.contains(bad) {
            normalized = normalized.replace(bad, good);
        }
    }
    let normalized = DOUBLE_SPACE.replace_all(&normalized, " ").trim().to_string();

    let caps = ABILITY_HEADER_RE.captures(&normalized)?;

    let type_phrase = DOUBLE_SPACE
        .replace_all(caps.name("kind")?.as_str(), " ")
        .trim()
        .to_lowercase();
    let kind = AbilityKind::from_header_phrase(&type_phrase)?;

    // Villain actions carry a 1-3 ordinal prescribing use order; the token
    // stays in the display name so the sequence survives export.
    let villain_action_ordinal = (kind == AbilityKind::VillainAction)
        .then(|| {
            VILLAIN_ORDINAL_RE
                .captures(&type_phrase)
                .and_then(|c| c.name("n")?.as_str().parse().ok())
                .unwrap_or(1)
        });

    let malice_cost = if let Some(cost) = caps.name("malice") {
        cost.as_str().parse().ok().map(MaliceCost::Cost)
    } else if caps.name("signature").is_some() || normalized.to_lowercase().contains("signature") {
        Some(MaliceCost::Signature)
    } else {
        None
    };

    let power_roll_bonus = caps.name("bonus").and_then(|m| m.as_str().parse().ok());

    let base_name = caps.name("name")?.as_str().trim().to_string();
    let name = if kind == AbilityKind::VillainAction {
        format!("{base_name} ({})", title_case(&type_phrase))
    } else {
        base_name
    };

    Some(AbilityHeader {
        name,
        kind,
        villain_action_ordinal,
        malice_cost,
        power_roll_bonus,
        raw: line.trim().to_string(),
    })
}

// ============================================================================
// Body state machine
// ============================================================================

static MALICE_EFFECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^1-9]{0,3}(?P<cost>[1-9])\s*Malice[:.,;]?\s*(?P<rest>.*)$").unwrap()
});

/// Which continuation bucket is open while walking the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    None,
    PreEffect,
    PostEffect,
    MaliceEffect,
    Trigger,
    Tier,
}

#[derive(Default)]
struct Body {
    keywords: Vec<String>,
    distance: Option<crate::model::Distance>,
    target: Option<crate::model::Target>,
    trigger: Vec<String>,
    pre_effect: Vec<String>,
    post_effect: Vec<String>,
    malice_cost: Option<u8>,
    malice_effect: Vec<String>,
    tiers: Vec<Vec<String>>,
    roll_closed: bool,
}

fn strip_label<'a>(line: &'a str, label: &str) -> &'a str {
    line[label.len()..].trim_matches([':', ' ', '.', '-'])
}

/// Extract one ability from its block (header line plus body lines).
pub fn parse_ability_block(block: &[String], sink: &mut DiagnosticSink) -> Result<Ability> {
    let header_line = block[0].trim();

    let header = if is_trait_name(header_line) {
        AbilityHeader {
            name: title_case(header_line),
            kind: AbilityKind::MonsterTrait,
            villain_action_ordinal: None,
            malice_cost: None,
            power_roll_bonus: None,
            raw: header_line.to_string(),
        }
    } else {
        match parse_ability_header(header_line) {
            Some(header) => header,
            None => {
                sink.warn(
                    Stage::Abilities,
                    "ability header did not match the grammar",
                    Some(header_line),
                );
                return Ok(Ability::unparsed(header_line));
            }
        }
    };

    let mut body = Body::default();
    let mut bucket = Bucket::None;

    for raw in &block[1..] {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("Keywords") {
            body.keywords = rest
                .replace(',', " ")
                .split_whitespace()
                .map(str::to_string)
                .collect();
            bucket = Bucket::None;
        } else if line.starts_with("Distance") {
            handle_distance_line(line, &mut body, &mut bucket)?;
        } else if line.starts_with("Target") {
            if let Some(target) = parse_target(line) {
                body.target = Some(target);
            }
            bucket = Bucket::None;
        } else if line.starts_with("Trigger") {
            body.trigger.push(strip_label(line, "Trigger").to_string());
            bucket = Bucket::Trigger;
        } else if is_tier_line(line) && !body.roll_closed {
            body.tiers.push(vec![line.to_string()]);
            bucket = Bucket::Tier;
        } else if let Some(caps) = MALICE_EFFECT_RE.captures(line) {
            if !body.tiers.is_empty() {
                body.roll_closed = true;
            }
            body.malice_cost = caps.name("cost").and_then(|m| m.as_str().parse().ok());
            let rest = caps.name("rest").map_or("", |m| m.as_str()).trim();
            body.malice_effect = if rest.is_empty() { Vec::new() } else { vec![rest.to_string()] };
            bucket = Bucket::MaliceEffect;
        } else if line.starts_with("Effect") {
            if !body.tiers.is_empty() {
                body.roll_closed = true;
            }
            let rest = strip_label(line, "Effect").to_string();
            if body.tiers.is_empty() {
                body.pre_effect.push(rest);
                bucket = Bucket::PreEffect;
            } else {
                body.post_effect.push(rest);
                bucket = Bucket::PostEffect;
            }
        } else {
            // Continuation of whichever bucket is open.
            match bucket {
                Bucket::Tier => {
                    if let Some(tier) = body.tiers.last_mut() {
                        tier.push(line.to_string());
                    }
                }
                Bucket::PreEffect => body.pre_effect.push(line.to_string()),
                Bucket::PostEffect => body.post_effect.push(line.to_string()),
                Bucket::MaliceEffect => body.malice_effect.push(line.to_string()),
                Bucket::Trigger => body.trigger.push(line.to_string()),
                Bucket::None => {
                    // Trait prose has no labels; it is the trait's effect.
                    if header.kind == AbilityKind::MonsterTrait {
                        body.pre_effect.push(line.to_string());
                        bucket = Bucket::PreEffect;
                    }
                }
            }
        }
    }

    let power_roll = build_power_roll(&header, &body, sink)?;

    Ok(Ability {
        name: header.name,
        kind: header.kind,
        villain_action_ordinal: header.villain_action_ordinal,
        malice_cost: header.malice_cost,
        power_roll,
        keywords: body.keywords,
        distance: body.distance,
        target: body.target,
        trigger: join_nonempty(&body.trigger),
        pre_power_roll_effect: join_nonempty(&body.pre_effect).map(Effect::from_text),
        malice_effect: body.malice_cost.and_then(|cost| {
            join_nonempty(&body.malice_effect).map(|text| MaliceEffect {
                cost,
                effect: Effect::from_text(text),
            })
        }),
        post_power_roll_effect: join_nonempty(&body.post_effect).map(Effect::from_text),
        header_raw: header.raw,
    })
}

/// The source document mislabels two known lines as "Distance"; they are
/// rewritten by exact substring before generic distance parsing runs.
fn handle_distance_line(line: &str, body: &mut Body, bucket: &mut Bucket) -> Result<()> {
    if line.contains("The affected area is considered difficult terrain for") {
        body.post_effect.push(
            "The affected area is considered difficult terrain for the rest of the encounter."
                .to_string(),
        );
        *bucket = Bucket::PostEffect;
        return Ok(());
    }
    if line.contains("The target uses a strike that targets the mastermind") {
        body.trigger.push(strip_label(line, "Distance").to_string());
        *bucket = Bucket::Trigger;
        return Ok(());
    }

    body.distance = Some(parse_distance(line)?);
    if let Some(target) = parse_target(line) {
        body.target = Some(target);
    }
    *bucket = Bucket::None;
    Ok(())
}

fn join_nonempty(lines: &[String]) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    let joined = lines.join(" ").trim().to_string();
    (!joined.is_empty()).then_some(joined)
}

// ============================================================================
// Power roll assembly
// ============================================================================

fn build_power_roll(
    header: &AbilityHeader,
    body: &Body,
    sink: &mut DiagnosticSink,
) -> Result<Option<PowerRoll>> {
    if body.tiers.is_empty() {
        if header.power_roll_bonus.is_some() {
            sink.warn(
                Stage::PowerRoll,
                format!("'{}' declares a power roll bonus but has no tier lines", header.name),
                None,
            );
        }
        return Ok(None);
    }

    if body.tiers.len() != 3 {
        let found = body.tiers.len();
        if header.power_roll_bonus.is_some() {
            return Err(ExtractError::IncompleteTierSet {
                ability: header.name.clone(),
                found,
            });
        }
        sink.warn(
            Stage::PowerRoll,
            format!("'{}' has {found} power roll tiers, expected 3; roll dropped", header.name),
            None,
        );
        return Ok(None);
    }

    let mut tiers: Vec<PowerRollTier> = Vec::with_capacity(3);
    for group in &body.tiers {
        let joined = group.join(" ");
        match parse_tier_line(&joined) {
            Ok(tier) => tiers.push(tier),
            Err(normalized) => {
                // An unmatched tier line is fatal for an attack ability but
                // recoverable for a trait's incidental roll.
                if header.power_roll_bonus.is_some() {
                    return Err(ExtractError::UnmatchedTierLine {
                        ability: header.name.clone(),
                        line: joined,
                        normalized,
                    });
                }
                sink.warn(
                    Stage::PowerRoll,
                    format!("unmatched power roll line in '{}'; roll dropped", header.name),
                    Some(&joined),
                );
                return Ok(None);
            }
        }
    }

    let mut tiers = tiers.into_iter();
    Ok(Some(PowerRoll {
        bonus: header.power_roll_bonus,
        tier1: tiers.next().unwrap_or_default(),
        tier2: tiers.next().unwrap_or_default(),
        tier3: tiers.next().unwrap_or_default(),
    }))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Distance, TargetCount};

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    // ------------------------------------------------------------------------
    // Header grammar
    // ------------------------------------------------------------------------

    #[test]
    fn test_header_with_bonus_and_malice() {
        let header = parse_ability_header("Bite (Main Action) 2d10 + 3 2 Malice").unwrap();
        assert_eq!(header.name, "Bite");
        assert_eq!(header.kind, AbilityKind::MainAction);
        assert_eq!(header.power_roll_bonus, Some(3));
        assert_eq!(header.malice_cost, Some(MaliceCost::Cost(2)));
    }

    #[test]
    fn test_header_signature_is_marker_not_zero() {
        let header = parse_ability_header("Spear Charge (Main Action) 2d10 + 2 Signature").unwrap();
        assert_eq!(header.malice_cost, Some(MaliceCost::Signature));
    }

    #[test]
    fn test_header_without_cost_is_free() {
        let header = parse_ability_header("Club Swipe (Maneuver) 2d10 + 1").unwrap();
        assert!(header.malice_cost.is_none());
        assert_eq!(header.kind, AbilityKind::Maneuver);
    }

    #[test]
    fn test_header_free_triggered_action() {
        let header = parse_ability_header("Lash Back (Free Triggered Action)").unwrap();
        assert_eq!(header.kind, AbilityKind::FreeTriggeredAction);
        assert!(header.power_roll_bonus.is_none());
    }

    #[test]
    fn test_header_villain_action_ordinal_and_name() {
        let header = parse_ability_header("Get in There! (Villain Action 2) 3 Malice").unwrap();
        assert_eq!(header.kind, AbilityKind::VillainAction);
        assert_eq!(header.villain_action_ordinal, Some(2));
        assert_eq!(header.name, "Get in There! (Villain Action 2)");
        assert_eq!(header.malice_cost, Some(MaliceCost::Cost(3)));
    }

    #[test]
    fn test_header_ocr_dice_token() {
        let header = parse_ability_header("Arrow (Main Action) 2D1O + 2 Signature").unwrap();
        assert_eq!(header.power_roll_bonus, Some(2));
    }

    #[test]
    fn test_header_garbled_cost_fixup() {
        let header =
            parse_ability_header("Shadow Chains (Maneuver) 2d10 + 2 9 3 Malice").unwrap();
        assert_eq!(header.power_roll_bonus, Some(2));
        assert_eq!(header.malice_cost, Some(MaliceCost::Cost(3)));
    }

    #[test]
    fn test_header_unparseable() {
        assert!(parse_ability_header("12 damage; push 3").is_none());
    }

    // ------------------------------------------------------------------------
    // Body extraction
    // ------------------------------------------------------------------------

    #[test]
    fn test_full_attack_ability() {
        let mut sink = DiagnosticSink::new();
        let ability = parse_ability_block(
            &lines(&[
                "Spear Charge (Main Action) 2d10 + 3 Signature",
                "Keywords Charge, Melee, Strike, Weapon",
                "Distance Melee 1 Target 1 creature",
                "<11 3 damage",
                "12-16 5 damage",
                "17+ 7 damage; the target is slowed (save ends)",
                "Effect The warrior shifts 1 before the strike.",
            ]),
            &mut sink,
        )
        .unwrap();

        assert_eq!(ability.name, "Spear Charge");
        assert_eq!(ability.keywords, vec!["Charge", "Melee", "Strike", "Weapon"]);
        assert_eq!(ability.distance, Some(Distance::Melee(1)));
        let target = ability.target.unwrap();
        assert_eq!(target.count, Some(TargetCount::Count(1)));

        let roll = ability.power_roll.unwrap();
        assert_eq!(roll.bonus, Some(3));
        assert_eq!(roll.tier1.damage, Some(3));
        assert_eq!(roll.tier2.damage, Some(5));
        assert_eq!(roll.tier3.damage, Some(7));
        assert!(roll.tier3.effect.is_some());

        // The Effect line follows the tiers, so it lands post-roll.
        assert!(ability.pre_power_roll_effect.is_none());
        assert!(ability.post_power_roll_effect.is_some());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_effect_before_roll_is_pre_effect() {
        let mut sink = DiagnosticSink::new();
        let ability = parse_ability_block(
            &lines(&[
                "Fire Breath (Main Action) 2d10 + 2",
                "Effect A cone of flame erupts.",
                "<11 2 fire damage",
                "12-16 4 fire damage",
                "17+ 6 fire damage",
            ]),
            &mut sink,
        )
        .unwrap();
        let pre = ability.pre_power_roll_effect.unwrap();
        assert!(pre.text.contains("cone of flame"));
        assert!(ability.post_power_roll_effect.is_none());
    }

    #[test]
    fn test_effect_continuation_lines_join() {
        let mut sink = DiagnosticSink::new();
        let ability = parse_ability_block(
            &lines(&[
                "Rally (Maneuver)",
                "Effect Each ally within 5 gains 2 temporary stamina",
                "and can stand up if prone.",
            ]),
            &mut sink,
        )
        .unwrap();
        let pre = ability.pre_power_roll_effect.unwrap();
        assert!(pre.text.ends_with("stand up if prone."));
    }

    #[test]
    fn test_malice_gated_effect() {
        let mut sink = DiagnosticSink::new();
        let ability = parse_ability_block(
            &lines(&[
                "Shadow Bolt (Main Action) 2d10 + 2",
                "<11 2 damage",
                "12-16 4 damage",
                "17+ 6 damage",
                "2 Malice The target is also weakened (save ends).",
            ]),
            &mut sink,
        )
        .unwrap();
        let malice = ability.malice_effect.unwrap();
        assert_eq!(malice.cost, 2);
        assert!(malice.effect.text.contains("weakened"));
        assert!(ability.power_roll.is_some());
    }

    #[test]
    fn test_trigger_with_continuation() {
        let mut sink = DiagnosticSink::new();
        let ability = parse_ability_block(
            &lines(&[
                "Lash Back (Triggered Action)",
                "Trigger An enemy within distance deals damage",
                "to the bugbear.",
                "Effect The bugbear makes a free strike.",
            ]),
            &mut sink,
        )
        .unwrap();
        let trigger = ability.trigger.unwrap();
        assert!(trigger.ends_with("to the bugbear."));
        assert!(ability.pre_power_roll_effect.is_some());
    }

    #[test]
    fn test_tier_continuation_joins_wrapped_line() {
        let mut sink = DiagnosticSink::new();
        let ability = parse_ability_block(
            &lines(&[
                "Crushing Slam (Main Action) 2d10 + 2",
                "<11 3 damage",
                "12-16 5 damage; M<2 prone",
                "(save ends)",
                "17+ 7 damage",
            ]),
            &mut sink,
        )
        .unwrap();
        let roll = ability.power_roll.unwrap();
        let potency = roll.tier2.potency_effect.unwrap();
        assert!(potency.effect.text.contains("prone"));
        assert!(potency.effect.duration.is_some());
    }

    #[test]
    fn test_incomplete_tiers_fatal_for_attack() {
        let mut sink = DiagnosticSink::new();
        let err = parse_ability_block(
            &lines(&[
                "Bite (Main Action) 2d10 + 1",
                "<11 2 damage",
                "12-16 4 damage",
            ]),
            &mut sink,
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::IncompleteTierSet { found: 2, .. }));
    }

    #[test]
    fn test_bonus_without_tiers_is_recoverable() {
        let mut sink = DiagnosticSink::new();
        let ability = parse_ability_block(
            &lines(&["Bite (Main Action) 2d10 + 1", "Effect Just a nibble."]),
            &mut sink,
        )
        .unwrap();
        assert!(ability.power_roll.is_none());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_trait_block_accumulates_effect() {
        let mut sink = DiagnosticSink::new();
        let ability = parse_ability_block(
            &lines(&[
                "Crafty",
                "The goblin doesn't provoke opportunity attacks by moving.",
            ]),
            &mut sink,
        )
        .unwrap();
        assert_eq!(ability.kind, AbilityKind::MonsterTrait);
        assert_eq!(ability.name, "Crafty");
        assert!(ability
            .pre_power_roll_effect
            .unwrap()
            .text
            .contains("opportunity attacks"));
        assert!(ability.malice_cost.is_none());
    }

    #[test]
    fn test_unparsed_header_yields_placeholder() {
        let mut sink = DiagnosticSink::new();
        let ability =
            parse_ability_block(&lines(&["complete garbage line", "Effect text"]), &mut sink)
                .unwrap();
        assert_eq!(ability.name, "UNKNOWN");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_mislabeled_difficult_terrain_distance() {
        let mut sink = DiagnosticSink::new();
        let ability = parse_ability_block(
            &lines(&[
                "Tremor (Main Action) 2d10 + 2",
                "<11 2 damage",
                "12-16 4 damage",
                "17+ 6 damage",
                "Distance The affected area is considered difficult terrain for the rest of the encounter.",
            ]),
            &mut sink,
        )
        .unwrap();
        assert!(ability.distance.is_none());
        assert!(ability
            .post_power_roll_effect
            .unwrap()
            .text
            .contains("difficult terrain"));
    }

    #[test]
    fn test_mislabeled_mastermind_trigger() {
        let mut sink = DiagnosticSink::new();
        let ability = parse_ability_block(
            &lines(&[
                "Overwatch (Triggered Action)",
                "Distance The target uses a strike that targets the mastermind's ally",
                "within 10 squares.",
            ]),
            &mut sink,
        )
        .unwrap();
        assert!(ability.distance.is_none());
        let trigger = ability.trigger.unwrap();
        assert!(trigger.starts_with("The target uses a strike"));
        assert!(trigger.ends_with("within 10 squares."));
    }
}
