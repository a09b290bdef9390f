//! The extraction pipeline: sanitize, segment, and extract in parallel.
//!
//! Block extraction is a pure function of the block's lines plus the static
//! pattern tables, so blocks are processed through a parallel map with no
//! shared state; each worker returns its result together with its locally
//! collected diagnostics, merged in block order to keep output
//! deterministic.

use rayon::prelude::*;

use crate::diagnostics::{BlockFailure, Diagnostic, DiagnosticSink, RunReport, Stage};
use crate::error::Result;
use crate::extract::{ability, metadata};
use crate::model::{Monster, MonsterBlock, Organization};
use crate::normalize::sanitize_line;
use crate::segment;

/// Run the full pipeline over a document.
///
/// The batch always completes: a malformed stat block becomes a failure
/// record in the report, never a run abort.
pub fn extract_document(text: &str) -> RunReport {
    let lines: Vec<String> = text.lines().map(sanitize_line).collect();

    let mut segmentation_sink = DiagnosticSink::new();
    let headers = segment::find_monster_headers(&lines, &mut segmentation_sink);
    let blocks = segment::group_monster_blocks(&lines, &headers);

    let outcomes: Vec<(Option<Monster>, Option<BlockFailure>, Vec<Diagnostic>)> = blocks
        .par_iter()
        .map(|block| {
            let mut sink = DiagnosticSink::for_monster(&block.header.name);
            match extract_monster(block, &mut sink) {
                Ok(monster) => (Some(monster), None, sink.into_entries()),
                Err(error) => {
                    let failure = BlockFailure {
                        monster: block.header.name.clone(),
                        header_line: block.header.source_line.clone(),
                        error,
                    };
                    (None, Some(failure), sink.into_entries())
                }
            }
        })
        .collect();

    let mut report = RunReport {
        diagnostics: segmentation_sink.into_entries(),
        ..RunReport::default()
    };
    for (monster, failure, diagnostics) in outcomes {
        report.monsters.extend(monster);
        report.failures.extend(failure);
        report.diagnostics.extend(diagnostics);
    }
    report
}

/// Extract one monster from its block.
pub fn extract_monster(block: &MonsterBlock, sink: &mut DiagnosticSink) -> Result<Monster> {
    let lines = &block.lines;
    let header = &block.header;

    let (characteristics, characteristics_index) = metadata::find_characteristics(lines)?;
    let (keywords, encounter_value) = metadata::parse_keywords_and_ev(lines, sink)?;
    let stamina = metadata::parse_stamina(lines)?;
    let (speed, movement_types) = metadata::parse_speed(lines)?;
    let (size, stability) = metadata::parse_size_and_stability(lines)?;
    let free_strike_damage = metadata::parse_free_strike(lines)?;

    let (weakness, immunity) =
        metadata::parse_immunity_and_weakness(lines, characteristics_index, sink);

    let with_captain = if header.organization == Organization::Minion {
        Some(metadata::parse_with_captain(lines, characteristics_index)?)
    } else {
        None
    };

    let mut abilities = Vec::new();
    let ability_lines = &lines[(characteristics_index + 1).min(lines.len())..];
    for ability_block in segment::split_ability_blocks(ability_lines, sink) {
        if ability_block.is_empty() {
            sink.warn(Stage::Abilities, "empty ability block skipped", None);
            continue;
        }
        abilities.push(ability::parse_ability_block(&ability_block, sink)?);
    }

    Ok(Monster {
        name: header.name.clone(),
        level: header.level,
        organization: header.organization,
        role: header.role,
        header_text: header.source_line.clone(),
        keywords,
        encounter_value,
        stamina,
        speed,
        movement_types,
        size,
        stability,
        free_strike_damage,
        characteristics,
        weakness,
        immunity,
        with_captain,
        abilities,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CaptainBonus;

    const GOBLIN: &str = "\
Goblin Warrior LEVEL 1 Minion Skirmisher
Humanoid, Goblin EV 6
Stamina 7 Speed 6
Size 1S / Stability 0
Free Strike 2
With Captain speed +2
Might -1 Agility +2 Reason +0 Intuition +0 Presence -1
Spear Charge (Main Action) 2d10 + 2 Signature
Keywords Charge, Melee, Strike, Weapon
Distance Melee 1 Target 1 creature
<11 2 damage
12-16 4 damage
17+ 5 damage
Crafty
The goblin doesn't provoke opportunity attacks by moving.
";

    #[test]
    fn test_goblin_extracts_completely() {
        let report = extract_document(GOBLIN);
        assert_eq!(report.monsters.len(), 1);
        assert!(report.failures.is_empty());

        let goblin = &report.monsters[0];
        assert_eq!(goblin.name, "Goblin Warrior");
        assert_eq!(goblin.level, 1);
        assert_eq!(goblin.encounter_value, 6);
        assert_eq!(goblin.stamina, 7);
        assert_eq!(goblin.speed, 6);
        assert_eq!(goblin.size, "1S");
        assert_eq!(goblin.free_strike_damage, 2);
        assert_eq!(goblin.with_captain, Some(CaptainBonus::Speed(2)));
        assert_eq!(goblin.abilities.len(), 2);
        assert_eq!(goblin.abilities[0].name, "Spear Charge");
        assert_eq!(goblin.abilities[1].name, "Crafty");
    }

    #[test]
    fn test_missing_stamina_fails_block_only() {
        let text = GOBLIN.replace("Stamina 7 Speed 6", "Speed 6");
        let report = extract_document(&text);
        assert!(report.monsters.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].error,
            crate::error::ExtractError::MissingStamina
        );
    }

    #[test]
    fn test_determinism_across_runs() {
        let a = extract_document(GOBLIN);
        let b = extract_document(GOBLIN);
        assert_eq!(a.monsters, b.monsters);
        assert_eq!(a.diagnostics, b.diagnostics);
    }
}
