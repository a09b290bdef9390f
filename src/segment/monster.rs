//! Monster header detection and block slicing.
//!
//! A header line carries `NAME LEVEL <n> <organization> [<role>]`, but OCR
//! mangles the LEVEL token freely (LEVE1, LEVEI, Levet, ...). Detection is
//! two-staged: a cheap candidate filter over every line, then one anchored
//! pattern that either parses the candidate completely or rejects it as
//! noise.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{DiagnosticSink, Stage};
use crate::model::{MonsterBlock, MonsterHeader, Organization, Role};
use crate::normalize::{fix_ocr_name, normalize_line, ocr_int, sanitize_name, title_case};
use crate::vocabulary::{self, FOOTER, PAGE_LEFT_MARKER, PAGE_MARKER};

// ============================================================================
// Patterns
// ============================================================================

/// Loose LEVEL detector for candidate filtering; matches the common OCR
/// confusions of E/V/I/1/l.
static LEVEL_HINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)L[EV1I]{2,4}").unwrap());

static ANY_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").unwrap());

static MALICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)malice").unwrap());

/// The anchored header grammar. The name capture is as loose as possible up
/// to the LEVEL variant; the trailing class swallows stray `_`/`l` junk.
static HEADER: Lazy<Regex> = Lazy::new(|| {
    let level_variants = "LEVEL|LEVE1|LEVEI|LEVET|LEVELT|LEvEL|LeveL|Levet|Leve1|LeveI";
    let organizations = vocabulary::ORGANIZATIONS.join("|");
    let roles = vocabulary::ROLES.join("|");
    let pattern = format!(
        r"(?i)^\W*(?P<name>.+?)\W*(?:{level_variants})\W*(?P<level>\d+)\W*(?P<org>{organizations})(?:\W*(?P<role>{roles}))?\W*[_l]?\W*$"
    );
    Regex::new(&pattern).unwrap()
});

/// Maximum Levenshtein distance for a token to count as a mangled "LEVEL".
const LEVEL_EDIT_TOLERANCE: usize = 2;

// ============================================================================
// Candidate detection
// ============================================================================

fn has_level_token(line: &str) -> bool {
    if LEVEL_HINT.is_match(line) {
        return true;
    }
    line.split_whitespace().any(|token| {
        let upper: String = token
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_uppercase();
        (4..=6).contains(&upper.len())
            && strsim::levenshtein(&upper, "LEVEL") <= LEVEL_EDIT_TOLERANCE
    })
}

fn is_header_candidate(line: &str) -> bool {
    let upper = line.to_uppercase();
    has_level_token(line)
        && ANY_DIGIT.is_match(line)
        && vocabulary::ORGANIZATIONS
            .iter()
            .any(|org| upper.contains(&org.to_uppercase()))
        && !MALICE.is_match(line)
}

// ============================================================================
// Header parsing
// ============================================================================

/// Parse one candidate line against the anchored grammar. Returns `None`
/// when the candidate was noise after all.
fn parse_header_line(line: &str) -> Option<(String, u32, Organization, Option<Role>)> {
    let caps = HEADER.captures(line)?;

    let raw_name = caps.name("name")?.as_str().trim_matches([' ', '|', ':', '-']);
    let name = fix_ocr_name(raw_name);
    if name.is_empty() {
        return None;
    }

    let level = ocr_int(caps.name("level")?.as_str())?;
    if level <= 0 {
        return None;
    }

    let organization = Organization::from_token(caps.name("org")?.as_str())?;

    // Solo and Leader never carry a role; a role-like trailing token on
    // those headers is junk and must be discarded.
    let role = if organization.forbids_role() {
        None
    } else {
        caps.name("role").and_then(|m| Role::from_token(m.as_str()))
    };

    Some((name, level as u32, organization, role))
}

/// Detect every monster header in the document.
///
/// Candidates that fail the anchored grammar are dropped with a diagnostic;
/// they were noise, never an error.
pub fn find_monster_headers(lines: &[String], sink: &mut DiagnosticSink) -> Vec<MonsterHeader> {
    let mut headers = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        let normalized = normalize_line(line);
        if !is_header_candidate(&normalized) {
            continue;
        }
        match parse_header_line(&normalized) {
            Some((name, level, organization, role)) => headers.push(MonsterHeader {
                name: title_case(&sanitize_name(&name)),
                level,
                organization,
                role,
                source_line: normalized,
                start_line: index,
                end_line: index,
            }),
            None => sink.warn(
                Stage::Segmentation,
                "header candidate rejected by anchored pattern",
                Some(&normalized),
            ),
        }
    }
    headers
}

// ============================================================================
// Block slicing
// ============================================================================

/// Slice the document into per-monster blocks.
///
/// A block runs from the line after its header to the first of: the next
/// detected header, a left-page marker, or a noise-section heading. Footer
/// boilerplate and page/column markers are filtered out of the content but
/// never terminate a block.
pub fn group_monster_blocks(lines: &[String], headers: &[MonsterHeader]) -> Vec<MonsterBlock> {
    let header_lines: std::collections::HashSet<usize> =
        headers.iter().map(|h| h.start_line).collect();

    headers
        .iter()
        .map(|header| {
            let start = header.start_line + 1;
            let mut end = lines.len();
            for j in start..lines.len() {
                if header_lines.contains(&j)
                    || PAGE_LEFT_MARKER.is_match(&lines[j])
                    || vocabulary::is_noise_header(&lines[j])
                {
                    end = j;
                    break;
                }
            }

            let block_lines = lines[start..end]
                .iter()
                .filter(|line| !FOOTER.is_match(line) && !PAGE_MARKER.is_match(line))
                .cloned()
                .collect();

            MonsterBlock {
                header: header.clone(),
                lines: block_lines,
            }
        })
        .collect()
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
    fn test_plain_header_parses() {
        let mut sink = DiagnosticSink::new();
        let headers = find_monster_headers(
            &lines(&["Goblin Warrior LEVEL 1 Minion Skirmisher"]),
            &mut sink,
        );
        assert_eq!(headers.len(), 1);
        let h = &headers[0];
        assert_eq!(h.name, "Goblin Warrior");
        assert_eq!(h.level, 1);
        assert_eq!(h.organization, Organization::Minion);
        assert_eq!(h.role, Some(Role::Skirmisher));
    }

    #[test]
    fn test_solo_discards_role_token() {
        let mut sink = DiagnosticSink::new();
        let headers = find_monster_headers(
            &lines(&["Mystic Queen Bargnot LEVEL 9 Solo"]),
            &mut sink,
        );
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].organization, Organization::Solo);
        assert!(headers[0].role.is_none());
    }

    #[test]
    fn test_leader_discards_trailing_role() {
        let mut sink = DiagnosticSink::new();
        let headers = find_monster_headers(
            &lines(&["Bugbear Commander LEVEL 3 Leader Support"]),
            &mut sink,
        );
        assert_eq!(headers.len(), 1);
        assert!(headers[0].role.is_none());
    }

    #[test]
    fn test_ocr_mangled_level_token() {
        let mut sink = DiagnosticSink::new();
        let headers = find_monster_headers(&lines(&["WORG LEVE1 2 Horde Harrier"]), &mut sink);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].name, "Worg");
        assert_eq!(headers[0].level, 2);
    }

    #[test]
    fn test_malice_line_is_not_a_candidate() {
        let mut sink = DiagnosticSink::new();
        let headers = find_monster_headers(
            &lines(&["Lash Out (Villain Action 1) 3 Malice level solo"]),
            &mut sink,
        );
        assert!(headers.is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_prose_candidate_rejected_with_diagnostic() {
        let mut sink = DiagnosticSink::new();
        // Candidate filter passes (LEVEL-ish token, digit, organization
        // word), but the anchored grammar does not.
        let headers = find_monster_headers(
            &lines(&["the level 3 solo of this dungeon is level with the floor, truly"]),
            &mut sink,
        );
        // Either parse or rejection is acceptable for prose, but a
        // rejection must leave a diagnostic trail.
        if headers.is_empty() {
            assert!(!sink.is_empty());
        }
    }

    #[test]
    fn test_leading_junk_stripped_from_name() {
        let mut sink = DiagnosticSink::new();
        let headers = find_monster_headers(
            &lines(&["_| GOBUN SNIPER LEVEL 1 Minion Artillery"]),
            &mut sink,
        );
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].name, "Goblin Sniper");
    }

    #[test]
    fn test_blocks_end_at_next_header() {
        let doc = lines(&[
            "Goblin Warrior LEVEL 1 Minion Skirmisher",
            "Humanoid EV 6",
            "Stamina 7",
            "Goblin Sniper LEVEL 1 Minion Artillery",
            "Humanoid EV 6",
        ]);
        let mut sink = DiagnosticSink::new();
        let headers = find_monster_headers(&doc, &mut sink);
        let blocks = group_monster_blocks(&doc, &headers);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines, vec!["Humanoid EV 6", "Stamina 7"]);
        assert_eq!(blocks[1].lines, vec!["Humanoid EV 6"]);
    }

    #[test]
    fn test_blocks_end_at_left_page_marker() {
        let doc = lines(&[
            "Goblin Warrior LEVEL 1 Minion Skirmisher",
            "Humanoid EV 6",
            "--- Page 4 left ---",
            "unrelated prose",
        ]);
        let mut sink = DiagnosticSink::new();
        let headers = find_monster_headers(&doc, &mut sink);
        let blocks = group_monster_blocks(&doc, &headers);
        assert_eq!(blocks[0].lines, vec!["Humanoid EV 6"]);
    }

    #[test]
    fn test_right_marker_and_footer_filtered_not_terminating() {
        let doc = lines(&[
            "Goblin Warrior LEVEL 1 Minion Skirmisher",
            "Humanoid EV 6",
            "--- Page 4 right ---",
            "The Delian Tomb | MCDM Productions",
            "Stamina 7",
        ]);
        let mut sink = DiagnosticSink::new();
        let headers = find_monster_headers(&doc, &mut sink);
        let blocks = group_monster_blocks(&doc, &headers);
        assert_eq!(blocks[0].lines, vec!["Humanoid EV 6", "Stamina 7"]);
    }

    #[test]
    fn test_blocks_end_at_noise_header() {
        let doc = lines(&[
            "Goblin Warrior LEVEL 1 Minion Skirmisher",
            "Humanoid EV 6",
            "MALICE FEATURES",
            "Goblin Fury",
        ]);
        let mut sink = DiagnosticSink::new();
        let headers = find_monster_headers(&doc, &mut sink);
        let blocks = group_monster_blocks(&doc, &headers);
        assert_eq!(blocks[0].lines, vec!["Humanoid EV 6"]);
    }
}
