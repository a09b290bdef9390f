//! Ability and trait header detection within a monster block.
//!
//! An ability header is a name followed by a parenthesized action type;
//! a trait header is a bare name from the closed trait vocabulary. Headers
//! can start mid-line when the OCR merged columns, in which case the line
//! is split at the match and the orphaned prefix reported.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{DiagnosticSink, Stage};
use crate::vocabulary::is_trait_name;

/// Action-type header shapes, searched anywhere in a line.
static ABILITY_HEADER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(.+?)\s*\((?:Free\s*)?(?:Main\s*)?Action\).*",
        r"(?i)\b(.+?)\s*\((?:Free\s*)?Maneuver\).*",
        r"(?i)\b(.+?)\s*\((?:Free\s*)?Triggered Action\).*",
        r"(?i)\b(.+?)\s*\(Villain Action\s*\d+\).*",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Where an ability header starts within a line, if one does.
fn find_header_start(line: &str) -> Option<usize> {
    ABILITY_HEADER_PATTERNS
        .iter()
        .filter_map(|pattern| pattern.find(line).map(|m| m.start()))
        .min()
}

/// Split the lines following the stat region into ability blocks.
///
/// Each block starts at a header line and accumulates every following
/// non-header line. Separate headers never merge. Content before the first
/// header has no block to belong to and is reported and dropped, as is any
/// orphaned prefix when a header starts mid-line.
pub fn split_ability_blocks(lines: &[String], sink: &mut DiagnosticSink) -> Vec<Vec<String>> {
    let mut blocks: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(start) = find_header_start(line) {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            if start > 0 {
                let before = line[..start].trim();
                if !before.is_empty() {
                    sink.warn(
                        Stage::Abilities,
                        "orphaned content before mid-line ability header",
                        Some(before),
                    );
                }
                current.push(line[start..].trim().to_string());
            } else {
                current.push(line.to_string());
            }
        } else if is_trait_name(line) {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            current.push(line.to_string());
        } else if !current.is_empty() {
            current.push(line.to_string());
        } else {
            sink.warn(
                Stage::Abilities,
                "orphaned non-header line before first ability",
                Some(line),
            );
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

// ============================================================================
// Tests
// ============================================================================
