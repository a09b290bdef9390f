//! Text normalization and OCR repair.
//!
//! Pure functions over single lines: Unicode canonicalization, quote and
//! whitespace cleanup, and table-driven literal fixups for recurring OCR
//! garbles. Normalization never fails; at worst a line passes through
//! unchanged.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// Fixup tables
// ============================================================================

/// Known OCR garbles of whole names, applied after leading-junk stripping.
const NAME_FIXUPS: &[(&str, &str)] = &[
    ("MOoHLER", "MOHLER"),
    ("Lacsi", "LAESI"),
    ("BopporrF BUCKFEATHER", "BODDORFF BUCKFEATHER"),
    ("iImit Putty", "IMIT PUTTY"),
    ("Memoriat Ivy", "MEMORIAL IVY"),
    ("MVURKOR", "VURKOR"),
    ("WorRG", "WORG"),
];

/// Known OCR garbles occurring inside names.
const NAME_SUBSTRING_FIXUPS: &[(&str, &str)] = &[
    ("GoBun", "Goblin"),
    ("GoBLIN", "Goblin"),
    ("GOBUN", "GOBLIN"),
];

/// Words left lowercase by title casing unless they lead.
const MINOR_WORDS: &[&str] = &["of", "the", "in", "on", "for", "and", "or", "to", "a"];

// ============================================================================
// Patterns
// ============================================================================

static CURLY_QUOTES: Lazy<Regex> = Lazy::new(|| Regex::new("[\u{2018}\u{2019}\u{201C}\u{201D}\u{00B4}`]").unwrap());

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Characters outside the known document alphabet, removed on file load.
static FOREIGN_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^A-Za-z0-9/'"\[\]()<!?.,; +-]"#).unwrap());

static LEADING_JUNK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^A-Za-z0-9]+").unwrap());

// ============================================================================
// Line normalization
// ============================================================================

/// Pre-sanitize a raw input line: smart quotes to ASCII, foreign characters
/// to spaces, whitespace collapsed. Applied once at document load.
pub fn sanitize_line(raw: &str) -> String {
    let quoted = raw
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"");
    let ascii = FOREIGN_CHARS.replace_all(&quoted, " ");
    WHITESPACE_RUN.replace_all(&ascii, " ").trim().to_string()
}

/// Canonicalize a line: NFKC compatibility fold, curly quotes to ASCII
/// apostrophes, whitespace collapsed and trimmed.
pub fn normalize_line(raw: &str) -> String {
    let folded: String = raw.nfkc().collect();
    let quoted = CURLY_QUOTES.replace_all(&folded, "'");
    WHITESPACE_RUN.replace_all(&quoted, " ").trim().to_string()
}

// ============================================================================
// Names
// ============================================================================

/// Strip leading junk from a name and apply the whole-name fixup table.
pub fn sanitize_name(raw: &str) -> String {
    let stripped = LEADING_JUNK.replace(raw, "");
    let stripped = stripped.trim();
    for (bad, good) in NAME_FIXUPS {
        if stripped == *bad {
            return (*good).to_string();
        }
    }
    stripped.to_string()
}

/// Repair known OCR garbles inside a name.
pub fn fix_ocr_name(name: &str) -> String {
    for (bad, good) in NAME_SUBSTRING_FIXUPS {
        if name.contains(bad) {
            return name.replace(bad, good);
        }
    }
    name.to_string()
}

/// Title-case a name, leaving minor words lowercase except in first position.
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i == 0 || !MINOR_WORDS.contains(&lower.as_str()) {
                capitalize(&lower)
            } else {
                lower
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Read an integer out of OCR text, repairing O/0 confusion.
pub fn ocr_int(value: &str) -> Option<i64> {
    static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+").unwrap());
    let repaired = value.replace(['O', 'o'], "0");
    DIGITS.find(&repaired)?.as_str().parse().ok()
}

// ============================================================================
// Tests
// ============================================================================
