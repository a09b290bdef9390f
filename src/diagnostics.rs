//! Structured diagnostics for the extraction pipeline.
//!
//! Every non-fatal ambiguity (unmatched header candidate, unknown keyword,
//! orphaned content) is recorded as a [`Diagnostic`] tagged with the owning
//! monster and pipeline stage, so a batch can complete while leaving an
//! auditable trail for manual review. Fatal per-block errors become
//! [`BlockFailure`] records; both are gathered into the [`RunReport`].

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::model::Monster;

// ============================================================================
// Types
// ============================================================================

/// Pipeline stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Monster header detection and block slicing
    Segmentation,
    /// Scalar/structured stat field extraction
    Metadata,
    /// Ability header detection and block slicing
    Abilities,
    /// Power roll tier classification
    PowerRoll,
    /// Export model construction
    Export,
}

impl Stage {
    /// Short name used in rendered summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Segmentation => "segmentation",
            Self::Metadata => "metadata",
            Self::Abilities => "abilities",
            Self::PowerRoll => "power_roll",
            Self::Export => "export",
        }
    }
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Recoverable; the element was skipped or defaulted
    Warning,
    /// The owning block was aborted
    Error,
}

/// One recorded ambiguity or failure, with enough context for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stage that raised the diagnostic
    pub stage: Stage,
    /// Severity of the finding
    pub severity: Severity,
    /// Owning monster name, when one is known
    pub monster: Option<String>,
    /// Human-readable description
    pub message: String,
    /// The offending raw line, when one exists
    pub line: Option<String>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let owner = self.monster.as_deref().unwrap_or("-");
        match &self.line {
            Some(line) => write!(
                f,
                "[{}] [{}] {}: '{}'",
                self.stage.as_str(),
                owner,
                self.message,
                line
            ),
            None => write!(f, "[{}] [{}] {}", self.stage.as_str(), owner, self.message),
        }
    }
}

/// A monster block that could not be extracted.
#[derive(Debug, Clone)]
pub struct BlockFailure {
    /// Name from the block's header
    pub monster: String,
    /// The raw header line, for locating the block in the source
    pub header_line: String,
    /// What made the block unextractable
    pub error: ExtractError,
}

// ============================================================================
// Collector
// ============================================================================

/// Per-block diagnostics collector.
///
/// Each worker builds its own sink, so parallel block extraction needs no
/// synchronization; sinks are merged in block order afterward.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    monster: Option<String>,
    entries: Vec<Diagnostic>,
}

impl DiagnosticSink {
    /// A sink not yet attached to a monster (segmentation stage).
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose entries are tagged with the given monster name.
    pub fn for_monster(name: impl Into<String>) -> Self {
        Self {
            monster: Some(name.into()),
            entries: Vec::new(),
        }
    }

    /// Record a recoverable finding.
    pub fn warn(&mut self, stage: Stage, message: impl Into<String>, line: Option<&str>) {
        self.push(stage, Severity::Warning, message, line);
    }

    /// Record a fatal finding (the caller is about to abort the block).
    pub fn error(&mut self, stage: Stage, message: impl Into<String>, line: Option<&str>) {
        self.push(stage, Severity::Error, message, line);
    }

    fn push(&mut self, stage: Stage, severity: Severity, message: impl Into<String>, line: Option<&str>) {
        self.entries.push(Diagnostic {
            stage,
            severity,
            monster: self.monster.clone(),
            message: message.into(),
            line: line.map(str::to_string),
        });
    }

    /// Number of entries collected so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the sink, yielding its entries.
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

// ============================================================================
// Run report
// ============================================================================

/// The complete outcome of one extraction run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Successfully extracted monsters, in document order
    pub monsters: Vec<Monster>,
    /// Blocks that failed extraction
    pub failures: Vec<BlockFailure>,
    /// All diagnostics, in block order
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    /// Count of recoverable findings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Render the per-run summary expected at the end of a batch.
    pub fn summary(&self) -> String {
        format!(
            "{} monsters extracted, {} blocks failed, {} warnings",
            self.monsters.len(),
            self.failures.len(),
            self.warning_count()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_tags_monster() {
        let mut sink = DiagnosticSink::for_monster("Goblin Warrior");
        sink.warn(Stage::Metadata, "unknown keyword", Some("Sneaky EV 6"));

        let entries = sink.into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].monster.as_deref(), Some("Goblin Warrior"));
        assert_eq!(entries[0].severity, Severity::Warning);
    }

    #[test]
    fn test_sink_without_monster() {
        let mut sink = DiagnosticSink::new();
        sink.warn(Stage::Segmentation, "header candidate rejected", None);

        let entries = sink.into_entries();
        assert!(entries[0].monster.is_none());
    }

    #[test]
    fn test_diagnostic_display_includes_context() {
        let diag = Diagnostic {
            stage: Stage::PowerRoll,
            severity: Severity::Warning,
            monster: Some("Werewolf".to_string()),
            message: "unmatched tier line".to_string(),
            line: Some("1 or lower garbage".to_string()),
        };
        let rendered = diag.to_string();
        assert!(rendered.contains("power_roll"));
        assert!(rendered.contains("Werewolf"));
        assert!(rendered.contains("garbage"));
    }

    #[test]
    fn test_report_summary_counts() {
        let mut report = RunReport::default();
        report.diagnostics.push(Diagnostic {
            stage: Stage::Metadata,
            severity: Severity::Warning,
            monster: None,
            message: "m".to_string(),
            line: None,
        });
        assert_eq!(report.warning_count(), 1);
        assert!(report.summary().contains("0 monsters"));
        assert!(report.summary().contains("1 warnings"));
    }
}
