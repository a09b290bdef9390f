/// Bestiary Forge - OCR Stat-Block Extraction
///
/// Core library converting OCR-derived monster compendium text into
/// validated structured records for virtual-tabletop import.
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod segment;
pub mod vocabulary;

pub use diagnostics::{Diagnostic, RunReport, Severity, Stage};
pub use error::{ExtractError, Result};
pub use pipeline::extract_document;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
