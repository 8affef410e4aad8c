//! Per-format entity extraction for study-guide files.
//!
//! # Error Handling Strategy
//!
//! Extraction failures are a closed set of typed errors instead of being
//! swallowed: callers can tell an unreadable file from a file with no
//! recognizable entity column and from a file with nothing to scan. The
//! directory scanner reports each kind as a warning and keeps going;
//! nothing in this module aborts a whole scan.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub mod flashcards;
pub mod sheet;
pub mod word;

/// Why a study-guide file produced no entities
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The file could not be opened or parsed at all
    #[error("cannot read {path}: {reason}")]
    UnreadableFile { path: String, reason: String },
    /// The file has content but no recognizable entity column
    #[error("no entity column found in {path}")]
    MissingColumn { path: String },
    /// The file has nothing to scan
    #[error("no content to scan in {path}")]
    EmptySheet { path: String },
}

impl ExtractError {
    pub(crate) fn unreadable(path: &Path, reason: impl ToString) -> Self {
        Self::UnreadableFile { path: display_name(path), reason: reason.to_string() }
    }

    pub(crate) fn missing_column(path: &Path) -> Self {
        Self::MissingColumn { path: display_name(path) }
    }

    pub(crate) fn empty_sheet(path: &Path) -> Self {
        Self::EmptySheet { path: display_name(path) }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

static BRAND_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]+\)\s*$").expect("brand suffix pattern"));

/// Strip a trailing parenthesized brand name: `Aspirin (Bayer)` -> `Aspirin`
pub fn strip_brand_suffix(name: &str) -> String {
    BRAND_SUFFIX.replace(name, "").trim().to_string()
}

/// Extract entity names from one study-guide file, dispatching on extension
pub fn extract_entities(path: &Path) -> Result<Vec<String>, ExtractError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "xlsx" | "json" => sheet::extract_from_chart_file(path),
        "docx" => word::extract_from_docx(path),
        "csv" => flashcards::extract_from_csv(path),
        _ => Err(ExtractError::unreadable(path, "unsupported file type")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_brand_suffix() {
        assert_eq!(strip_brand_suffix("Aspirin (Bayer)"), "Aspirin");
        assert_eq!(strip_brand_suffix("Metoprolol (Lopressor) "), "Metoprolol");
        assert_eq!(strip_brand_suffix("Warfarin"), "Warfarin");
        // Only a trailing parenthetical is a brand
        assert_eq!(strip_brand_suffix("Vitamin (B12) complex"), "Vitamin (B12) complex");
    }

    #[test]
    fn test_unsupported_extension_is_unreadable() {
        let error = extract_entities(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(error, ExtractError::UnreadableFile { .. }));
        assert!(error.to_string().contains("notes.txt"));
    }
}
