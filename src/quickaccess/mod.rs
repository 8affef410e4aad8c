//! Directory scan and quick-access index generation.
//!
//! # Error Handling Strategy
//!
//! Per-file extraction failures are warnings: the file contributes zero
//! entities and the scan keeps going, so one corrupted download cannot
//! block the whole index. Only a missing directory or a scan that finds no
//! entities at all fail the operation.

pub mod markdown;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use walkdir::WalkDir;

use crate::extract::{self, ExtractError, flashcards};
use crate::workbook::storage;

/// Default output file name inside the scanned directory
pub const DEFAULT_OUTPUT_NAME: &str = "QUICK_ACCESS.md";

/// Aggregated scan results
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Entity -> source file names (first-seen order, one mention per file)
    pub entities: BTreeMap<String, Vec<String>>,
    pub files_scanned: usize,
    pub failures: Vec<ExtractError>,
}

/// What a quick-access run produced
#[derive(Debug, Clone)]
pub struct QuickAccessReport {
    pub output_path: PathBuf,
    pub total_entities: usize,
    pub files_scanned: usize,
    pub failures: usize,
}

/// Scan the top level of `dir` for study-guide files and aggregate their
/// entities. Files are visited in sorted name order within each format
/// group (spreadsheets, Word documents, flashcard CSVs) so output is
/// deterministic.
pub fn scan_study_guides(dir: &Path) -> Result<ScanOutcome> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let mut spreadsheets = Vec::new();
    let mut documents = Vec::new();
    let mut flashcard_files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.context("Failed to read directory entry")?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.into_path();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "xlsx" => spreadsheets.push(path),
            // Only JSON that parses as a chart workbook counts; other JSON
            // in the folder (caches, settings) is not a study guide
            "json" if storage::load_workbook(&path).is_ok() => spreadsheets.push(path),
            "docx" => documents.push(path),
            "csv" if flashcards::is_flashcard_export(&path) => flashcard_files.push(path),
            _ => {}
        }
    }

    let mut outcome = ScanOutcome::default();
    for path in spreadsheets.iter().chain(&documents).chain(&flashcard_files) {
        outcome.files_scanned += 1;
        let file_name =
            path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        match extract::extract_entities(path) {
            Ok(entities) => {
                for entity in entities {
                    let files = outcome.entities.entry(entity).or_default();
                    if !files.contains(&file_name) {
                        files.push(file_name.clone());
                    }
                }
            }
            Err(error) => {
                eprintln!("Warning: {}", error);
                outcome.failures.push(error);
            }
        }
    }

    Ok(outcome)
}

/// Generate the quick-access index for `dir`, writing Markdown to `output`
/// (default: [`DEFAULT_OUTPUT_NAME`] inside `dir`).
///
/// # Errors
///
/// Fails when `dir` is not a directory, when no entities were found
/// anywhere, or when the output cannot be written.
pub fn generate_quick_access(dir: &Path, output: Option<&Path>) -> Result<QuickAccessReport> {
    let outcome = scan_study_guides(dir)?;
    if outcome.entities.is_empty() {
        anyhow::bail!(
            "No entities found in {} ({} files scanned, {} failed)",
            dir.display(),
            outcome.files_scanned,
            outcome.failures.len()
        );
    }

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => dir.join(DEFAULT_OUTPUT_NAME),
    };
    let rendered = markdown::render(&outcome.entities, Local::now());
    fs::write(&output_path, rendered)
        .with_context(|| format!("Failed to write index: {}", output_path.display()))?;

    Ok(QuickAccessReport {
        output_path,
        total_entities: outcome.entities.len(),
        files_scanned: outcome.files_scanned,
        failures: outcome.failures.len(),
    })
}
