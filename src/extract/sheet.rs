//! Entity extraction from spreadsheet-shaped study guides.
//!
//! Two layouts exist. Master charts are trusted: row 1 is the header and
//! column B is the entity column. Arbitrary guides are probed: the first
//! few rows and columns are scanned for a header cell containing "drug"
//! and that column is harvested below the header.

use std::path::Path;

use crate::workbook;
use crate::workbook::model::{Sheet, Workbook};

use super::{ExtractError, strip_brand_suffix};

/// Sheets that never hold chart rows
pub const SKIP_SHEETS: [&str; 3] = ["Index", "High-Yield & Pearls", "Summary"];

const HEADER_SCAN_ROWS: u32 = 3;
const HEADER_SCAN_COLS: u32 = 10;

/// Entity names from a chart sheet: column B from row 2 down, trimmed,
/// empties skipped. The consolidator uses this directly because chart
/// layout is part of the chart contract.
pub fn chart_entities(sheet: &Sheet) -> Vec<String> {
    let mut entities = Vec::new();
    for row in 2..=sheet.max_row() {
        if let Some(text) = sheet.text(row, 2) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                entities.push(trimmed.to_string());
            }
        }
    }
    entities
}

/// Probe for the entity column: scan the first three rows and ten columns
/// for a header cell containing "drug"; returns `(header_row, column)`.
pub fn find_entity_column(sheet: &Sheet) -> Option<(u32, u32)> {
    let scan_rows = sheet.max_row().min(HEADER_SCAN_ROWS);
    let scan_cols = sheet.max_col().min(HEADER_SCAN_COLS);
    for row in 1..=scan_rows {
        for col in 1..=scan_cols {
            if let Some(text) = sheet.text(row, col) {
                if text.to_lowercase().contains("drug") {
                    return Some((row, col));
                }
            }
        }
    }
    None
}

/// Harvest entities below a located header, brand-stripped; single-character
/// values are noise and dropped
fn column_entities(sheet: &Sheet, header_row: u32, col: u32) -> Vec<String> {
    let mut entities = Vec::new();
    for row in (header_row + 1)..=sheet.max_row() {
        if let Some(text) = sheet.text(row, col) {
            let name = strip_brand_suffix(text.trim());
            if name.chars().count() > 1 {
                entities.push(name);
            }
        }
    }
    entities
}

/// Extract from a chart file on disk (`.xlsx` values or native JSON)
pub fn extract_from_chart_file(path: &Path) -> Result<Vec<String>, ExtractError> {
    let loaded = workbook::open_chart(path)
        .map_err(|error| ExtractError::unreadable(path, format!("{error:#}")))?;
    extract_from_workbook(path, &loaded)
}

/// The shared heuristic over an in-memory workbook: skip non-chart sheets,
/// probe each remaining sheet for its entity column, harvest below it.
pub fn extract_from_workbook(
    path: &Path,
    loaded: &Workbook,
) -> Result<Vec<String>, ExtractError> {
    let mut entities = Vec::new();
    let mut scanned_rows = 0u32;
    let mut found_column = false;

    for sheet in &loaded.sheets {
        if SKIP_SHEETS.contains(&sheet.name.as_str()) {
            continue;
        }
        scanned_rows += sheet.max_row();
        if let Some((header_row, col)) = find_entity_column(sheet) {
            found_column = true;
            entities.extend(column_entities(sheet, header_row, col));
        }
    }

    if !found_column {
        if scanned_rows == 0 {
            return Err(ExtractError::empty_sheet(path));
        }
        return Err(ExtractError::missing_column(path));
    }
    Ok(entities)
}
