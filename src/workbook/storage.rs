//! Workbook persistence: versioned JSON load/save with atomic writes

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::model::{WORKBOOK_VERSION, Workbook};

/// Load a workbook from its JSON file
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if its schema
/// version does not match [`WORKBOOK_VERSION`].
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read workbook file: {}", path.display()))?;
    let workbook: Workbook = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse workbook file: {}", path.display()))?;

    // Check version compatibility
    if workbook.version != WORKBOOK_VERSION {
        anyhow::bail!(
            "Workbook version mismatch in {} (expected {}, found {})",
            path.display(),
            WORKBOOK_VERSION,
            workbook.version
        );
    }

    Ok(workbook)
}

/// Load a workbook if the file exists, otherwise start a fresh empty one
pub fn load_or_default(path: &Path) -> Result<Workbook> {
    if path.exists() { load_workbook(path) } else { Ok(Workbook::new()) }
}

/// Save a workbook atomically (temp file + rename)
pub fn save_workbook(path: &Path, workbook: &Workbook) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(workbook).context("Failed to serialize workbook")?;
    let temp_path = temp_sibling(path);
    fs::write(&temp_path, json)
        .with_context(|| format!("Failed to write workbook temp file: {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename workbook temp file: {}", temp_path.display()))?;

    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
