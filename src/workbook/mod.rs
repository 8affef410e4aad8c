//! Typed workbook model with versioned JSON persistence and `.xlsx` interop
//!
//! The reference workbook lives on disk as schema-versioned JSON (the
//! native format for full-fidelity sheet copies). Real spreadsheets cross
//! the boundary through `xlsx`: reading captures values, writing renders
//! the full model (styles, widths, merges, frozen panes).

pub mod model;
pub mod storage;
pub mod xlsx;

use std::path::Path;

use anyhow::Result;

pub use model::{Cell, CellRange, CellRef, CellStyle, CellValue, Sheet, Workbook};

/// Open a chart file as a workbook model, dispatching on extension:
/// native JSON loads with full fidelity, anything else is read as `.xlsx`
/// values.
pub fn open_chart(path: &Path) -> Result<Workbook> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json { storage::load_workbook(path) } else { xlsx::read_xlsx(path) }
}
