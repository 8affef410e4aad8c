//! Typed in-memory workbook model shared by the consolidator and extractors.
//!
//! Sheets are plain value types: copying a sheet between workbooks is a
//! `clone()`, which is what makes consolidation idempotent. Coordinates are
//! 1-based to match spreadsheet conventions; `rows[0]` is spreadsheet row 1.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Workbook schema version, checked on load to reject incompatible files
pub const WORKBOOK_VERSION: u32 = 1;

/// A workbook: an ordered list of named sheets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workbook {
    pub version: u32,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self { version: WORKBOOK_VERSION, sheets: Vec::new() }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Remove a sheet by name, preserving the order of the others
    pub fn remove_sheet(&mut self, name: &str) -> Option<Sheet> {
        let index = self.sheets.iter().position(|s| s.name == name)?;
        Some(self.sheets.remove(index))
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

/// A single worksheet: cell grid plus the layout state the charts rely on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    /// Cell grid; `rows[0]` is spreadsheet row 1
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
    /// Column widths keyed by 1-based column number
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub column_widths: BTreeMap<u32, f64>,
    /// Row heights keyed by 1-based row number
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub row_heights: BTreeMap<u32, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merges: Vec<CellRange>,
    /// First unfrozen cell; row 2 / col 1 keeps the header row visible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freeze_panes: Option<CellRef>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            column_widths: BTreeMap::new(),
            row_heights: BTreeMap::new(),
            merges: Vec::new(),
            freeze_panes: None,
        }
    }

    /// Highest populated row number (0 for an empty sheet)
    pub fn max_row(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Highest populated column number across all rows
    pub fn max_col(&self) -> u32 {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        if row == 0 || col == 0 {
            return None;
        }
        self.rows.get(row as usize - 1).and_then(|r| r.get(col as usize - 1))
    }

    /// Mutable access to a cell, growing the grid as needed
    pub fn cell_mut(&mut self, row: u32, col: u32) -> &mut Cell {
        debug_assert!(row > 0 && col > 0, "cell coordinates are 1-based");
        let row_index = row.saturating_sub(1) as usize;
        let col_index = col.saturating_sub(1) as usize;
        if self.rows.len() <= row_index {
            self.rows.resize_with(row_index + 1, Vec::new);
        }
        let row_cells = &mut self.rows[row_index];
        if row_cells.len() <= col_index {
            row_cells.resize_with(col_index + 1, Cell::default);
        }
        &mut row_cells[col_index]
    }

    pub fn set_value(&mut self, row: u32, col: u32, value: CellValue) {
        self.cell_mut(row, col).value = value;
    }

    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        *self.cell_mut(row, col) = cell;
    }

    /// Text form of a cell's value; None for empty or out-of-range cells
    pub fn text(&self, row: u32, col: u32) -> Option<String> {
        self.cell(row, col).and_then(|c| c.value.as_text())
    }
}

/// One grid cell: a value plus optional styling
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default, skip_serializing_if = "CellValue::is_empty")]
    pub value: CellValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

/// Cell contents; untagged so the JSON stays readable (`"x"`, `1.5`, `true`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text form of a non-empty value. Whole numbers print without a
    /// trailing `.0` so numeric cells match their spreadsheet display.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
        }
    }
}

/// Visual styling for one cell; every facet optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Borders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection: Option<Protection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Font {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    /// `RRGGBB` hex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Solid background fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// `RRGGBB` hex
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Borders {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<BorderEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<BorderEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<BorderEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<BorderEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderEdge {
    pub style: BorderStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    Thin,
    Medium,
    Thick,
    Double,
    Dashed,
    Dotted,
    Hair,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<HorizontalAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<VerticalAlign>,
    #[serde(default)]
    pub wrap_text: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

/// Sheet-protection flags; carried through JSON, not rendered to `.xlsx`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protection {
    #[serde(default = "default_locked")]
    pub locked: bool,
    #[serde(default)]
    pub hidden: bool,
}

impl Default for Protection {
    fn default() -> Self {
        Self { locked: true, hidden: false }
    }
}

fn default_locked() -> bool {
    true
}

/// Inclusive 1-based cell range, used for merged cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl CellRange {
    pub fn new(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self { start_row, start_col, end_row, end_col }
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }
}

/// A single 1-based cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}
