//! Alphabetical index sheet construction.
//!
//! The layout mirrors the reference charts students already navigate: a
//! styled two-column header, a merged `═══ X ═══` divider whenever the
//! leading letter changes, and alternating row fills that restart at each
//! divider.

use std::collections::BTreeMap;

use crate::workbook::model::{
    Alignment, Cell, CellRange, CellRef, CellStyle, CellValue, Fill, Font, HorizontalAlign, Sheet,
    VerticalAlign,
};

/// Name of the generated index sheet
pub const INDEX_SHEET_NAME: &str = "Index";

const NAME_COLUMN_WIDTH: f64 = 40.0;
const LOCATION_COLUMN_WIDTH: f64 = 30.0;
const HEADER_ROW_HEIGHT: f64 = 30.0;
const LETTER_ROW_HEIGHT: f64 = 25.0;

const HEADER_FILL: &str = "4472C4";
const HEADER_FONT_COLOR: &str = "FFFFFF";
const LETTER_FILL: &str = "E3F2FD";
const LETTER_FONT_COLOR: &str = "1976D2";
const LOCATION_FONT_COLOR: &str = "1565C0";
const ROW_FILLS: [&str; 2] = ["E8F5E9", "FFFFFF"];

/// Build the index sheet for an entity -> sheet-name map.
///
/// Entities appear in the map's byte order; the Markdown quick-access index
/// sorts case-insensitively instead, and that difference is deliberate
/// (each matches the artifact it replaces).
pub fn build_index_sheet(entities: &BTreeMap<String, String>) -> Sheet {
    let mut sheet = Sheet::new(INDEX_SHEET_NAME);
    sheet.column_widths.insert(1, NAME_COLUMN_WIDTH);
    sheet.column_widths.insert(2, LOCATION_COLUMN_WIDTH);
    sheet.freeze_panes = Some(CellRef { row: 2, col: 1 });

    write_header(&mut sheet);

    let mut row = 2u32;
    let mut current_letter: Option<char> = None;
    let mut data_row_index = 0usize;
    for (name, location) in entities {
        let letter = leading_letter(name);
        if current_letter != Some(letter) {
            current_letter = Some(letter);
            write_letter_divider(&mut sheet, row, letter);
            row += 1;
            data_row_index = 0;
        }
        write_entity_row(&mut sheet, row, name, location, data_row_index);
        row += 1;
        data_row_index += 1;
    }

    sheet
}

fn leading_letter(name: &str) -> char {
    name.chars().next().map(|c| c.to_uppercase().next().unwrap_or(c)).unwrap_or('#')
}

fn write_header(sheet: &mut Sheet) {
    let style = CellStyle {
        font: Some(Font {
            name: Some("Calibri".to_string()),
            size: Some(14.0),
            bold: true,
            color: Some(HEADER_FONT_COLOR.to_string()),
            ..Default::default()
        }),
        fill: Some(Fill { color: HEADER_FILL.to_string() }),
        alignment: Some(Alignment {
            horizontal: Some(HorizontalAlign::Center),
            vertical: Some(VerticalAlign::Center),
            wrap_text: false,
        }),
        ..Default::default()
    };
    sheet.set_cell(
        1,
        1,
        Cell { value: CellValue::Text("Drug / Condition".to_string()), style: Some(style.clone()) },
    );
    sheet.set_cell(
        1,
        2,
        Cell { value: CellValue::Text("Located In".to_string()), style: Some(style) },
    );
    sheet.row_heights.insert(1, HEADER_ROW_HEIGHT);
}

fn write_letter_divider(sheet: &mut Sheet, row: u32, letter: char) {
    let style = CellStyle {
        font: Some(Font {
            name: Some("Calibri".to_string()),
            size: Some(12.0),
            bold: true,
            color: Some(LETTER_FONT_COLOR.to_string()),
            ..Default::default()
        }),
        fill: Some(Fill { color: LETTER_FILL.to_string() }),
        alignment: Some(Alignment {
            horizontal: Some(HorizontalAlign::Center),
            vertical: Some(VerticalAlign::Center),
            wrap_text: false,
        }),
        ..Default::default()
    };
    sheet.set_cell(
        row,
        1,
        Cell { value: CellValue::Text(format!("═══ {letter} ═══")), style: Some(style.clone()) },
    );
    sheet.set_cell(row, 2, Cell { value: CellValue::Empty, style: Some(style) });
    sheet.merges.push(CellRange::new(row, 1, row, 2));
    sheet.row_heights.insert(row, LETTER_ROW_HEIGHT);
}

fn write_entity_row(
    sheet: &mut Sheet,
    row: u32,
    name: &str,
    location: &str,
    data_row_index: usize,
) {
    let fill = Fill { color: ROW_FILLS[data_row_index % 2].to_string() };
    let name_style = CellStyle {
        font: Some(Font {
            name: Some("Calibri".to_string()),
            size: Some(11.0),
            ..Default::default()
        }),
        fill: Some(fill.clone()),
        alignment: Some(Alignment {
            horizontal: Some(HorizontalAlign::Left),
            vertical: Some(VerticalAlign::Top),
            wrap_text: true,
        }),
        ..Default::default()
    };
    let location_style = CellStyle {
        font: Some(Font {
            name: Some("Calibri".to_string()),
            size: Some(11.0),
            color: Some(LOCATION_FONT_COLOR.to_string()),
            ..Default::default()
        }),
        fill: Some(fill),
        alignment: Some(Alignment {
            horizontal: Some(HorizontalAlign::Left),
            vertical: Some(VerticalAlign::Top),
            wrap_text: false,
        }),
        ..Default::default()
    };
    sheet.set_cell(
        row,
        1,
        Cell { value: CellValue::Text(name.to_string()), style: Some(name_style) },
    );
    sheet.set_cell(
        row,
        2,
        Cell { value: CellValue::Text(location.to_string()), style: Some(location_style) },
    );
}
