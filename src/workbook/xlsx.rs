//! Bridges between the workbook model and real `.xlsx` files.
//!
//! Reading goes through `calamine` and captures cell values only, the way
//! the charts are consumed everywhere else (formulas come back as computed
//! values, styles start out default). Writing goes through `rust_xlsxwriter`
//! and renders values, styles, widths, heights, merges, and frozen panes.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, Workbook as XlsxWorkbook, Worksheet, XlsxError,
};

use super::model::{
    BorderStyle, Cell, CellStyle, CellValue, HorizontalAlign, Sheet, VerticalAlign, Workbook,
};

/// List the sheet names of an `.xlsx` file without loading cell data
pub fn xlsx_sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open spreadsheet: {}", path.display()))?;
    Ok(workbook.sheet_names().to_vec())
}

/// Read every sheet of an `.xlsx` file into the workbook model (values only)
pub fn read_xlsx(path: &Path) -> Result<Workbook> {
    let mut source: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open spreadsheet: {}", path.display()))?;

    let mut workbook = Workbook::new();
    let names = source.sheet_names().to_vec();
    for name in names {
        let range = source
            .worksheet_range(&name)
            .with_context(|| format!("Failed to read sheet '{}' in {}", name, path.display()))?;

        let mut sheet = Sheet::new(name);
        if let Some((start_row, start_col)) = range.start() {
            for (row_offset, row) in range.rows().enumerate() {
                for (col_offset, data) in row.iter().enumerate() {
                    let value = convert_value(data);
                    if value.is_empty() {
                        continue;
                    }
                    // The used range rarely starts at A1; keep absolute coordinates
                    let cell_row = start_row + row_offset as u32 + 1;
                    let cell_col = start_col + col_offset as u32 + 1;
                    sheet.set_value(cell_row, cell_col, value);
                }
            }
        }
        workbook.sheets.push(sheet);
    }

    Ok(workbook)
}

fn convert_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        other => CellValue::Text(other.to_string()),
    }
}

/// Render the workbook model to a real `.xlsx` file.
///
/// Merged ranges are written first (the writer emits the anchor value as
/// part of the merge), then the remaining cells; anything covered by a
/// merge is skipped in the cell pass. Protection flags and per-edge border
/// colors round-trip through the JSON model but are not rendered.
pub fn render_xlsx(workbook: &Workbook, path: &Path) -> Result<()> {
    let mut output = XlsxWorkbook::new();
    for sheet in &workbook.sheets {
        let worksheet = output.add_worksheet();
        render_sheet(worksheet, sheet)
            .with_context(|| format!("Failed to render sheet '{}'", sheet.name))?;
    }
    output
        .save(path)
        .with_context(|| format!("Failed to write spreadsheet: {}", path.display()))?;
    Ok(())
}

fn render_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<(), XlsxError> {
    worksheet.set_name(sheet.name.as_str())?;

    for (&col, &width) in &sheet.column_widths {
        worksheet.set_column_width((col - 1) as u16, width)?;
    }
    for (&row, &height) in &sheet.row_heights {
        worksheet.set_row_height(row - 1, height)?;
    }

    for merge in &sheet.merges {
        let anchor = sheet.cell(merge.start_row, merge.start_col);
        let text = anchor.and_then(|c| c.value.as_text()).unwrap_or_default();
        let format =
            anchor.and_then(|c| c.style.as_ref()).map(convert_style).unwrap_or_else(Format::new);
        worksheet.merge_range(
            merge.start_row - 1,
            (merge.start_col - 1) as u16,
            merge.end_row - 1,
            (merge.end_col - 1) as u16,
            text.as_str(),
            &format,
        )?;
    }

    for (row_index, row) in sheet.rows.iter().enumerate() {
        for (col_index, cell) in row.iter().enumerate() {
            let row_num = row_index as u32 + 1;
            let col_num = col_index as u32 + 1;
            if sheet.merges.iter().any(|m| m.contains(row_num, col_num)) {
                continue;
            }
            render_cell(worksheet, row_index as u32, col_index as u16, cell)?;
        }
    }

    if let Some(freeze) = sheet.freeze_panes {
        worksheet.set_freeze_panes(freeze.row - 1, (freeze.col - 1) as u16)?;
    }

    Ok(())
}

fn render_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
) -> Result<(), XlsxError> {
    let format = cell.style.as_ref().map(convert_style);
    match (&cell.value, format) {
        (CellValue::Empty, None) => {}
        (CellValue::Empty, Some(f)) => {
            worksheet.write_blank(row, col, &f)?;
        }
        (CellValue::Text(s), None) => {
            worksheet.write_string(row, col, s.as_str())?;
        }
        (CellValue::Text(s), Some(f)) => {
            worksheet.write_string_with_format(row, col, s.as_str(), &f)?;
        }
        (CellValue::Number(n), None) => {
            worksheet.write_number(row, col, *n)?;
        }
        (CellValue::Number(n), Some(f)) => {
            worksheet.write_number_with_format(row, col, *n, &f)?;
        }
        (CellValue::Bool(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        (CellValue::Bool(b), Some(f)) => {
            worksheet.write_boolean_with_format(row, col, *b, &f)?;
        }
    }
    Ok(())
}

fn convert_style(style: &CellStyle) -> Format {
    let mut format = Format::new();

    if let Some(font) = &style.font {
        if let Some(name) = &font.name {
            format = format.set_font_name(name.as_str());
        }
        if let Some(size) = font.size {
            format = format.set_font_size(size);
        }
        if font.bold {
            format = format.set_bold();
        }
        if font.italic {
            format = format.set_italic();
        }
        if let Some(rgb) = font.color.as_deref().and_then(parse_rgb) {
            format = format.set_font_color(Color::RGB(rgb));
        }
    }
    if let Some(fill) = &style.fill {
        if let Some(rgb) = parse_rgb(&fill.color) {
            format = format.set_background_color(Color::RGB(rgb));
        }
    }
    if let Some(alignment) = &style.alignment {
        if let Some(horizontal) = alignment.horizontal {
            format = format.set_align(match horizontal {
                HorizontalAlign::Left => FormatAlign::Left,
                HorizontalAlign::Center => FormatAlign::Center,
                HorizontalAlign::Right => FormatAlign::Right,
            });
        }
        if let Some(vertical) = alignment.vertical {
            format = format.set_align(match vertical {
                VerticalAlign::Top => FormatAlign::Top,
                VerticalAlign::Center => FormatAlign::VerticalCenter,
                VerticalAlign::Bottom => FormatAlign::Bottom,
            });
        }
        if alignment.wrap_text {
            format = format.set_text_wrap();
        }
    }
    if let Some(border) = &style.border {
        if let Some(edge) = &border.top {
            format = format.set_border_top(convert_border(edge.style));
        }
        if let Some(edge) = &border.bottom {
            format = format.set_border_bottom(convert_border(edge.style));
        }
        if let Some(edge) = &border.left {
            format = format.set_border_left(convert_border(edge.style));
        }
        if let Some(edge) = &border.right {
            format = format.set_border_right(convert_border(edge.style));
        }
    }
    if let Some(number_format) = &style.number_format {
        format = format.set_num_format(number_format.as_str());
    }

    format
}

fn convert_border(style: BorderStyle) -> FormatBorder {
    match style {
        BorderStyle::Thin => FormatBorder::Thin,
        BorderStyle::Medium => FormatBorder::Medium,
        BorderStyle::Thick => FormatBorder::Thick,
        BorderStyle::Double => FormatBorder::Double,
        BorderStyle::Dashed => FormatBorder::Dashed,
        BorderStyle::Dotted => FormatBorder::Dotted,
        BorderStyle::Hair => FormatBorder::Hair,
    }
}

/// Parse a 6-digit `RRGGBB` hex color, with or without a leading `#`
fn parse_rgb(hex: &str) -> Option<u32> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}
