//! Entity extraction from Word study guides.
//!
//! Tables are the primary source: a table qualifies when its header row has
//! a cell mentioning "drug", "condition", or "name", and that column is
//! read downward. Only when no table yields anything do Heading 2/3
//! paragraphs get consulted, with their `Drug:`-style prefixes stripped.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCell, TableCellContent,
    TableChild, TableRow, TableRowChild, read_docx,
};
use regex::Regex;

use super::{ExtractError, strip_brand_suffix};

const HEADER_HINTS: [&str; 3] = ["drug", "condition", "name"];

static HEADING_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Drug|Condition|Learning Objective \d+):\s*").expect("heading prefix pattern")
});

/// Extract entities from a `.docx` study guide
pub fn extract_from_docx(path: &Path) -> Result<Vec<String>, ExtractError> {
    let bytes = fs::read(path).map_err(|e| ExtractError::unreadable(path, e))?;
    let docx = read_docx(&bytes).map_err(|e| ExtractError::unreadable(path, e))?;

    let mut entities = Vec::new();
    let mut headings = Vec::new();
    let mut has_content = false;
    for child in &docx.document.children {
        match child {
            DocumentChild::Table(table) => {
                has_content = true;
                collect_table_entities(table, &mut entities);
            }
            DocumentChild::Paragraph(paragraph) => {
                has_content = true;
                if let Some(text) = heading_text(paragraph) {
                    headings.push(text);
                }
            }
            _ => {}
        }
    }

    if !has_content {
        return Err(ExtractError::empty_sheet(path));
    }
    // Headings are the fallback when no table had a usable column
    if entities.is_empty() {
        entities = headings;
    }
    if entities.is_empty() {
        return Err(ExtractError::missing_column(path));
    }
    Ok(entities)
}

fn collect_table_entities(table: &Table, out: &mut Vec<String>) {
    let mut rows = table.rows.iter().map(|child| {
        let TableChild::TableRow(row) = child;
        row
    });
    let Some(header) = rows.next() else { return };
    let Some(column) = header_column(header) else { return };

    for row in rows {
        if let Some(text) = row_cell_text(row, column) {
            let name = strip_brand_suffix(text.trim());
            if name.chars().count() > 1 {
                out.push(name);
            }
        }
    }
}

fn header_column(row: &TableRow) -> Option<usize> {
    for (index, child) in row.cells.iter().enumerate() {
        let TableRowChild::TableCell(cell) = child;
        let text = cell_text(cell).to_lowercase();
        if HEADER_HINTS.iter().any(|hint| text.contains(hint)) {
            return Some(index);
        }
    }
    None
}

fn row_cell_text(row: &TableRow, column: usize) -> Option<String> {
    row.cells.get(column).map(|child| {
        let TableRowChild::TableCell(cell) = child;
        cell_text(cell)
    })
}

fn cell_text(cell: &TableCell) -> String {
    let mut text = String::new();
    for content in &cell.children {
        if let TableCellContent::Paragraph(paragraph) = content {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&paragraph_text(paragraph));
        }
    }
    text
}

/// Heading 2/3 text with any `Drug:`/`Condition:`/`Learning Objective N:`
/// prefix stripped; very short or very long text is not an entity name
fn heading_text(paragraph: &Paragraph) -> Option<String> {
    let style = paragraph.property.style.as_ref()?;
    if !is_heading_style(&style.val) {
        return None;
    }
    let text = paragraph_text(paragraph);
    let stripped = HEADING_PREFIX.replace(text.trim(), "").trim().to_string();
    let length = stripped.chars().count();
    if length > 1 && length < 100 { Some(stripped) } else { None }
}

fn is_heading_style(style_id: &str) -> bool {
    // Style ids ("Heading2") and display names ("Heading 2") both appear in
    // the wild depending on what produced the document
    let normalized: String = style_id.chars().filter(|c| !c.is_whitespace()).collect();
    normalized.eq_ignore_ascii_case("heading2") || normalized.eq_ignore_ascii_case("heading3")
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Run};

    fn paragraph(text: &str) -> Paragraph {
        Paragraph::new().add_run(Run::new().add_text(text))
    }

    fn heading(text: &str, style: &str) -> Paragraph {
        paragraph(text).style(style)
    }

    fn cell(text: &str) -> TableCell {
        TableCell::new().add_paragraph(paragraph(text))
    }

    fn write_docx(path: &Path, docx: Docx) {
        let file = fs::File::create(path).expect("create docx");
        docx.build().pack(file).expect("pack docx");
    }

    #[test]
    fn test_table_column_extraction() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("guide.docx");

        let table = Table::new(vec![
            TableRow::new(vec![cell("Drug Name"), cell("Mechanism")]),
            TableRow::new(vec![cell("Aspirin (Bayer)"), cell("COX inhibitor")]),
            TableRow::new(vec![cell("Clopidogrel"), cell("P2Y12 inhibitor")]),
        ]);
        write_docx(&path, Docx::new().add_table(table));

        let entities = extract_from_docx(&path).unwrap();
        assert_eq!(entities, vec!["Aspirin", "Clopidogrel"]);
    }

    #[test]
    fn test_heading_fallback_when_tables_yield_nothing() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("guide.docx");

        let docx = Docx::new()
            .add_paragraph(heading("Drug: Warfarin", "Heading2"))
            .add_paragraph(heading("Learning Objective 3: Heparin", "Heading3"))
            .add_paragraph(heading("Too short: X", "Heading2"))
            .add_paragraph(paragraph("Body text that is not a heading"));
        write_docx(&path, docx);

        let entities = extract_from_docx(&path).unwrap();
        assert_eq!(entities, vec!["Warfarin", "Heparin"]);
    }

    #[test]
    fn test_tables_win_over_headings() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("guide.docx");

        let table = Table::new(vec![
            TableRow::new(vec![cell("Condition"), cell("Treatment")]),
            TableRow::new(vec![cell("Hypertension"), cell("ACE inhibitors")]),
        ]);
        let docx = Docx::new()
            .add_paragraph(heading("Drug: ShouldNotAppear", "Heading2"))
            .add_table(table);
        write_docx(&path, docx);

        let entities = extract_from_docx(&path).unwrap();
        assert_eq!(entities, vec!["Hypertension"]);
    }

    #[test]
    fn test_document_without_recognizable_column() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("guide.docx");

        write_docx(&path, Docx::new().add_paragraph(paragraph("Just prose, no tables")));

        let error = extract_from_docx(&path).unwrap_err();
        assert!(matches!(error, ExtractError::MissingColumn { .. }));
    }

    #[test]
    fn test_unreadable_docx() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.docx");
        fs::write(&path, b"not a zip archive").unwrap();

        let error = extract_from_docx(&path).unwrap_err();
        assert!(matches!(error, ExtractError::UnreadableFile { .. }));
    }
}
