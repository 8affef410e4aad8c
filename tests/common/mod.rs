//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};
use tempfile::TempDir;

use studykit::workbook::{CellValue, Sheet, Workbook, storage, xlsx};

/// Builder for creating course directory fixtures
pub struct CourseDirBuilder {
    temp_dir: TempDir,
    course_dir: PathBuf,
}

impl CourseDirBuilder {
    /// Create a new builder whose course directory has the given name
    pub fn new(course_name: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let course_dir = temp_dir.path().join(course_name);
        fs::create_dir(&course_dir).expect("Failed to create course dir");
        Self { temp_dir, course_dir }
    }

    /// Get the path to the course directory
    pub fn path(&self) -> &Path {
        &self.course_dir
    }

    /// Add a chart spreadsheet with entity names in a `Drug Name` column
    pub fn with_chart_xlsx(self, file_name: &str, sheet_name: &str, entities: &[&str]) -> Self {
        write_chart_xlsx(&self.course_dir.join(file_name), sheet_name, entities);
        self
    }

    /// Add a chart saved in the workbook JSON format
    pub fn with_workbook_json(self, file_name: &str, sheet_name: &str, entities: &[&str]) -> Self {
        let workbook = chart_workbook(sheet_name, entities);
        storage::save_workbook(&self.course_dir.join(file_name), &workbook)
            .expect("Failed to save workbook json");
        self
    }

    /// Add a flashcard CSV export with one question per row
    pub fn with_flashcards_csv(self, file_name: &str, questions: &[&str]) -> Self {
        let mut content = String::new();
        for question in questions {
            content.push_str(&format!("\"{}\",\"answer text\"\n", question));
        }
        fs::write(self.course_dir.join(file_name), content)
            .expect("Failed to write flashcards csv");
        self
    }

    /// Add a Word study guide with one drug table
    pub fn with_docx(self, file_name: &str, entities: &[&str]) -> Self {
        write_docx_chart(&self.course_dir.join(file_name), entities);
        self
    }

    /// Add an arbitrary file with the given content
    pub fn with_file(self, file_name: &str, content: &str) -> Self {
        fs::write(self.course_dir.join(file_name), content).expect("Failed to write file");
        self
    }

    /// Build and return the fixture (consumes self)
    pub fn build(self) -> CourseDir {
        CourseDir { _temp_dir: self.temp_dir, course_dir: self.course_dir }
    }
}

/// A built course directory; keeps its temp dir alive until dropped
pub struct CourseDir {
    _temp_dir: TempDir,
    course_dir: PathBuf,
}

impl CourseDir {
    /// Get the path to the course directory
    pub fn path(&self) -> &Path {
        &self.course_dir
    }
}

/// A one-sheet chart workbook: header row, entity names in column B
pub fn chart_workbook(sheet_name: &str, entities: &[&str]) -> Workbook {
    let mut sheet = Sheet::new(sheet_name);
    sheet.set_value(1, 1, CellValue::Text("Category".to_string()));
    sheet.set_value(1, 2, CellValue::Text("Drug Name".to_string()));
    sheet.set_value(1, 3, CellValue::Text("Mechanism".to_string()));
    for (i, entity) in entities.iter().enumerate() {
        let row = i as u32 + 2;
        sheet.set_value(row, 1, CellValue::Text("Class".to_string()));
        sheet.set_value(row, 2, CellValue::Text((*entity).to_string()));
    }

    let mut workbook = Workbook::new();
    workbook.sheets.push(sheet);
    workbook
}

/// Render a chart workbook straight to an `.xlsx` file
pub fn write_chart_xlsx(path: &Path, sheet_name: &str, entities: &[&str]) {
    xlsx::render_xlsx(&chart_workbook(sheet_name, entities), path)
        .expect("Failed to render chart xlsx");
}

/// Write a Word guide containing a single drug table
pub fn write_docx_chart(path: &Path, entities: &[&str]) {
    let mut rows = vec![TableRow::new(vec![docx_cell("Drug Name"), docx_cell("Mechanism")])];
    for entity in entities {
        rows.push(TableRow::new(vec![docx_cell(entity), docx_cell("mechanism text")]));
    }

    let file = fs::File::create(path).expect("Failed to create docx");
    Docx::new().add_table(Table::new(rows)).build().pack(file).expect("Failed to pack docx");
}

fn docx_cell(text: &str) -> TableCell {
    TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
}
