//! Entity extraction from flashcard CSV exports.
//!
//! Exports have no header row; the first field of each record is the
//! question text. Question stems name their entity after "of"/"for"
//! ("What is the mechanism of Metoprolol?"), which is what the pattern
//! keys on. Capitalization matters: the capture is a capitalized word, so
//! sentence fragments like "of the" do not match.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::ExtractError;

static QUESTION_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:mechanism|class|use|effect).*?(?:of|for)\s+([A-Z][a-z]+)")
        .expect("question entity pattern")
});

/// True when the file name marks a flashcard export (`*Flashcards.csv`)
pub fn is_flashcard_export(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.ends_with("Flashcards.csv"))
}

/// Scan the question column of a flashcard CSV for entity names.
/// Matches are deduplicated and returned in sorted order.
pub fn extract_from_csv(path: &Path) -> Result<Vec<String>, ExtractError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ExtractError::unreadable(path, e))?;

    let mut entities = BTreeSet::new();
    let mut records = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| ExtractError::unreadable(path, e))?;
        records += 1;
        let Some(question) = record.get(0) else { continue };
        for capture in QUESTION_ENTITY.captures_iter(question) {
            if let Some(name) = capture.get(1) {
                entities.insert(name.as_str().to_string());
            }
        }
    }

    if records == 0 {
        return Err(ExtractError::empty_sheet(path));
    }
    Ok(entities.into_iter().collect())
}
