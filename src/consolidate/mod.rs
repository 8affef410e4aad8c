//! Master-chart consolidation into a cumulative reference workbook.
//!
//! Each consolidation copies one chart sheet by value into the reference,
//! replacing any previous version of the same topic, then rebuilds the
//! entity map and the index sheet from scratch. Re-running with the same
//! chart is a no-op beyond the timestamped save.

pub mod index_sheet;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::extract::sheet::chart_entities;
use crate::workbook;
use crate::workbook::model::{Sheet, Workbook};
use crate::workbook::{storage, xlsx};

pub use index_sheet::{INDEX_SHEET_NAME, build_index_sheet};

/// Sheet name a master chart stores its rows under
pub const MASTER_CHART_SHEET: &str = "Master Chart";

const MASTER_CHART_FILE_SUFFIX: &str = "_Master_Chart";

/// What a consolidation run did
#[derive(Debug, Clone)]
pub struct ConsolidationSummary {
    pub topic: String,
    pub entities_added: usize,
    pub total_entities: usize,
    pub reference_path: PathBuf,
}

/// Consolidate one master chart into the reference workbook.
///
/// The chart's sheet is copied under the topic name derived from the file
/// name (an existing sheet with that name is replaced, new topics append
/// at the end), the entity map is rebuilt by re-scanning every chart sheet
/// of the reference, and the index sheet is regenerated at position 0.
/// When `xlsx_output` is given the updated reference is also rendered to a
/// real spreadsheet.
///
/// # Errors
///
/// Fails if the master chart is missing, unreadable, or has no sheets; if
/// the reference workbook exists but cannot be loaded; or if saving fails.
pub fn consolidate_master_chart(
    master_chart: &Path,
    reference_path: &Path,
    xlsx_output: Option<&Path>,
) -> Result<ConsolidationSummary> {
    if !master_chart.exists() {
        anyhow::bail!("Master chart not found: {}", master_chart.display());
    }

    let topic = derive_topic_name(master_chart);
    let chart = workbook::open_chart(master_chart)?;
    let source = select_chart_sheet(&chart)
        .with_context(|| format!("No sheets in master chart: {}", master_chart.display()))?;

    let mut reference = storage::load_or_default(reference_path)?;

    let mut copied = source.clone();
    copied.name = topic.clone();
    let entities_added = chart_entities(&copied).len();
    replace_sheet(&mut reference, copied);

    let entity_map = collect_entity_map(&reference);
    let total_entities = entity_map.len();
    let index = build_index_sheet(&entity_map);
    reference.remove_sheet(INDEX_SHEET_NAME);
    reference.sheets.insert(0, index);

    storage::save_workbook(reference_path, &reference)?;
    if let Some(xlsx_path) = xlsx_output {
        xlsx::render_xlsx(&reference, xlsx_path)?;
    }

    Ok(ConsolidationSummary {
        topic,
        entities_added,
        total_entities,
        reference_path: reference_path.to_path_buf(),
    })
}

/// Topic name from the chart file name:
/// `Beta_Blockers_Master_Chart.xlsx` -> `Beta Blockers`
pub fn derive_topic_name(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let base = stem.strip_suffix(MASTER_CHART_FILE_SUFFIX).unwrap_or(stem);
    base.replace('_', " ")
}

/// The `Master Chart` sheet when present, otherwise the first sheet
fn select_chart_sheet(chart: &Workbook) -> Option<&Sheet> {
    chart.sheet(MASTER_CHART_SHEET).or_else(|| chart.sheets.first())
}

/// Replace any same-named sheet; new sheets append at the end
fn replace_sheet(reference: &mut Workbook, sheet: Sheet) {
    reference.remove_sheet(&sheet.name);
    reference.sheets.push(sheet);
}

/// Entity -> sheet map across every chart sheet of the reference; when the
/// same entity appears on several sheets the later sheet wins
fn collect_entity_map(reference: &Workbook) -> BTreeMap<String, String> {
    let mut entities = BTreeMap::new();
    for sheet in &reference.sheets {
        if sheet.name == INDEX_SHEET_NAME {
            continue;
        }
        for entity in chart_entities(sheet) {
            entities.insert(entity, sheet.name.clone());
        }
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::model::CellValue;

    fn chart_sheet(name: &str, drugs: &[&str]) -> Sheet {
        let mut sheet = Sheet::new(name);
        sheet.set_value(1, 1, CellValue::Text("Category".to_string()));
        sheet.set_value(1, 2, CellValue::Text("Drug Name".to_string()));
        for (i, drug) in drugs.iter().enumerate() {
            sheet.set_value(i as u32 + 2, 2, CellValue::Text(drug.to_string()));
        }
        sheet
    }

    #[test]
    fn test_derive_topic_name() {
        let topic = derive_topic_name(Path::new("Beta_Blockers_Master_Chart.xlsx"));
        assert_eq!(topic, "Beta Blockers");
        let topic = derive_topic_name(Path::new("/tmp/ACE_Inhibitors_Master_Chart.json"));
        assert_eq!(topic, "ACE Inhibitors");
        assert_eq!(derive_topic_name(Path::new("Diuretics.xlsx")), "Diuretics");
    }

    #[test]
    fn test_replace_sheet_is_idempotent() {
        let mut reference = Workbook::new();
        replace_sheet(&mut reference, chart_sheet("Beta Blockers", &["Metoprolol"]));
        replace_sheet(&mut reference, chart_sheet("Beta Blockers", &["Metoprolol", "Atenolol"]));

        assert_eq!(reference.sheets.len(), 1);
        assert_eq!(chart_entities(reference.sheet("Beta Blockers").unwrap()).len(), 2);
    }

    #[test]
    fn test_collect_entity_map_later_sheet_wins() {
        let mut reference = Workbook::new();
        reference.sheets.push(chart_sheet("Old Topic", &["Aspirin", "Heparin"]));
        reference.sheets.push(chart_sheet("New Topic", &["Aspirin"]));
        reference.sheets.push(build_index_sheet(&BTreeMap::new()));

        let map = collect_entity_map(&reference);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Aspirin"), Some(&"New Topic".to_string()));
        assert_eq!(map.get("Heparin"), Some(&"Old Topic".to_string()));
    }

    #[test]
    fn test_select_chart_sheet_prefers_master_chart() {
        let mut chart = Workbook::new();
        chart.sheets.push(chart_sheet("Notes", &["Wrong"]));
        chart.sheets.push(chart_sheet(MASTER_CHART_SHEET, &["Right"]));
        assert_eq!(select_chart_sheet(&chart).unwrap().name, MASTER_CHART_SHEET);

        let mut no_master = Workbook::new();
        no_master.sheets.push(chart_sheet("Only Sheet", &["StillWorks"]));
        assert_eq!(select_chart_sheet(&no_master).unwrap().name, "Only Sheet");
    }
}
