//! Post-processing runner: after a study guide lands on disk, refresh the
//! course-level reference workbook and quick-access index.
//!
//! Both steps run as subprocesses of this same binary so a hang in one
//! tool cannot wedge the caller: each child gets a hard deadline and is
//! killed on overrun. A guide outside any recognized course folder is
//! skipped, which is a success, not an error.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use wait_timeout::ChildExt;

use crate::consolidate::MASTER_CHART_SHEET;
use crate::workbook::{storage, xlsx};

const CONSOLIDATE_TIMEOUT: Duration = Duration::from_secs(30);
const QUICK_ACCESS_TIMEOUT: Duration = Duration::from_secs(60);

static PHARMACOLOGY_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Pharmacology\s*\d*").expect("course folder pattern"));
static CLINICAL_MEDICINE_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Clinical\s*Medicine\s*\d*").expect("course folder pattern"));

/// Course family a study guide belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseType {
    Pharmacology,
    ClinicalMedicine,
}

impl CourseType {
    /// Label used in generated artifact names
    pub fn label(self) -> &'static str {
        match self {
            CourseType::Pharmacology => "Pharmacology",
            CourseType::ClinicalMedicine => "Clinical_Medicine",
        }
    }
}

/// Result of one post-processing step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Succeeded,
    Failed,
    /// The step did not apply to this guide (e.g. consolidation of a
    /// document that is not a master chart)
    NotApplicable,
}

/// Outcome of a post-processing run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessOutcome {
    /// The guide is not inside a recognized course folder
    Skipped,
    Completed { consolidation: StepResult, quick_access: StepResult },
}

impl PostProcessOutcome {
    /// True when no step failed
    pub fn success(&self) -> bool {
        match self {
            PostProcessOutcome::Skipped => true,
            PostProcessOutcome::Completed { consolidation, quick_access } => {
                *consolidation != StepResult::Failed && *quick_access != StepResult::Failed
            }
        }
    }
}

/// Walk parent directories looking for the course folder.
///
/// Returns the course type and folder path, or None when the guide is not
/// inside a recognized course tree.
pub fn detect_course(study_guide: &Path) -> Option<(CourseType, PathBuf)> {
    for ancestor in study_guide.ancestors().skip(1) {
        let Some(name) = ancestor.file_name().and_then(|n| n.to_str()) else { break };
        if PHARMACOLOGY_DIR.is_match(name) {
            return Some((CourseType::Pharmacology, ancestor.to_path_buf()));
        }
        if CLINICAL_MEDICINE_DIR.is_match(name) {
            return Some((CourseType::ClinicalMedicine, ancestor.to_path_buf()));
        }
    }
    None
}

/// Does this chart file have a `Master Chart` sheet? Unreadable files are
/// reported and treated as "no".
pub fn has_master_chart_sheet(path: &Path) -> bool {
    let is_json =
        path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let names = if is_json {
        storage::load_workbook(path)
            .map(|wb| wb.sheets.iter().map(|s| s.name.clone()).collect::<Vec<_>>())
    } else {
        xlsx::xlsx_sheet_names(path)
    };
    match names {
        Ok(names) => names.iter().any(|n| n == MASTER_CHART_SHEET),
        Err(error) => {
            eprintln!("Warning: could not inspect {}: {:#}", path.display(), error);
            false
        }
    }
}

/// Refresh the course artifacts for a just-created study guide.
///
/// Consolidation runs only for chart files that actually contain a
/// `Master Chart` sheet; the quick-access index is refreshed for every
/// guide. Step failures are captured in the outcome rather than returned
/// as errors so the summary can always be printed.
pub fn run_post_processing(study_guide: &Path) -> Result<PostProcessOutcome> {
    if !study_guide.exists() {
        anyhow::bail!("Study guide not found: {}", study_guide.display());
    }

    let Some((course, course_dir)) = detect_course(study_guide) else {
        println!(
            "No course folder detected for {}; skipping post-processing",
            study_guide.display()
        );
        return Ok(PostProcessOutcome::Skipped);
    };
    println!("Course: {} ({})", course.label(), course_dir.display());

    let reference_path = course_dir.join(format!("{}_Master_Reference.json", course.label()));
    let reference_xlsx = course_dir.join(format!("{}_Master_Reference.xlsx", course.label()));
    let quick_access_path = course_dir.join(format!("QUICK_ACCESS_{}.md", course.label()));

    let consolidation = if is_chart_candidate(study_guide) && has_master_chart_sheet(study_guide) {
        println!("Consolidating into {}", reference_path.display());
        run_step(
            &[
                OsStr::new("consolidate"),
                study_guide.as_os_str(),
                reference_path.as_os_str(),
                OsStr::new("--xlsx"),
                reference_xlsx.as_os_str(),
            ],
            CONSOLIDATE_TIMEOUT,
        )
    } else {
        println!("Not a master chart; skipping consolidation");
        StepResult::NotApplicable
    };

    println!("Refreshing {}", quick_access_path.display());
    let quick_access = run_step(
        &[
            OsStr::new("quick-access"),
            course_dir.as_os_str(),
            OsStr::new("--output"),
            quick_access_path.as_os_str(),
        ],
        QUICK_ACCESS_TIMEOUT,
    );

    Ok(PostProcessOutcome::Completed { consolidation, quick_access })
}

/// Consolidation only applies to chart-shaped files
fn is_chart_candidate(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref(),
        Some("xlsx" | "json")
    )
}

/// Run one subcommand of this binary with a hard deadline; the child is
/// killed and reaped on overrun
fn run_step(args: &[&OsStr], timeout: Duration) -> StepResult {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(error) => {
            eprintln!("Warning: cannot locate own executable: {}", error);
            return StepResult::Failed;
        }
    };

    let spawned = Command::new(exe)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(error) => {
            eprintln!("Warning: failed to start step: {}", error);
            return StepResult::Failed;
        }
    };

    match child.wait_timeout(timeout) {
        Ok(Some(status)) if status.success() => StepResult::Succeeded,
        Ok(Some(status)) => {
            eprintln!("Warning: step exited with {}", status);
            StepResult::Failed
        }
        Ok(None) => {
            eprintln!("Warning: step timed out after {}s; killing it", timeout.as_secs());
            let _ = child.kill();
            let _ = child.wait();
            StepResult::Failed
        }
        Err(error) => {
            eprintln!("Warning: failed to wait for step: {}", error);
            StepResult::Failed
        }
    }
}
