/// CLI binary integration tests using assert_cmd
///
/// These tests invoke the actual binary and verify command-line behavior
mod common;

use std::process::Command;

use assert_cmd::prelude::*;
use common::CourseDirBuilder;
use predicates::prelude::*;

fn studykit() -> Command {
    Command::new(env!("CARGO_BIN_EXE_studykit"))
}

#[test]
fn test_cli_no_command_shows_help_message() {
    studykit()
        .assert()
        .success()
        .stdout(predicate::str::contains("Use --help for usage information"));
}

#[test]
fn test_cli_help_flag() {
    studykit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Maintain study-guide charts"))
        .stdout(predicate::str::contains("cache"))
        .stdout(predicate::str::contains("consolidate"))
        .stdout(predicate::str::contains("quick-access"))
        .stdout(predicate::str::contains("post-process"));
}

#[test]
fn test_cli_version_flag() {
    studykit().arg("--version").assert().success().stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_cli_invalid_command() {
    studykit().arg("invalid-command").assert().failure();
}

#[test]
fn test_cli_cache_store_and_lookup() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let cache_file = temp_dir.path().join("cache.json");

    studykit()
        .args(["cache", "store", "Beta Blockers", "Cardiology", "ABCD: Atenolol Blocks"])
        .arg("--cache-file")
        .arg(&cache_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cached mnemonic beta-blockers-cardiology-mnemonic"));

    studykit()
        .args(["cache", "lookup", "beta_blockers", "cardiology"])
        .arg("--cache-file")
        .arg(&cache_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("ABCD: Atenolol Blocks"))
        .stderr(predicate::str::contains("cache hit #1"));
}

#[test]
fn test_cli_cache_lookup_miss_exits_zero() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let cache_file = temp_dir.path().join("cache.json");

    studykit()
        .args(["cache", "lookup", "ACE Inhibitors", "Cardiology"])
        .arg("--cache-file")
        .arg(&cache_file)
        .assert()
        .success()
        .stderr(predicate::str::contains("No cached mnemonic"));
}

#[test]
fn test_cli_cache_stats_block() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let cache_file = temp_dir.path().join("cache.json");

    studykit()
        .args(["cache", "store", "Diuretics", "Renal", "Loop de loop"])
        .arg("--cache-file")
        .arg(&cache_file)
        .assert()
        .success();

    studykit()
        .args(["cache", "stats"])
        .arg("--cache-file")
        .arg(&cache_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Mnemonic Cache Statistics"))
        .stdout(predicate::str::contains("Entries: 1"))
        .stdout(predicate::str::contains("Hit rate: 0.0%"));
}

#[test]
fn test_cli_cache_list_and_clean() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let cache_file = temp_dir.path().join("cache.json");

    studykit()
        .args(["cache", "store", "Diuretics", "Renal", "Loop de loop"])
        .arg("--cache-file")
        .arg(&cache_file)
        .assert()
        .success();

    studykit()
        .args(["cache", "list"])
        .arg("--cache-file")
        .arg(&cache_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("diuretics-renal-mnemonic (hits: 0)"));

    studykit()
        .args(["cache", "clean"])
        .arg("--cache-file")
        .arg(&cache_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 0 expired entries"));
}

#[test]
fn test_cli_consolidate_creates_reference() {
    let course = CourseDirBuilder::new("Pharmacology")
        .with_chart_xlsx("Cardio_Drugs_Master_Chart.xlsx", "Master Chart", &["Aspirin"])
        .build();
    let chart = course.path().join("Cardio_Drugs_Master_Chart.xlsx");
    let reference = course.path().join("reference.json");

    studykit()
        .arg("consolidate")
        .arg(&chart)
        .arg(&reference)
        .assert()
        .success()
        .stdout(predicate::str::contains("Consolidated 'Cardio Drugs'"))
        .stdout(predicate::str::contains("Total indexed entities: 1"));
    assert!(reference.exists());
}

#[test]
fn test_cli_consolidate_missing_chart_fails() {
    let temp_dir = tempfile::TempDir::new().unwrap();

    studykit()
        .arg("consolidate")
        .arg(temp_dir.path().join("absent.xlsx"))
        .arg(temp_dir.path().join("reference.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Master chart not found"));
}

#[test]
fn test_cli_quick_access_writes_index() {
    let course = CourseDirBuilder::new("Pharmacology")
        .with_chart_xlsx("Cardio_Drugs_Master_Chart.xlsx", "Master Chart", &["Aspirin"])
        .build();

    studykit()
        .arg("quick-access")
        .arg(course.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Quick access index written"))
        .stdout(predicate::str::contains("Entities: 1"));
    assert!(course.path().join("QUICK_ACCESS.md").exists());
}

#[test]
fn test_cli_quick_access_empty_directory_fails() {
    let temp_dir = tempfile::TempDir::new().unwrap();

    studykit()
        .arg("quick-access")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No entities found"));
}

#[test]
fn test_cli_post_process_full_pipeline() {
    let course = CourseDirBuilder::new("Pharmacology 2")
        .with_chart_xlsx("Cardio_Drugs_Master_Chart.xlsx", "Master Chart", &["Aspirin"])
        .build();
    let chart = course.path().join("Cardio_Drugs_Master_Chart.xlsx");

    studykit()
        .arg("post-process")
        .arg(&chart)
        .assert()
        .success()
        .stdout(predicate::str::contains("Course: Pharmacology"))
        .stdout(predicate::str::contains("Consolidation: ok"))
        .stdout(predicate::str::contains("Quick access: ok"));

    assert!(course.path().join("Pharmacology_Master_Reference.json").exists());
    assert!(course.path().join("Pharmacology_Master_Reference.xlsx").exists());
    assert!(course.path().join("QUICK_ACCESS_Pharmacology.md").exists());
}

#[test]
fn test_cli_post_process_non_chart_skips_consolidation() {
    let course = CourseDirBuilder::new("Clinical Medicine 1")
        .with_docx("Coagulation_Guide.docx", &["Warfarin"])
        .build();
    let guide = course.path().join("Coagulation_Guide.docx");

    studykit()
        .arg("post-process")
        .arg(&guide)
        .assert()
        .success()
        .stdout(predicate::str::contains("Course: Clinical_Medicine"))
        .stdout(predicate::str::contains("Consolidation: skipped"))
        .stdout(predicate::str::contains("Quick access: ok"));

    assert!(!course.path().join("Clinical_Medicine_Master_Reference.json").exists());
    assert!(course.path().join("QUICK_ACCESS_Clinical_Medicine.md").exists());
}

#[test]
fn test_cli_post_process_outside_course_tree_is_skipped() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let guide = temp_dir.path().join("guide.xlsx");
    common::write_chart_xlsx(&guide, "Master Chart", &["Aspirin"]);

    studykit()
        .arg("post-process")
        .arg(&guide)
        .assert()
        .success()
        .stdout(predicate::str::contains("skipping post-processing"));
}

#[test]
fn test_cli_post_process_missing_guide_fails() {
    let temp_dir = tempfile::TempDir::new().unwrap();

    studykit()
        .arg("post-process")
        .arg(temp_dir.path().join("absent.xlsx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Study guide not found"));
}
