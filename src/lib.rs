//! Studykit - Maintain medical study-guide charts, indexes, and mnemonics
//!
//! This library keeps a folder of course study guides useful after they are
//! created. It supports:
//!
//! - Caching generated mnemonics with TTL expiry and hit statistics
//! - Consolidating master-chart spreadsheets into a per-course reference
//!   workbook with an alphabetical index sheet
//! - Extracting drug/condition names from spreadsheets, Word documents,
//!   and flashcard CSV exports
//! - Generating a quick-access Markdown index over a directory of guides
//! - Running both maintenance steps automatically after a guide is created
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use studykit::generate_quick_access;
//!
//! let course_dir = PathBuf::from("/Users/alice/Study/Pharmacology 2");
//! let report = generate_quick_access(&course_dir, None)?;
//! println!("Indexed {} entities", report.total_entities);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cache;
pub mod cli;
pub mod consolidate;
pub mod extract;
pub mod quickaccess;
pub mod runner;
pub mod workbook;

// Re-export commonly used types
pub use cache::{MnemonicCache, generate_key};
pub use consolidate::consolidate_master_chart;
pub use extract::{ExtractError, extract_entities};
pub use quickaccess::generate_quick_access;
pub use workbook::{Sheet, Workbook};
