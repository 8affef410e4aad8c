use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::cache::{
    DEFAULT_TTL_DAYS, Lookup, MnemonicCache, StoreOutcome, TOKENS_SAVED_PER_HIT, generate_key,
};
use crate::consolidate::consolidate_master_chart;
use crate::quickaccess::generate_quick_access;
use crate::runner::{PostProcessOutcome, StepResult, run_post_processing};

#[derive(Parser)]
#[command(name = "studykit")]
#[command(version = "0.1.0")]
#[command(about = "Maintain study-guide charts, indexes, and mnemonics", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the mnemonic cache
    Cache(CacheArgs),
    /// Copy a master chart into a course reference workbook
    Consolidate {
        /// Path to the `*_Master_Chart` file (.xlsx or .json)
        master_chart: PathBuf,
        /// Reference workbook to update (created if missing)
        reference: PathBuf,
        /// Also render the reference workbook as a spreadsheet
        #[arg(long, value_name = "PATH")]
        xlsx: Option<PathBuf>,
    },
    /// Build a quick-access Markdown index for a directory of study guides
    QuickAccess {
        /// Directory whose top-level study guides are scanned
        directory: PathBuf,
        /// Where to write the index (default: QUICK_ACCESS.md in the directory)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Refresh course artifacts after a study guide is created
    PostProcess {
        /// The just-created study guide
        study_guide: PathBuf,
    },
}

#[derive(Args)]
pub struct CacheArgs {
    /// Cache file path (default: the platform data directory)
    #[arg(long, value_name = "PATH", global = true)]
    pub cache_file: Option<PathBuf>,

    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Look up a cached mnemonic
    Lookup { topic: String, category: String },
    /// Store or update a mnemonic
    Store {
        topic: String,
        category: String,
        mnemonic: String,
        /// Where the mnemonic came from
        source_url: Option<String>,
        /// Tag to attach (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Days before the entry expires
        #[arg(long, default_value_t = DEFAULT_TTL_DAYS)]
        ttl_days: i64,
    },
    /// Remove expired entries
    Clean,
    /// Show cache statistics
    Stats,
    /// List cached entries
    List {
        /// Case-insensitive substring match on topic or key
        topic_filter: Option<String>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Cache(args)) => {
            run_cache(args)?;
        }
        Some(Commands::Consolidate { master_chart, reference, xlsx }) => {
            run_consolidate(master_chart, reference, xlsx.as_deref())?;
        }
        Some(Commands::QuickAccess { directory, output }) => {
            run_quick_access(directory, output.as_deref())?;
        }
        Some(Commands::PostProcess { study_guide }) => {
            run_post_process(study_guide)?;
        }
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn run_cache(args: &CacheArgs) -> Result<()> {
    let path = match &args.cache_file {
        Some(path) => path.clone(),
        None => MnemonicCache::default_path()?,
    };
    let mut cache = MnemonicCache::open(path)?;

    match &args.action {
        CacheAction::Lookup { topic, category } => match cache.lookup(topic, category)? {
            Lookup::Hit { value, hit_count } => {
                println!("{}", value);
                eprintln!("(cache hit #{}, ~{} tokens saved)", hit_count, TOKENS_SAVED_PER_HIT);
            }
            Lookup::Expired => {
                eprintln!("Cache entry for {} / {} has expired", topic, category);
            }
            Lookup::Miss => {
                eprintln!("No cached mnemonic for {} / {}", topic, category);
            }
        },
        CacheAction::Store { topic, category, mnemonic, source_url, tags, ttl_days } => {
            let outcome = cache.store(
                topic,
                category,
                mnemonic,
                source_url.as_deref().unwrap_or(""),
                tags.clone(),
                *ttl_days,
            )?;
            let verb = match outcome {
                StoreOutcome::Inserted => "Cached",
                StoreOutcome::Updated => "Updated",
            };
            println!("{} mnemonic {}", verb, generate_key(topic, category));
        }
        CacheAction::Clean => {
            let removed = cache.clean_expired()?;
            println!("Removed {} expired entries", removed);
        }
        CacheAction::Stats => {
            print_stats(&cache);
        }
        CacheAction::List { topic_filter } => {
            let entries = cache.entries(topic_filter.as_deref());
            if entries.is_empty() {
                println!("No cached mnemonics");
            } else {
                for entry in entries {
                    println!("{} (hits: {})", entry.key, entry.hit_count);
                    println!("    {}", truncate(&entry.value, 60));
                }
            }
        }
    }

    Ok(())
}

fn print_stats(cache: &MnemonicCache) {
    let stats = cache.stats();

    println!("Mnemonic Cache Statistics");
    println!("================================");
    println!("Entries: {}", cache.entry_count());
    println!("  Total hits: {}", stats.total_hits);
    println!("  Total misses: {}", stats.total_misses);
    println!("  Hit rate: {:.1}%", stats.hit_rate());
    println!("Token savings: ~{} tokens", stats.token_savings);
    println!();
    println!("Cache file: {}", cache.path().display());
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

fn run_consolidate(master_chart: &Path, reference: &Path, xlsx: Option<&Path>) -> Result<()> {
    let summary = consolidate_master_chart(master_chart, reference, xlsx)?;

    println!("Consolidated '{}' into {}", summary.topic, summary.reference_path.display());
    println!("  Entities from this chart: {}", summary.entities_added);
    println!("  Total indexed entities: {}", summary.total_entities);
    if let Some(xlsx) = xlsx {
        println!("  Spreadsheet copy: {}", xlsx.display());
    }

    Ok(())
}

fn run_quick_access(directory: &Path, output: Option<&Path>) -> Result<()> {
    let report = generate_quick_access(directory, output)?;

    println!("Quick access index written to {}", report.output_path.display());
    println!("  Entities: {}", report.total_entities);
    println!("  Files scanned: {}", report.files_scanned);
    if report.failures > 0 {
        println!("  Files skipped: {}", report.failures);
    }

    Ok(())
}

fn run_post_process(study_guide: &Path) -> Result<()> {
    let outcome = run_post_processing(study_guide)?;

    if let PostProcessOutcome::Completed { consolidation, quick_access } = &outcome {
        println!();
        println!("Post-processing summary");
        println!("  Consolidation: {}", step_label(*consolidation));
        println!("  Quick access: {}", step_label(*quick_access));
    }

    if !outcome.success() {
        anyhow::bail!("Post-processing completed with errors");
    }

    Ok(())
}

fn step_label(result: StepResult) -> &'static str {
    match result {
        StepResult::Succeeded => "ok",
        StepResult::Failed => "failed",
        StepResult::NotApplicable => "skipped",
    }
}
