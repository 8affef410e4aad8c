//! Mnemonic cache store: load, look up, upsert, clean, report
//!
//! The whole cache is one JSON file `{version, entries, stats}`. Every
//! mutating operation persists immediately with an atomic write, matching
//! how the cache is driven from short-lived CLI invocations. Time enters
//! through the `*_at` variants so expiry is testable without sleeping.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::entry::{
    CACHE_SCHEMA_VERSION, CacheEntry, CacheStats, TOKENS_SAVED_PER_HIT, generate_key,
};

/// On-disk shape of the cache file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    pub version: u32,
    pub entries: Vec<CacheEntry>,
    pub stats: CacheStats,
}

impl Default for CacheFile {
    fn default() -> Self {
        Self { version: CACHE_SCHEMA_VERSION, entries: Vec::new(), stats: CacheStats::default() }
    }
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Hit { value: String, hit_count: u64 },
    Miss,
    /// Entry exists but is past its TTL; it stays in place until `clean`
    Expired,
}

/// Outcome of a store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Inserted,
    Updated,
}

/// The mnemonic cache, bound to its file path
#[derive(Debug)]
pub struct MnemonicCache {
    path: PathBuf,
    data: CacheFile,
}

impl MnemonicCache {
    /// Open the cache at `path`, starting fresh if the file does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed, or if
    /// its schema version does not match [`CACHE_SCHEMA_VERSION`]. The cache
    /// holds user-stored content, so a version mismatch is never silently
    /// discarded.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read cache file: {}", path.display()))?;
            let data: CacheFile = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse cache file: {}", path.display()))?;
            if data.version != CACHE_SCHEMA_VERSION {
                anyhow::bail!(
                    "Cache version mismatch in {} (expected {}, found {})",
                    path.display(),
                    CACHE_SCHEMA_VERSION,
                    data.version
                );
            }
            data
        } else {
            CacheFile::default()
        };
        Ok(Self { path, data })
    }

    /// Default cache location under the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().context("Failed to get platform data directory")?;
        Ok(data_dir.join("studykit").join("mnemonic-cache.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_count(&self) -> usize {
        self.data.entries.len()
    }

    /// Look up a mnemonic by topic and category.
    ///
    /// A hit bumps the entry's `hit_count` and `last_accessed` plus the
    /// global hit and token-savings counters; a miss bumps the miss counter.
    /// An expired entry is reported as [`Lookup::Expired`] without touching
    /// any counter and without persisting.
    pub fn lookup(&mut self, topic: &str, category: &str) -> Result<Lookup> {
        self.lookup_at(topic, category, Utc::now().timestamp())
    }

    pub(crate) fn lookup_at(&mut self, topic: &str, category: &str, now: i64) -> Result<Lookup> {
        let key = generate_key(topic, category);
        let Some(index) = self.data.entries.iter().position(|e| e.key == key) else {
            self.data.stats.total_misses += 1;
            self.save()?;
            return Ok(Lookup::Miss);
        };

        if self.data.entries[index].is_expired_at(now) {
            return Ok(Lookup::Expired);
        }

        let entry = &mut self.data.entries[index];
        entry.hit_count += 1;
        entry.last_accessed = now;
        let value = entry.value.clone();
        let hit_count = entry.hit_count;
        self.data.stats.total_hits += 1;
        self.data.stats.token_savings += TOKENS_SAVED_PER_HIT;
        self.save()?;
        Ok(Lookup::Hit { value, hit_count })
    }

    /// Store or update a mnemonic.
    ///
    /// Upserts by the normalized key: existing entries keep their
    /// `created_at` and `hit_count`, everything else is replaced.
    pub fn store(
        &mut self,
        topic: &str,
        category: &str,
        mnemonic: &str,
        source_url: &str,
        tags: Vec<String>,
        ttl_days: i64,
    ) -> Result<StoreOutcome> {
        self.store_at(topic, category, mnemonic, source_url, tags, ttl_days, Utc::now().timestamp())
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn store_at(
        &mut self,
        topic: &str,
        category: &str,
        mnemonic: &str,
        source_url: &str,
        tags: Vec<String>,
        ttl_days: i64,
        now: i64,
    ) -> Result<StoreOutcome> {
        let key = generate_key(topic, category);
        let outcome = if let Some(existing) = self.data.entries.iter_mut().find(|e| e.key == key) {
            existing.value = mnemonic.to_string();
            existing.source_url = source_url.to_string();
            existing.topic = topic.to_string();
            existing.category = category.to_string();
            existing.last_accessed = now;
            existing.ttl_days = ttl_days;
            existing.tags = tags;
            StoreOutcome::Updated
        } else {
            self.data.entries.push(CacheEntry {
                key,
                value: mnemonic.to_string(),
                source_url: source_url.to_string(),
                topic: topic.to_string(),
                category: category.to_string(),
                created_at: now,
                last_accessed: now,
                ttl_days,
                hit_count: 0,
                tags,
            });
            StoreOutcome::Inserted
        };
        self.data.stats.total_entries = self.data.entries.len() as u64;
        self.save()?;
        Ok(outcome)
    }

    /// Remove expired entries; returns how many were dropped.
    /// Surviving entries are untouched, hit counts and tags included.
    pub fn clean_expired(&mut self) -> Result<usize> {
        self.clean_expired_at(Utc::now().timestamp())
    }

    pub(crate) fn clean_expired_at(&mut self, now: i64) -> Result<usize> {
        let before = self.data.entries.len();
        self.data.entries.retain(|e| !e.is_expired_at(now));
        let removed = before - self.data.entries.len();
        self.data.stats.total_entries = self.data.entries.len() as u64;
        self.save()?;
        Ok(removed)
    }

    pub fn stats(&self) -> &CacheStats {
        &self.data.stats
    }

    /// Entries whose topic or key contains `filter` (case-insensitive);
    /// every entry when no filter is given
    pub fn entries(&self, filter: Option<&str>) -> Vec<&CacheEntry> {
        match filter {
            None => self.data.entries.iter().collect(),
            Some(f) => {
                let needle = f.to_lowercase();
                self.data
                    .entries
                    .iter()
                    .filter(|e| e.topic.to_lowercase().contains(&needle) || e.key.contains(&needle))
                    .collect()
            }
        }
    }

    /// Persist atomically (temp file + rename)
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create cache directory: {}", parent.display())
                })?;
            }
        }
        let json = serde_json::to_string_pretty(&self.data).context("Failed to serialize cache")?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)
            .with_context(|| format!("Failed to write cache temp file: {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to rename cache temp file: {}", self.path.display()))?;
        Ok(())
    }
}
