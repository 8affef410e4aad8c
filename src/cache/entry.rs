//! Cache record types plus the key and expiry rules

use serde::{Deserialize, Serialize};

/// Cache schema version, checked on load to reject incompatible files
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// Default entry lifetime in days
pub const DEFAULT_TTL_DAYS: i64 = 90;

/// Estimated tokens saved per cache hit (one avoided research pass)
pub const TOKENS_SAVED_PER_HIT: u64 = 4950;

const SECONDS_PER_DAY: i64 = 86_400;

/// A single cached mnemonic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    pub source_url: String,
    pub topic: String,
    pub category: String,
    /// Unix seconds; the TTL counts from here, not from last access
    pub created_at: i64,
    pub last_accessed: i64,
    pub ttl_days: i64,
    pub hit_count: u64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CacheEntry {
    /// An entry expires strictly after its TTL elapses; `ttl_days = 0`
    /// makes it expired at any instant after creation.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now - self.created_at > self.ttl_days * SECONDS_PER_DAY
    }
}

/// Persistent hit/miss counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_hits: u64,
    pub total_misses: u64,
    pub total_entries: u64,
    pub token_savings: u64,
}

impl CacheStats {
    /// Hit rate as a percentage with one decimal; 0.0 before any request
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_hits + self.total_misses;
        if total == 0 {
            return 0.0;
        }
        (self.total_hits as f64 / total as f64 * 1000.0).round() / 10.0
    }
}

/// Canonical cache key: lowercased topic and category with spaces and
/// underscores collapsed to hyphens, suffixed `-mnemonic`
pub fn generate_key(topic: &str, category: &str) -> String {
    format!("{}-{}-mnemonic", normalize(topic), normalize(category))
}

fn normalize(part: &str) -> String {
    part.to_lowercase().replace([' ', '_'], "-")
}
