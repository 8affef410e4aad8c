//! JSON-backed TTL cache for generated mnemonics
//!
//! One file holds everything: `{version, entries, stats}`. Lookups update
//! the hit/miss counters and the running token-savings estimate; expired
//! entries stay in place until `clean` removes them.

pub mod entry;
pub mod store;

pub use entry::{
    CACHE_SCHEMA_VERSION, CacheEntry, CacheStats, DEFAULT_TTL_DAYS, TOKENS_SAVED_PER_HIT,
    generate_key,
};
pub use store::{Lookup, MnemonicCache, StoreOutcome};
