//! Response cache.
//!
//! A TTL-keyed in-process store fronting the upstream forms API. Entries
//! expire a fixed interval after insertion; a periodic sweep evicts
//! expired entries independent of read traffic, and an LRU bound keeps
//! memory finite.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 600
//! sweep_interval_seconds = 120
//! max_entries = 1024
//! ```

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::response_cache_key;
pub use store::ResponseStore;
