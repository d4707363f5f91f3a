//! Caching subsystem.
//!
//! Three string-keyed namespaces over two storage backends:
//!
//! - `search_{postal}_{typesKey}` — search results, ephemeral, short TTL.
//! - `pet_details_{id}` — single pet records, ephemeral, short TTL.
//! - `ai_rec_{postal}_{typesKey}` — recommendations, durable, long TTL.
//!
//! [`key`] builds normalized keys so cache hits do not depend on filter
//! order or casing. [`TtlCache`] layers freshness and lazy eviction over
//! the pluggable [`KvStore`] backends ([`MemoryStore`], [`FileStore`]).

pub mod key;
mod store;
mod ttl;

pub use store::{FileStore, KvStore, MemoryStore, StorageError};
pub use ttl::{CacheConfig, LONG_TTL, SHORT_TTL, TtlCache};
