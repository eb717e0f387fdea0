//! tlru - A thread-safe time-aware LRU cache
//!
//! Bounded in-process cache with absolute TTL expiry, two recency
//! policies and asynchronous eviction reporting:
//!
//! - **LRA** (Least Recently Accessed): `get` refreshes recency,
//!   `set` on an existing key is an error.
//! - **LRI** (Least Recently Inserted): `set` refreshes recency,
//!   `get` never disturbs the order.
//!
//! Expired entries are collected by a background sweeper thread and on
//! the operations that touch them; every eviction can be reported
//! through an optional channel. The full contents can be exported and
//! re-imported as a serializable, recency-ordered [`State`].
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use tlru::{Cache, Config};
//!
//! let cache: Cache<String, u32> = Cache::new(Config::new(100, Duration::from_secs(60)));
//! cache.set("answer".to_string(), 42).unwrap();
//!
//! let entry = cache.get(&"answer".to_string()).unwrap();
//! assert_eq!(entry.value, 42);
//! assert_eq!(entry.counter, 1);
//! ```

pub mod cache;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{Cache, CacheEntry, CacheStats, EvictedEntry, EvictionReason, State, StateEntry};
pub use config::{Config, EvictionPolicy, DEFAULT_GC_INTERVAL};
pub use error::{CacheError, Result};
