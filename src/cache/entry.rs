//! Cache Entry Module
//!
//! Node payload carried per live key and the snapshot types handed to
//! callers and to the eviction sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Eviction Reason ==
/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvictionReason {
    /// Displaced by an insert into a full cache
    Dropped,
    /// TTL elapsed relative to `last_used_at`
    Expired,
    /// Explicitly removed via `delete`
    Deleted,
}

// == Node Record ==
/// Internal per-key payload stored in the recency list.
#[derive(Debug, Clone)]
pub(crate) struct NodeRecord<K, V> {
    pub key: K,
    pub value: V,
    pub counter: i64,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl<K: Clone, V: Clone> NodeRecord<K, V> {
    /// By-value snapshot returned to callers. Mutating the snapshot
    /// never affects the live node.
    pub fn snapshot(&self) -> CacheEntry<K, V> {
        CacheEntry {
            key: self.key.clone(),
            value: self.value.clone(),
            counter: self.counter,
            created_at: self.created_at,
            last_used_at: self.last_used_at,
        }
    }
}

impl<K, V> NodeRecord<K, V> {
    /// Consumes the record into the notification payload.
    pub fn into_evicted(self, reason: EvictionReason, evicted_at: DateTime<Utc>) -> EvictedEntry<K, V> {
        EvictedEntry {
            key: self.key,
            value: self.value,
            counter: self.counter,
            created_at: self.created_at,
            last_used_at: self.last_used_at,
            evicted_at,
            reason,
        }
    }
}

// == Cache Entry ==
/// Read snapshot of a live entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<K, V> {
    pub key: K,
    pub value: V,
    /// Number of policy touches: successful `get`s under LRA, `set`
    /// refreshes under LRI
    pub counter: i64,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

// == Evicted Entry ==
/// Notification payload delivered to the eviction sink, one per
/// eviction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvictedEntry<K, V> {
    pub key: K,
    pub value: V,
    pub counter: i64,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub evicted_at: DateTime<Utc>,
    pub reason: EvictionReason,
}
