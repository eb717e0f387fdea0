//! Cache Store Module
//!
//! Single-threaded cache engine combining the key index with the
//! recency list: policy behavior for set/get/delete, size-bound
//! enforcement, TTL expiry, state export/import and eviction emission.
//! Thread safety is layered on top by [`crate::cache::Cache`], which
//! owns this store behind a reader/writer lock.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use crossbeam_channel::Sender;
use tracing::debug;

use crate::cache::{
    CacheEntry, CacheStats, EvictedEntry, EvictionReason, NodeRecord, RecencyList, State,
    StateEntry, StatsCounters,
};
use crate::config::{Config, EvictionPolicy};
use crate::error::{CacheError, Result};
use crate::tasks::SweeperGuard;

// == Lookup Outcome ==
/// Result of a read-only probe, used by the LRI `get` path to decide
/// whether a lock upgrade is needed.
pub(crate) enum Lookup<K, V> {
    Miss,
    Expired,
    Hit(CacheEntry<K, V>),
}

// == Cache Store ==
/// Cache engine: key index, recency list, policy logic and eviction
/// emission. All methods assume the caller already holds the
/// appropriate lock.
pub(crate) struct CacheStore<K, V> {
    /// Key to recency-list handle
    index: HashMap<K, usize>,
    /// Intrusive recency order, head = most recently touched
    list: RecencyList<NodeRecord<K, V>>,
    max_size: usize,
    ttl: TimeDelta,
    policy: EvictionPolicy,
    gc_interval: Duration,
    sink: Option<Sender<EvictedEntry<K, V>>>,
    stats: StatsCounters,
    /// Live sweeper handle; `None` while idle. Dropping the guard stops
    /// the sweeper thread within one tick.
    sweeper: Option<SweeperGuard>,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    // == Constructor ==
    pub fn new(config: Config<K, V>) -> Self {
        Self {
            index: HashMap::new(),
            list: RecencyList::new(),
            max_size: config.max_size,
            // A TTL too large for the signed representation means "never expires"
            ttl: TimeDelta::from_std(config.ttl).unwrap_or(TimeDelta::MAX),
            policy: config.policy,
            gc_interval: config.effective_gc_interval(),
            sink: config.eviction_sink,
            stats: StatsCounters::default(),
            sweeper: None,
        }
    }

    fn expired(&self, last_used_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(last_used_at) > self.ttl
    }

    // == Set ==
    /// Inserts or (LRI only) refreshes an entry.
    ///
    /// A provided `timestamp` is stored as the absolute `last_used_at`
    /// instant; backdating it past the TTL makes the entry expired on
    /// its next touch or sweep.
    pub fn set(&mut self, key: K, value: V, timestamp: Option<DateTime<Utc>>) -> Result<()> {
        let now = Utc::now();
        let last_used_at = timestamp.unwrap_or(now);

        if let Some(&idx) = self.index.get(&key) {
            if self.policy == EvictionPolicy::Lra {
                return Err(CacheError::DuplicateKey(format!("{key:?}")));
            }
            // LRI refresh: the counter only advances if the entry was
            // still live relative to its prior last-used instant.
            let prior = self.list.get(idx).last_used_at;
            let was_live = !self.expired(prior, now);
            let record = self.list.get_mut(idx);
            if was_live {
                record.counter += 1;
            }
            record.last_used_at = last_used_at;
            self.list.move_to_front(idx);
            return Ok(());
        }

        if self.max_size > 0 && self.index.len() == self.max_size {
            if let Some(victim) = self.list.back() {
                let reason = if self.expired(self.list.get(victim).last_used_at, now) {
                    EvictionReason::Expired
                } else {
                    EvictionReason::Dropped
                };
                self.evict(victim, reason, now);
            }
        }

        let counter = match self.policy {
            EvictionPolicy::Lra => 0,
            EvictionPolicy::Lri => 1,
        };
        let idx = self.list.push_front(NodeRecord {
            key: key.clone(),
            value,
            counter,
            created_at: now,
            last_used_at,
        });
        self.index.insert(key, idx);
        Ok(())
    }

    // == Get ==
    /// Looks up a key, enforcing TTL. Under LRA a hit also advances the
    /// counter, stamps `last_used_at` and moves the node to the front;
    /// under LRI a hit is a pure observation.
    pub fn get(&mut self, key: &K) -> Option<CacheEntry<K, V>> {
        let now = Utc::now();
        let Some(&idx) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if self.expired(self.list.get(idx).last_used_at, now) {
            self.evict(idx, EvictionReason::Expired, now);
            self.stats.record_miss();
            return None;
        }

        if self.policy == EvictionPolicy::Lra {
            let record = self.list.get_mut(idx);
            record.counter += 1;
            record.last_used_at = now;
            self.list.move_to_front(idx);
        }
        self.stats.record_hit();
        Some(self.list.get(idx).snapshot())
    }

    // == Peek ==
    /// Read-only probe used by the LRI `get` fast path. An `Expired`
    /// outcome leaves stats untouched; the caller re-runs [`get`] under
    /// the exclusive lock, which evicts and records the miss.
    pub fn peek(&self, key: &K) -> Lookup<K, V> {
        let now = Utc::now();
        match self.index.get(key) {
            None => {
                self.stats.record_miss();
                Lookup::Miss
            }
            Some(&idx) => {
                let record = self.list.get(idx);
                if self.expired(record.last_used_at, now) {
                    Lookup::Expired
                } else {
                    self.stats.record_hit();
                    Lookup::Hit(record.snapshot())
                }
            }
        }
    }

    // == Delete ==
    /// Removes an entry, emitting a `Deleted` notification. Returns
    /// false (no-op) for an absent key.
    pub fn delete(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&idx) => {
                self.evict(idx, EvictionReason::Deleted, Utc::now());
                true
            }
            None => false,
        }
    }

    // == Has ==
    /// Pure index probe. Deliberately does NOT check TTL and never
    /// evicts: an expired-but-unswept key still reports true. Callers
    /// that must skip expired entries use [`get`].
    pub fn has(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Live population, expired-but-unswept entries included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Expiry Sweep ==
    /// Walks the list tail to head and evicts every expired node.
    ///
    /// Recency order is not expiry order once callers supply backdated
    /// timestamps, so the walk examines every node rather than stopping
    /// at the first live one.
    pub fn sweep_expired(&mut self) -> usize {
        let now = Utc::now();
        let mut removed = 0;
        let mut cursor = self.list.back();
        while let Some(idx) = cursor {
            cursor = self.list.prev(idx);
            if self.expired(self.list.get(idx).last_used_at, now) {
                self.evict(idx, EvictionReason::Expired, now);
                removed += 1;
            }
        }
        removed
    }

    // == Keys ==
    /// Sweeps expired entries, then snapshots the live key set.
    /// Order is unspecified.
    pub fn keys(&mut self) -> Vec<K> {
        self.sweep_expired();
        self.index.keys().cloned().collect()
    }

    // == Entries ==
    /// Sweeps expired entries, then snapshots the live contents.
    /// Order is unspecified.
    pub fn entries(&mut self) -> Vec<CacheEntry<K, V>> {
        self.sweep_expired();
        self.list.iter().map(NodeRecord::snapshot).collect()
    }

    // == Clear ==
    /// Drops all entries without notifications and stops the sweeper.
    pub fn clear(&mut self) {
        self.drop_nodes();
        if self.sweeper.take().is_some() {
            debug!("expiry sweeper stopping");
        }
    }

    // == Get State ==
    /// Exports the cache contents in recency order, most recently
    /// touched first.
    pub fn state(&self) -> State<K, V> {
        State {
            entries: self
                .list
                .iter()
                .map(|record| StateEntry {
                    key: record.key.clone(),
                    value: record.value.clone(),
                    counter: record.counter,
                    last_used_at: record.last_used_at,
                    created_at: record.created_at,
                })
                .collect(),
            policy: self.policy,
            extracted_at: Utc::now(),
        }
    }

    // == Set State ==
    /// Atomically replaces the contents with an exported state,
    /// preserving its MRU-first order. Emits no notifications. The
    /// sweeper phase is left as-is; a subsequent `set` (re)starts it.
    pub fn set_state(&mut self, state: State<K, V>) -> Result<()> {
        if state.policy != self.policy {
            return Err(CacheError::PolicyMismatch {
                expected: self.policy,
                found: state.policy,
            });
        }

        self.drop_nodes();
        for entry in state.entries {
            // A duplicated key keeps its last occurrence
            if let Some(old) = self.index.remove(&entry.key) {
                self.list.unlink(old);
            }
            let idx = self.list.push_back(NodeRecord {
                key: entry.key.clone(),
                value: entry.value,
                counter: entry.counter,
                created_at: entry.created_at,
                last_used_at: entry.last_used_at,
            });
            self.index.insert(entry.key, idx);
        }
        Ok(())
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.index.len())
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub fn gc_interval(&self) -> Duration {
        self.gc_interval
    }

    pub fn sweeper_running(&self) -> bool {
        self.sweeper.is_some()
    }

    pub fn install_sweeper(&mut self, guard: SweeperGuard) {
        self.sweeper = Some(guard);
    }

    // == Eviction ==
    /// Unlinks and unindexes a node, then emits exactly one
    /// notification. The send happens while the caller still holds the
    /// cache lock, so notifications preserve eviction order; a bounded,
    /// full sink blocks the operation until the consumer reads.
    fn evict(&mut self, idx: usize, reason: EvictionReason, now: DateTime<Utc>) {
        let record = self.list.unlink(idx);
        self.index.remove(&record.key);
        self.stats.record_eviction();
        debug!(key = ?record.key, ?reason, "evicted entry");
        if let Some(sink) = &self.sink {
            // A dropped receiver is not an error: evictions proceed silently
            let _ = sink.send(record.into_evicted(reason, now));
        }
    }

    fn drop_nodes(&mut self) {
        self.index.clear();
        self.list.clear();
    }

    // == Invariant Check (tests) ==
    /// Asserts the index and the list describe the same population.
    #[cfg(test)]
    pub fn check_invariants(&self) {
        assert_eq!(self.index.len(), self.list.len(), "index/list size mismatch");
        let mut reachable = 0;
        for record in self.list.iter() {
            let idx = self
                .index
                .get(&record.key)
                .copied()
                .expect("listed key missing from index");
            assert_eq!(&self.list.get(idx).key, &record.key, "stale index handle");
            reachable += 1;
        }
        assert_eq!(reachable, self.index.len(), "unreachable index entries");
        if self.max_size > 0 {
            assert!(self.index.len() <= self.max_size, "population over bound");
        }
    }
}
