//! Shared Cache Handle
//!
//! Thread-safe public surface. A `Cache` is a cheaply cloneable handle
//! over the store behind a single reader/writer lock; every public
//! operation acquires that lock for its full duration, so methods can
//! be called freely from any thread.
//!
//! Lock discipline: mutating operations (`set`, `delete`, `clear`,
//! `set_state`, the sweeping `keys`/`entries`, and `get` under LRA)
//! take the exclusive lock. Pure reads (`has`, `len`, `state`, `stats`)
//! take the shared lock. `get` under LRI starts on an upgradable read
//! and upgrades atomically only when it detects an expired entry, so
//! the node cannot be freed between the check and the eviction.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use crate::cache::store::{CacheStore, Lookup};
use crate::cache::{CacheEntry, CacheStats, State};
use crate::config::{Config, EvictionPolicy};
use crate::error::Result;
use crate::tasks::spawn_sweeper;

// == Cache ==
/// Thread-safe, time-aware bounded cache.
///
/// Entries expire once their `last_used_at` instant is older than the
/// configured TTL; a background sweeper thread collects them between
/// touches. On overflow the least recently touched entry is evicted,
/// where "touched" is defined by the configured [`EvictionPolicy`].
///
/// Cloning the handle shares the underlying cache.
pub struct Cache<K, V> {
    store: Arc<RwLock<CacheStore<K, V>>>,
    policy: EvictionPolicy,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty cache. The expiry sweeper starts lazily on the
    /// first `set`.
    pub fn new(config: Config<K, V>) -> Self {
        let policy = config.policy;
        Self {
            store: Arc::new(RwLock::new(CacheStore::new(config))),
            policy,
        }
    }

    // == Set ==
    /// Inserts a key-value pair stamped with the current time.
    ///
    /// Under LRA an existing key fails with
    /// [`DuplicateKey`](crate::CacheError::DuplicateKey); under LRI it
    /// refreshes the entry (recency, `last_used_at`, counter) while
    /// keeping its stored value. When the cache is full the least
    /// recently touched entry is evicted first.
    pub fn set(&self, key: K, value: V) -> Result<()> {
        self.set_inner(key, value, None)
    }

    /// Inserts like [`set`](Self::set), but stamps `last_used_at` with
    /// the supplied absolute instant. Backdating past the TTL makes the
    /// entry expired on its next touch or sweep.
    pub fn set_at(&self, key: K, value: V, timestamp: DateTime<Utc>) -> Result<()> {
        self.set_inner(key, value, Some(timestamp))
    }

    fn set_inner(&self, key: K, value: V, timestamp: Option<DateTime<Utc>>) -> Result<()> {
        let mut store = self.store.write();
        if !store.sweeper_running() {
            let guard = spawn_sweeper(Arc::downgrade(&self.store), store.gc_interval());
            store.install_sweeper(guard);
        }
        store.set(key, value, timestamp)
    }

    // == Get ==
    /// Looks up a key, enforcing TTL: an expired entry is evicted and
    /// reported as absent. Under LRA a hit counts as a touch (counter,
    /// `last_used_at`, recency); under LRI a hit observes without
    /// disturbing anything.
    pub fn get(&self, key: &K) -> Option<CacheEntry<K, V>> {
        match self.policy {
            EvictionPolicy::Lra => self.store.write().get(key),
            EvictionPolicy::Lri => {
                let store = self.store.upgradable_read();
                match store.peek(key) {
                    Lookup::Hit(entry) => Some(entry),
                    Lookup::Miss => None,
                    Lookup::Expired => {
                        let mut store = RwLockUpgradableReadGuard::upgrade(store);
                        store.get(key)
                    }
                }
            }
        }
    }

    // == Delete ==
    /// Removes an entry if present, emitting a `Deleted` notification.
    /// Returns whether an entry was removed.
    pub fn delete(&self, key: &K) -> bool {
        self.store.write().delete(key)
    }

    // == Has ==
    /// Index-only existence check. Does NOT consult the TTL and never
    /// evicts, so an expired-but-unswept key still reports true. Use
    /// [`get`](Self::get) to skip expired entries.
    pub fn has(&self, key: &K) -> bool {
        self.store.read().has(key)
    }

    /// Current population, expired-but-unswept entries included.
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Keys ==
    /// Sweeps expired entries, then returns the live keys in
    /// unspecified order.
    pub fn keys(&self) -> Vec<K> {
        self.store.write().keys()
    }

    // == Entries ==
    /// Sweeps expired entries, then returns snapshots of the live
    /// contents in unspecified order.
    pub fn entries(&self) -> Vec<CacheEntry<K, V>> {
        self.store.write().entries()
    }

    // == Clear ==
    /// Drops every entry without notifications and stops the sweeper.
    /// A later `set` starts a fresh sweeper schedule.
    pub fn clear(&self) {
        self.store.write().clear();
    }

    // == State Export / Import ==
    /// Exports the contents in recency order, most recently touched
    /// first.
    pub fn state(&self) -> State<K, V> {
        self.store.read().state()
    }

    /// Replaces the contents with a previously exported state,
    /// preserving its order. Fails with
    /// [`PolicyMismatch`](crate::CacheError::PolicyMismatch) when the
    /// state was extracted under a different policy; the cache is then
    /// unchanged. Emits no notifications.
    pub fn set_state(&self, state: State<K, V>) -> Result<()> {
        self.store.write().set_state(state)
    }

    // == Stats ==
    /// Snapshot of hit/miss/eviction counters and current population.
    pub fn stats(&self) -> CacheStats {
        self.store.read().stats()
    }

    /// The recency policy this cache was built with.
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }
}
