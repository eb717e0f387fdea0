//! Property-Based Tests for the Cache Core
//!
//! Uses proptest to verify the structural and counting invariants over
//! randomized operation sequences, for both recency policies.

use proptest::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use crate::cache::store::CacheStore;
use crate::config::{Config, EvictionPolicy};

// == Test Configuration ==
const BOUND: usize = 8;
const LONG_TTL: Duration = Duration::from_secs(3600);

// == Strategies ==
/// Small key space to force collisions, refreshes and duplicate hits
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-f]{1}".prop_map(|s| s)
}

/// Operations exercised against the store
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: u32 },
    SetBackdated { key: String, value: u32 },
    Get { key: String },
    Delete { key: String },
    Keys,
    Sweep,
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        5 => (key_strategy(), any::<u32>()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        2 => (key_strategy(), any::<u32>())
            .prop_map(|(key, value)| CacheOp::SetBackdated { key, value }),
        4 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => Just(CacheOp::Keys),
        1 => Just(CacheOp::Sweep),
        1 => Just(CacheOp::Clear),
    ]
}

fn apply(store: &mut CacheStore<String, u32>, op: CacheOp) {
    let backdated = Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap();
    match op {
        CacheOp::Set { key, value } => {
            let _ = store.set(key, value, None);
        }
        CacheOp::SetBackdated { key, value } => {
            let _ = store.set(key, value, Some(backdated));
        }
        CacheOp::Get { key } => {
            let _ = store.get(&key);
        }
        CacheOp::Delete { key } => {
            let _ = store.delete(&key);
        }
        CacheOp::Keys => {
            let _ = store.keys();
        }
        CacheOp::Sweep => {
            let _ = store.sweep_expired();
        }
        CacheOp::Clear => store.clear(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The index and the recency list always describe the same
    // population, and the population never exceeds the bound.
    #[test]
    fn prop_structural_invariants_hold(
        ops in prop::collection::vec(cache_op_strategy(), 1..60),
        lri in any::<bool>(),
    ) {
        let policy = if lri { EvictionPolicy::Lri } else { EvictionPolicy::Lra };
        let mut store: CacheStore<String, u32> =
            CacheStore::new(Config::new(BOUND, LONG_TTL).policy(policy));

        for op in ops {
            apply(&mut store, op);
            store.check_invariants();
        }
    }

    // With an effectively infinite TTL and bound N, population <= N
    // after any sequence of inserts.
    #[test]
    fn prop_population_respects_bound(keys in prop::collection::vec(key_strategy(), 1..100)) {
        let mut store: CacheStore<String, u32> =
            CacheStore::new(Config::new(3, LONG_TTL).policy(EvictionPolicy::Lri));

        for (i, key) in keys.into_iter().enumerate() {
            store.set(key, i as u32, None).unwrap();
            prop_assert!(store.len() <= 3);
        }
    }

    // LRA: the counter equals the number of successful gets since the
    // key was inserted.
    #[test]
    fn prop_lra_counter_counts_gets(gets in 1usize..20) {
        let mut store: CacheStore<String, u32> =
            CacheStore::new(Config::new(BOUND, LONG_TTL));
        store.set("k".to_string(), 0, None).unwrap();

        let mut last = 0;
        for _ in 0..gets {
            last = store.get(&"k".to_string()).unwrap().counter;
        }
        prop_assert_eq!(last, gets as i64);
    }

    // LRI: the counter after k consecutive in-TTL sets of one key is k.
    #[test]
    fn prop_lri_counter_counts_sets(sets in 1usize..20) {
        let mut store: CacheStore<String, u32> =
            CacheStore::new(Config::new(BOUND, LONG_TTL).policy(EvictionPolicy::Lri));

        for _ in 0..sets {
            store.set("k".to_string(), 0, None).unwrap();
        }
        prop_assert_eq!(store.get(&"k".to_string()).unwrap().counter, sets as i64);
    }

    // Export / clear / import reproduces the same key set in the same
    // recency order.
    #[test]
    fn prop_state_round_trip(keys in prop::collection::vec(key_strategy(), 1..40)) {
        let mut store: CacheStore<String, u32> =
            CacheStore::new(Config::new(0, LONG_TTL).policy(EvictionPolicy::Lri));
        for (i, key) in keys.into_iter().enumerate() {
            store.set(key, i as u32, None).unwrap();
        }

        let exported = store.state();
        let order_before: Vec<String> =
            exported.entries.iter().map(|e| e.key.clone()).collect();

        store.clear();
        store.set_state(exported).unwrap();
        store.check_invariants();

        let order_after: Vec<String> =
            store.state().entries.iter().map(|e| e.key.clone()).collect();
        prop_assert_eq!(order_after, order_before);

        let key_set: HashSet<String> = store.keys().into_iter().collect();
        let expected: HashSet<String> =
            store.state().entries.iter().map(|e| e.key.clone()).collect();
        prop_assert_eq!(key_set, expected);
    }

    // Every eviction produces exactly one notification; clears produce
    // none.
    #[test]
    fn prop_notifications_match_evictions(
        ops in prop::collection::vec(cache_op_strategy(), 1..60),
        lri in any::<bool>(),
    ) {
        let policy = if lri { EvictionPolicy::Lri } else { EvictionPolicy::Lra };
        let (tx, rx) = crossbeam_channel::unbounded();
        let config = Config::new(BOUND, LONG_TTL).policy(policy).eviction_sink(tx);
        let mut store: CacheStore<String, u32> = CacheStore::new(config);

        for op in ops {
            apply(&mut store, op);
        }

        let notified = rx.try_iter().count() as u64;
        prop_assert_eq!(notified, store.stats().evictions);
    }

    // `has` mirrors raw index membership, ignoring expiry.
    #[test]
    fn prop_has_ignores_expiry(keys in prop::collection::vec(key_strategy(), 1..20)) {
        let backdated = Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap();
        let mut store: CacheStore<String, u32> =
            CacheStore::new(Config::new(0, Duration::from_millis(1)).policy(EvictionPolicy::Lri));

        for key in &keys {
            store.set(key.clone(), 1, Some(backdated)).unwrap();
        }
        // All entries are long expired, yet still indexed
        for key in &keys {
            prop_assert!(store.has(key));
        }

        store.sweep_expired();
        for key in &keys {
            prop_assert!(!store.has(key));
        }
    }
}
