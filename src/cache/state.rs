//! State Export/Import Module
//!
//! Serializable point-in-time image of the cache contents, ordered most
//! recently touched first. Durability of the document is the caller's
//! problem; the cache only produces and consumes the in-memory form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EvictionPolicy;

// == State Entry ==
/// One exported entry, mirroring the internal node record without its
/// list linkage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateEntry<K, V> {
    pub key: K,
    pub value: V,
    pub counter: i64,
    pub last_used_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// == State ==
/// Exported cache image.
///
/// `entries` is ordered head to tail (MRU first); `set_state` preserves
/// that order when rebuilding the recency list. A state can only be
/// imported into a cache running the same policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State<K, V> {
    pub entries: Vec<StateEntry<K, V>>,
    pub policy: EvictionPolicy,
    pub extracted_at: DateTime<Utc>,
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_json_round_trip() {
        let now = Utc::now();
        let state = State {
            entries: vec![StateEntry {
                key: "a".to_string(),
                value: 1u32,
                counter: 2,
                last_used_at: now,
                created_at: now,
            }],
            policy: EvictionPolicy::Lri,
            extracted_at: now,
        };

        let json = serde_json::to_string(&state).unwrap();
        let back: State<String, u32> = serde_json::from_str(&json).unwrap();

        assert_eq!(back.policy, EvictionPolicy::Lri);
        assert_eq!(back.entries.len(), 1);
        assert_eq!(back.entries[0].key, "a");
        assert_eq!(back.entries[0].value, 1);
        assert_eq!(back.entries[0].counter, 2);
        assert_eq!(back.extracted_at, now);
    }

    #[test]
    fn test_state_serializes_policy_wire_name() {
        let state: State<String, u32> = State {
            entries: Vec::new(),
            policy: EvictionPolicy::Lra,
            extracted_at: Utc::now(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["policy"], "LRA");
    }
}
