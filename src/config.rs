//! Configuration Module
//!
//! Cache construction options: population bound, TTL, eviction policy,
//! sweeper cadence and the optional eviction sink.

use std::fmt;
use std::time::Duration;

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

use crate::cache::EvictedEntry;

// == Defaults ==
/// Sweeper cadence used when `gc_interval` is unset or zero.
pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(10);

// == Eviction Policy ==
/// Recency policy selecting which operations refresh an entry.
///
/// - `Lra` (Least Recently Accessed): recency and counter advance on
///   successful `get`; `set` on an existing key is an error.
/// - `Lri` (Least Recently Inserted): recency and counter advance on
///   `set` of an existing key; `get` is a pure observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvictionPolicy {
    #[default]
    #[serde(rename = "LRA")]
    Lra,
    #[serde(rename = "LRI")]
    Lri,
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Lra => write!(f, "LRA"),
            EvictionPolicy::Lri => write!(f, "LRI"),
        }
    }
}

// == Config ==
/// Cache construction options.
///
/// `max_size` of `0` disables the population bound. A `gc_interval` of
/// zero falls back to [`DEFAULT_GC_INTERVAL`].
///
/// The eviction sink, when set, receives one [`EvictedEntry`] per
/// eviction. Sends happen while the cache lock is held and block when
/// the channel is bounded and full, so a slow consumer back-pressures
/// writers. Callers wanting non-blocking behavior should supply a
/// channel with enough capacity.
#[derive(Debug, Clone)]
pub struct Config<K, V> {
    /// Upper bound on live entries; `0` disables the bound
    pub max_size: usize,
    /// Maximum age of `last_used_at` before an entry is expired
    pub ttl: Duration,
    /// Recency policy
    pub policy: EvictionPolicy,
    /// Sweeper cadence; zero means the default
    pub gc_interval: Duration,
    /// Optional output channel for eviction records
    pub eviction_sink: Option<Sender<EvictedEntry<K, V>>>,
}

impl<K, V> Config<K, V> {
    // == Constructor ==
    /// Creates a Config with the given bound and TTL; LRA policy and
    /// default sweeper cadence.
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            max_size,
            ttl,
            policy: EvictionPolicy::default(),
            gc_interval: DEFAULT_GC_INTERVAL,
            eviction_sink: None,
        }
    }

    /// Selects the eviction policy.
    pub fn policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overrides the sweeper cadence.
    pub fn gc_interval(mut self, interval: Duration) -> Self {
        self.gc_interval = interval;
        self
    }

    /// Attaches an eviction sink.
    pub fn eviction_sink(mut self, sink: Sender<EvictedEntry<K, V>>) -> Self {
        self.eviction_sink = Some(sink);
        self
    }

    /// Sweeper cadence with the zero-means-default rule applied.
    pub(crate) fn effective_gc_interval(&self) -> Duration {
        if self.gc_interval.is_zero() {
            DEFAULT_GC_INTERVAL
        } else {
            self.gc_interval
        }
    }
}
