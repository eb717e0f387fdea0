//! Expiry Sweeper Task
//!
//! Background thread that periodically evicts expired cache entries.
//!
//! The sweeper is started lazily by the first `set` so an empty cache
//! never wakes anything, and stopped by `clear` or cache teardown. The
//! stop signal is a channel disconnect observed by `recv_timeout`, so
//! the thread both paces its sweeps and shuts down within one tick. It
//! holds only a `Weak` reference to the store; dropping the last cache
//! handle ends the thread just as reliably as an explicit stop.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Weak;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::RwLock;
use tracing::debug;

use crate::cache::store::CacheStore;

// == Sweeper Guard ==
/// Handle to a running sweeper, held inside the store under the cache
/// lock. Dropping it disconnects the stop channel, which the thread
/// observes within one tick.
pub(crate) struct SweeperGuard {
    _stop_tx: Sender<()>,
}

// == Spawn ==
/// Spawns the sweeper thread with the given cadence.
pub(crate) fn spawn_sweeper<K, V>(
    store: Weak<RwLock<CacheStore<K, V>>>,
    interval: Duration,
) -> SweeperGuard
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let (stop_tx, stop_rx) = bounded(0);
    thread::Builder::new()
        .name("tlru-sweeper".to_string())
        .spawn(move || run(store, interval, stop_rx))
        .expect("failed to spawn expiry sweeper thread");

    SweeperGuard { _stop_tx: stop_tx }
}

fn run<K, V>(store: Weak<RwLock<CacheStore<K, V>>>, interval: Duration, stop_rx: Receiver<()>)
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    debug!(interval_ms = interval.as_millis() as u64, "expiry sweeper started");

    loop {
        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            // Stop requested or every cache handle dropped the guard
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }

        let Some(store) = store.upgrade() else {
            break;
        };
        let removed = store.write().sweep_expired();
        if removed > 0 {
            debug!(removed, "expiry sweep removed entries");
        }
    }

    debug!("expiry sweeper exited");
}
