//! Broadcast wait channel for "stock may have changed" events.
//!
//! Waiters never learn *what* changed: every wake is a hint to go back and
//! re-check their own condition under the catalog lock. A generation
//! counter closes the window between dropping the catalog lock and starting
//! to wait, so a broadcast sent in that window is not lost.
//!
//! Threads wait on a condvar. Async callers wait on a `watch` channel that
//! mirrors the same generation, so they hold no thread while suspended.

use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use tokio::sync::watch;

#[derive(Debug)]
pub struct StockMonitor {
    generation: Mutex<u64>,
    cond: Condvar,
    changes: watch::Sender<u64>,
}

impl Default for StockMonitor {
    fn default() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            generation: Mutex::new(0),
            cond: Condvar::new(),
            changes,
        }
    }
}

impl StockMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation. Read it while still holding the catalog lock,
    /// then pass it to [`StockMonitor::wait_past`] after releasing it.
    pub fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Blocks until a broadcast newer than `seen` has happened.
    ///
    /// Returns `false` if `deadline` passed first. Spurious condvar wakes
    /// are absorbed here; irrelevant broadcasts are not, callers re-check.
    pub fn wait_past(&self, seen: u64, deadline: Option<Instant>) -> bool {
        let mut generation = self.generation.lock();
        while *generation == seen {
            match deadline {
                None => self.cond.wait(&mut generation),
                Some(deadline) => {
                    if self.cond.wait_until(&mut generation, deadline).timed_out() {
                        return *generation != seen;
                    }
                }
            }
        }
        true
    }

    /// Async counterpart of [`StockMonitor::wait_past`].
    pub async fn changed_past(&self, seen: u64, deadline: Option<Instant>) -> bool {
        let mut changes = self.changes.subscribe();
        let changed = changes.wait_for(|generation| *generation != seen);
        match deadline {
            None => changed.await.is_ok(),
            Some(deadline) => matches!(
                tokio::time::timeout_at(deadline.into(), changed).await,
                Ok(Ok(_))
            ),
        }
    }

    /// Wakes every waiter.
    pub fn notify_all(&self) {
        let mut generation = self.generation.lock();
        *generation = generation.wrapping_add(1);
        self.changes.send_replace(*generation);
        self.cond.notify_all();
    }
}
