//! Lock diagnostics.
//!
//! Advisory only. Every answer here describes a single instant and can be
//! stale before the caller looks at it.

use crate::{
    models::diagnostics::{DeadlockReport, DeadlockStatus, LockSnapshot, LockStatus},
    repository::{resources::Resource, Repository},
};

const DEADLOCK_NOTE: &str =
    "heuristic: all three resources busy at once; no wait-for graph is built";

#[derive(Clone)]
pub struct DiagnosticsService {
    repository: Repository,
}

impl DiagnosticsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Probe the catalog write lock without queueing.
    ///
    /// A successful probe holds the lock for an instant, so a concurrent
    /// borrow may see `Busy` because of it.
    pub fn lock_status(&self) -> LockStatus {
        match self.repository.shelf.try_write() {
            Some(probe) => {
                drop(probe);
                LockStatus::Free
            }
            None => LockStatus::Held,
        }
    }

    /// Report `Suspect` when catalog, accounts and stock wait are all busy.
    pub fn deadlock_check(&self) -> DeadlockReport {
        let resources = &self.repository.resources;
        let catalog_busy = resources.is_busy(Resource::Catalog);
        let ledger_busy = resources.is_busy(Resource::Accounts);
        let stock_wait_busy = resources.is_busy(Resource::StockWait);

        let status = if catalog_busy && ledger_busy && stock_wait_busy {
            tracing::warn!("Deadlock heuristic: every tracked resource is busy");
            DeadlockStatus::Suspect
        } else {
            DeadlockStatus::Clear
        };

        DeadlockReport {
            status,
            catalog_busy,
            ledger_busy,
            stock_wait_busy,
            note: DEADLOCK_NOTE.to_string(),
        }
    }

    pub fn lock_snapshot(&self) -> LockSnapshot {
        let counters = self.repository.shelf.counters();
        let resources = &self.repository.resources;
        LockSnapshot {
            active_readers: counters.active_readers,
            waiting_writers: counters.waiting_writers,
            writer_active: counters.writer_active,
            catalog_busy: resources.is_busy(Resource::Catalog),
            ledger_busy: resources.is_busy(Resource::Accounts),
            stock_waiters: resources.holders(Resource::StockWait),
        }
    }
}
