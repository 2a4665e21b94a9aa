//! Lock diagnostic reports.
//!
//! Everything here is an instantaneous observation that may already be stale
//! when the caller reads it. None of it is used for correctness decisions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of probing the catalog write lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LockStatus {
    Free,
    Held,
}

/// Advisory "everything busy at once" signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeadlockStatus {
    Clear,
    Suspect,
}

/// Deadlock heuristic report.
///
/// `Suspect` only means the three tracked resources were busy at the same
/// instant. No wait-for graph is built, so real cycles are not detected.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeadlockReport {
    pub status: DeadlockStatus,
    pub catalog_busy: bool,
    pub ledger_busy: bool,
    pub stock_wait_busy: bool,
    pub note: String,
}

/// Raw lock counters and busy flags
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LockSnapshot {
    pub active_readers: usize,
    pub waiting_writers: usize,
    pub writer_active: bool,
    pub catalog_busy: bool,
    pub ledger_busy: bool,
    pub stock_waiters: usize,
}
