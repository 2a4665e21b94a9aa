//! Synchronization primitives used by the circulation core

pub mod monitor;
pub mod rwlock;

pub use monitor::StockMonitor;
pub use rwlock::{LockCounters, RwLock, RwLockReadGuard, RwLockWriteGuard};
