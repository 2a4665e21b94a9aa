//! Busy flags for the three shared resources.
//!
//! Each flag is a counter of sections currently in progress, so overlapping
//! holders do not clear each other's mark. Reads are relaxed snapshots.

use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// A catalog write section
    Catalog,
    /// The account registry
    Accounts,
    /// A borrow suspended on stock
    StockWait,
}

#[derive(Debug, Default)]
pub struct ResourceMonitor {
    catalog: AtomicUsize,
    accounts: AtomicUsize,
    stock_wait: AtomicUsize,
}

impl ResourceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, resource: Resource) -> &AtomicUsize {
        match resource {
            Resource::Catalog => &self.catalog,
            Resource::Accounts => &self.accounts,
            Resource::StockWait => &self.stock_wait,
        }
    }

    /// Marks `resource` busy until the returned guard is dropped.
    pub fn enter(&self, resource: Resource) -> BusyGuard<'_> {
        self.counter(resource).fetch_add(1, Ordering::AcqRel);
        BusyGuard {
            monitor: self,
            resource,
        }
    }

    pub fn holders(&self, resource: Resource) -> usize {
        self.counter(resource).load(Ordering::Acquire)
    }

    pub fn is_busy(&self, resource: Resource) -> bool {
        self.holders(resource) > 0
    }
}

pub struct BusyGuard<'a> {
    monitor: &'a ResourceMonitor,
    resource: Resource,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.monitor
            .counter(self.resource)
            .fetch_sub(1, Ordering::AcqRel);
    }
}
