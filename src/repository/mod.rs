//! Shared in-memory state for circulation
//!
//! One [`Repository`] is created per process and cloned (cheaply, by `Arc`)
//! into every service. The catalog and the loan ledger sit behind the same
//! writer-preferring lock so that stock counts and ledger entries change in
//! one critical section.

pub mod accounts;
pub mod items;
pub mod loans;
pub mod resources;

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard, StockMonitor};

use self::{
    accounts::AccountRegistry,
    items::Catalog,
    loans::LoanLedger,
    resources::{BusyGuard, Resource, ResourceMonitor},
};

/// Everything guarded by the catalog lock
#[derive(Debug, Default)]
pub struct Shelf {
    pub catalog: Catalog,
    pub ledger: LoanLedger,
}

/// Main repository struct holding the shared state handles
#[derive(Clone, Default)]
pub struct Repository {
    pub shelf: Arc<RwLock<Shelf>>,
    pub accounts: Arc<Mutex<AccountRegistry>>,
    pub stock: Arc<StockMonitor>,
    pub resources: Arc<ResourceMonitor>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_shelf(&self) -> RwLockReadGuard<'_, Shelf> {
        self.shelf.read()
    }

    /// Blocking write access, marked busy for diagnostics while held.
    pub fn write_shelf(&self) -> ShelfWriteGuard<'_> {
        let guard = self.shelf.write();
        ShelfWriteGuard {
            guard,
            _busy: self.resources.enter(Resource::Catalog),
        }
    }

    /// Write access only if it is free right now.
    pub fn try_write_shelf(&self) -> Option<ShelfWriteGuard<'_>> {
        let guard = self.shelf.try_write()?;
        Some(ShelfWriteGuard {
            guard,
            _busy: self.resources.enter(Resource::Catalog),
        })
    }

    pub fn accounts(&self) -> AccountsGuard<'_> {
        let guard = self.accounts.lock();
        AccountsGuard {
            guard,
            _busy: self.resources.enter(Resource::Accounts),
        }
    }
}

pub struct ShelfWriteGuard<'a> {
    guard: RwLockWriteGuard<'a, Shelf>,
    _busy: BusyGuard<'a>,
}

impl Deref for ShelfWriteGuard<'_> {
    type Target = Shelf;

    fn deref(&self) -> &Shelf {
        &self.guard
    }
}

impl DerefMut for ShelfWriteGuard<'_> {
    fn deref_mut(&mut self) -> &mut Shelf {
        &mut self.guard
    }
}

pub struct AccountsGuard<'a> {
    guard: MutexGuard<'a, AccountRegistry>,
    _busy: BusyGuard<'a>,
}

impl Deref for AccountsGuard<'_> {
    type Target = AccountRegistry;

    fn deref(&self) -> &AccountRegistry {
        &self.guard
    }
}

impl DerefMut for AccountsGuard<'_> {
    fn deref_mut(&mut self) -> &mut AccountRegistry {
        &mut self.guard
    }
}
