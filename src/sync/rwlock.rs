//! Writer-preferring reader/writer lock.
//!
//! Bookkeeping (active readers, queued writers, active writer) lives behind a
//! single `Mutex` and one `Condvar`. A queued writer blocks newly arriving
//! readers even when the protected value is not being mutated, which bounds
//! writer wait time. The cost is that a reader arriving behind a steady
//! stream of queued writers can be postponed indefinitely.

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct LockState {
    active_readers: usize,
    waiting_writers: usize,
    writer_active: bool,
}

/// Point-in-time copy of the lock bookkeeping.
///
/// Stale as soon as it is returned; only meant for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockCounters {
    pub active_readers: usize,
    pub waiting_writers: usize,
    pub writer_active: bool,
}

/// A blocking reader/writer lock with writer preference.
pub struct RwLock<T> {
    state: Mutex<LockState>,
    cond: Condvar,
    data: UnsafeCell<T>,
}

// SAFETY: `data` is only reached through a guard. Read guards coexist only
// with other read guards (requires `T: Sync`), a write guard is exclusive
// (requires `T: Send`).
unsafe impl<T: Send> Send for RwLock<T> {}
unsafe impl<T: Send + Sync> Sync for RwLock<T> {}

impl<T> RwLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            state: Mutex::new(LockState::default()),
            cond: Condvar::new(),
            data: UnsafeCell::new(value),
        }
    }

    /// Acquires shared access.
    ///
    /// Blocks while a writer is active or any writer is queued.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        let mut state = self.state.lock();
        while state.writer_active || state.waiting_writers > 0 {
            self.cond.wait(&mut state);
        }
        state.active_readers += 1;
        RwLockReadGuard { lock: self }
    }

    /// Acquires exclusive access.
    ///
    /// Registers as a waiting writer first, which alone stops new readers,
    /// then blocks until no reader and no writer is active.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        let mut state = self.state.lock();
        state.waiting_writers += 1;
        while state.writer_active || state.active_readers > 0 {
            self.cond.wait(&mut state);
        }
        state.waiting_writers -= 1;
        state.writer_active = true;
        RwLockWriteGuard { lock: self }
    }

    /// Acquires exclusive access only if it is immediately available.
    ///
    /// Never registers as a waiting writer, so neither a failed nor a
    /// successful probe holds back readers. Queued writers do not make the
    /// probe fail; only active readers or an active writer do.
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, T>> {
        let mut state = self.state.lock();
        if state.writer_active || state.active_readers > 0 {
            return None;
        }
        state.writer_active = true;
        Some(RwLockWriteGuard { lock: self })
    }

    pub fn counters(&self) -> LockCounters {
        let state = self.state.lock();
        LockCounters {
            active_readers: state.active_readers,
            waiting_writers: state.waiting_writers,
            writer_active: state.writer_active,
        }
    }

    fn release_read(&self) {
        let mut state = self.state.lock();
        state.active_readers -= 1;
        if state.active_readers == 0 {
            self.cond.notify_all();
        }
    }

    fn release_write(&self) {
        let mut state = self.state.lock();
        state.writer_active = false;
        self.cond.notify_all();
    }
}

impl<T: Default> Default for RwLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// RAII guard for shared access to an [`RwLock`].
pub struct RwLockReadGuard<'a, T> {
    lock: &'a RwLock<T>,
}

impl<T> Deref for RwLockReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: a read guard exists, so no writer does.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for RwLockReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

/// RAII guard for exclusive access to an [`RwLock`].
pub struct RwLockWriteGuard<'a, T> {
    lock: &'a RwLock<T>,
}

impl<T> Deref for RwLockWriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the write guard is exclusive.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for RwLockWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the write guard is exclusive.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for RwLockWriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}
