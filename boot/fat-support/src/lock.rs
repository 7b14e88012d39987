//! Lock Shim
//!
//! The FAT library's host interface expects mutual-exclusion primitives
//! because its usual home schedules more than one thread through the
//! volume. The boot environment runs a single thread with no preemption
//! and no interrupt re-entry, so the lock handed out here does nothing.
//! The capability trait keeps the shape: a host with real concurrency
//! supplies a real implementation without touching callers.

use spin::Mutex;

/// Mutual-exclusion capability consumed by the FAT library
pub trait MutualExclusion {
    /// Enter the critical section
    fn acquire(&self);
    /// Leave the critical section
    fn release(&self);
}

/// Inert lock for the single-threaded boot environment
///
/// Creation never fails and destruction is ordinary drop.
#[derive(Debug, Default, Clone, Copy)]
pub struct BootLock;

impl MutualExclusion for BootLock {
    fn acquire(&self) {}

    fn release(&self) {}
}

/// Create a lock for the FAT library
pub fn fat_create_lock() -> BootLock {
    BootLock
}

/// Spin-backed lock for hosts that do run concurrent threads
///
/// Matches the acquire/release call shape of the interface rather than
/// RAII guards: `acquire` leaks the guard and `release` hands the lock
/// back directly.
#[derive(Debug, Default)]
pub struct SpinHostLock {
    inner: Mutex<()>,
}

impl SpinHostLock {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(()),
        }
    }

    /// Check whether the lock is currently held
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

impl MutualExclusion for SpinHostLock {
    fn acquire(&self) {
        core::mem::forget(self.inner.lock());
    }

    fn release(&self) {
        // Safety: acquire leaked the guard, so the mutex is held and no
        // guard remains to unlock it on drop.
        unsafe { self.inner.force_unlock() }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_lock_is_inert() {
        let lock = fat_create_lock();
        lock.acquire();
        lock.acquire();
        lock.release();
        lock.release();
    }

    #[test]
    fn test_spin_lock_excludes() {
        let lock = SpinHostLock::new();
        assert!(!lock.is_locked());
        lock.acquire();
        assert!(lock.is_locked());
        lock.release();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_lock_through_capability_trait() {
        fn exercise(lock: &dyn MutualExclusion) {
            lock.acquire();
            lock.release();
        }

        exercise(&BootLock);
        exercise(&SpinHostLock::new());
    }
}
