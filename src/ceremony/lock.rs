//! Navigation lock
//!
//! A transition acquires the lock by compare-and-swap and holds it until
//! the settle timer releases it. Any navigation request arriving while the
//! lock is held is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "transition in progress" flag.
#[derive(Debug, Clone, Default)]
pub struct NavigationLock {
    held: Arc<AtomicBool>,
}

impl NavigationLock {
    /// Creates an unlocked lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to take the lock.
    ///
    /// Returns `None` when a transition already holds it. The returned guard
    /// releases the lock on drop unless [`TransitionGuard::hold`] is called.
    #[must_use]
    pub fn try_acquire(&self) -> Option<TransitionGuard> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TransitionGuard {
                lock: self.clone(),
                committed: false,
            })
    }

    /// Whether a transition currently holds the lock.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// Clears the lock.
    pub fn release(&self) {
        self.held.store(false, Ordering::Release);
    }
}

/// Lock acquisition in progress.
///
/// Dropping an uncommitted guard releases the lock, so an early return out
/// of a transition never leaves navigation locked.
#[derive(Debug)]
pub struct TransitionGuard {
    lock: NavigationLock,
    committed: bool,
}

impl TransitionGuard {
    /// Keeps the lock held past the guard; the settle timer releases it.
    pub fn hold(mut self) {
        self.committed = true;
    }
}

impl Drop for TransitionGuard {
    fn drop(&mut self) {
        if !self.committed {
            self.lock.release();
        }
    }
}
