//! Reentrant mutual exclusion.
//!
//! [`ReentrantLock`] lets a single owning thread re-acquire the lock it
//! already holds without deadlocking. This is a structural requirement of
//! the serialization engine, not an optimization: operations on an object
//! hold the object's lock, and nested serializable fields re-enter the
//! engine, and their own locks, from the same thread. The hold count is
//! explicit (owner thread id plus depth) rather than relying on a native
//! recursive mutex, which most platforms' std primitive is not.
//!
//! Only locks along a containment path ever nest: a parent object's lock is
//! held while its nested field serializes under the child's lock. Rust
//! ownership makes that containment graph a tree, so the acquisition order
//! is globally consistent and cannot deadlock.
//!
//! Acquisition comes in an unbounded form ([`ReentrantLock::lock`]) and a
//! microsecond-bounded form ([`ReentrantLock::try_lock_for`]) that reports
//! timeout as a plain `false` rather than blocking forever.

use std::sync::{Condvar, Mutex, PoisonError};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

#[derive(Default)]
struct HoldState {
    owner: Option<ThreadId>,
    holds: u32,
}

/// A mutex a single owning thread may re-acquire without deadlock.
///
/// Explicit lock/unlock calls must balance; prefer the RAII forms
/// [`ReentrantLock::guard`] and [`ReentrantLock::try_guard`], which release
/// on drop even across early returns.
#[derive(Default)]
pub struct ReentrantLock {
    state: Mutex<HoldState>,
    released: Condvar,
}

impl ReentrantLock {
    /// Creates an unlocked lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock, waiting without bound.
    ///
    /// If the calling thread already holds the lock, the hold count is
    /// incremented and the call returns immediately.
    pub fn lock(&self) {
        let me = thread::current().id();
        let mut state = self.state_guard();
        if state.owner == Some(me) {
            state.holds += 1;
            return;
        }
        while state.owner.is_some() {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.owner = Some(me);
        state.holds = 1;
    }

    /// Acquires the lock, waiting at most `wait_us` microseconds.
    ///
    /// Returns `false` on timeout, leaving the lock untouched. Reentrant
    /// acquisition by the holding thread always succeeds immediately.
    pub fn try_lock_for(&self, wait_us: u64) -> bool {
        let me = thread::current().id();
        let deadline = Instant::now() + Duration::from_micros(wait_us);
        let mut state = self.state_guard();
        if state.owner == Some(me) {
            state.holds += 1;
            return true;
        }
        while state.owner.is_some() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _timeout) = self
                .released
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
        state.owner = Some(me);
        state.holds = 1;
        true
    }

    /// Releases one hold on the lock.
    ///
    /// Returns `false`, without touching the lock, if the calling thread
    /// is not the current owner. The lock becomes available to other
    /// threads only when the hold count of the owner reaches zero.
    pub fn unlock(&self) -> bool {
        let me = thread::current().id();
        let mut state = self.state_guard();
        if state.owner != Some(me) {
            return false;
        }
        state.holds -= 1;
        if state.holds == 0 {
            state.owner = None;
            drop(state);
            self.released.notify_all();
        }
        true
    }

    /// Acquires the lock (unbounded wait) and returns a guard releasing it
    /// on drop.
    pub fn guard(&self) -> ReentrantGuard<'_> {
        self.lock();
        ReentrantGuard { lock: self }
    }

    /// Bounded-wait variant of [`ReentrantLock::guard`]; `None` on timeout.
    pub fn try_guard(&self, wait_us: u64) -> Option<ReentrantGuard<'_>> {
        if self.try_lock_for(wait_us) {
            Some(ReentrantGuard { lock: self })
        } else {
            None
        }
    }

    fn state_guard(&self) -> std::sync::MutexGuard<'_, HoldState> {
        // A poisoned state mutex only ever guards two plain words; the
        // invariant cannot be torn, so recover the inner value.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ReentrantLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state_guard();
        f.debug_struct("ReentrantLock")
            .field("locked", &state.owner.is_some())
            .field("holds", &state.holds)
            .finish()
    }
}

/// RAII handle for one hold on a [`ReentrantLock`].
#[derive(Debug)]
pub struct ReentrantGuard<'a> {
    lock: &'a ReentrantLock,
}

impl Drop for ReentrantGuard<'_> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}
