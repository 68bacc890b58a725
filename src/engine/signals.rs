//! Cross-thread run control
//!
//! Cancellation is a latch observed at frame checkpoints; pause is a gate
//! the frame loop blocks on between frames. Cancelling also releases the
//! gate, so a cancelled run never stays parked behind a pause.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Shared cancel/pause state for a pipeline run
#[derive(Debug, Default)]
pub struct RunControl {
    cancelled: AtomicBool,
    paused: Mutex<bool>,
    resumed: Condvar,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and release any pending pause
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        let mut paused = self.lock_paused();
        *paused = false;
        self.resumed.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Idempotent; takes effect at the next frame checkpoint
    pub fn pause(&self) {
        let mut paused = self.lock_paused();
        *paused = true;
    }

    /// Idempotent
    pub fn resume(&self) {
        let mut paused = self.lock_paused();
        *paused = false;
        self.resumed.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        *self.lock_paused()
    }

    /// Clear both signals so the handle can drive a fresh run
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
        let mut paused = self.lock_paused();
        *paused = false;
        self.resumed.notify_all();
    }

    /// Block while paused; wakes on resume or cancel
    pub fn wait_if_paused(&self) {
        let mut paused = self.lock_paused();
        while *paused {
            paused = self
                .resumed
                .wait(paused)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn lock_paused(&self) -> MutexGuard<'_, bool> {
        self.paused.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
