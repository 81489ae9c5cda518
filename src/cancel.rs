//! Cooperative cancellation for slice work.
//!
//! Slice pipelines run on the blocking pool, where a task that has started
//! cannot be aborted from outside. Instead every pipeline holds a clone of a
//! [`CancelFlag`] and checks it between encoding steps, returning
//! [`SliceError::Cancelled`] once it is set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::SliceError;

/// Shared cancellation flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder of this flag to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Checkpoint: `Err(SliceError::Cancelled)` once the flag is set.
    #[inline]
    pub fn check(&self) -> Result<(), SliceError> {
        if self.is_cancelled() {
            return Err(SliceError::Cancelled);
        }
        Ok(())
    }
}
