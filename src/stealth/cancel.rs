//! Cooperative cancellation for multi-step behaviors

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::StealthError;

/// Shared stop flag checked between discrete steps
///
/// Clones observe the same flag, so a workflow can hand one clone to the
/// engine and keep another to stop it from a different thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that running behaviors stop at their next checkpoint
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Checkpoint: `Err(Cancelled)` once cancellation was requested
    pub fn check(&self) -> Result<(), StealthError> {
        if self.is_cancelled() {
            Err(StealthError::Cancelled)
        } else {
            Ok(())
        }
    }
}
