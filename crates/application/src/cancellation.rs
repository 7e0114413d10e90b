use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mgmtctl_core::{AppError, AppResult};

/// Advisory interrupt flag checked between the steps of an operation.
///
/// Setting the flag never recalls a request that is already in flight.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// Creates a flag that is not set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails with [`AppError::Cancelled`] once cancellation was requested.
    pub fn ensure_active(&self, checkpoint: &str) -> AppResult<()> {
        if self.is_cancelled() {
            return Err(AppError::Cancelled(format!(
                "operation interrupted {checkpoint}"
            )));
        }

        Ok(())
    }
}
