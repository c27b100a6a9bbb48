//! Error types for the actuation queue and discovery.

use thiserror::Error;

/// Errors that can occur while queueing or discovering actuations.
///
/// Execution failures of individual requests are never returned here: the
/// queue logs and drops them.
#[derive(Debug, Error)]
pub enum ActuationError {
    /// The batch was collected before the queue was last cleared.
    #[error("stale batch: started in epoch {batch_epoch}, queue is at {current_epoch}")]
    StaleBatch {
        batch_epoch: u64,
        current_epoch: u64,
    },

    /// An exclusive batch was offered while requests are still pending.
    #[error("queue busy: {pending} requests still pending")]
    QueueBusy { pending: usize },

    /// Discovery was cancelled.
    #[error("discovery cancelled")]
    Cancelled,

    /// A probe task panicked or was aborted.
    #[error("probe task failed: {0}")]
    ProbeTask(String),
}

/// Result type for actuation operations.
pub type Result<T> = std::result::Result<T, ActuationError>;
