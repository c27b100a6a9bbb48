//! The actuation queue.
//!
//! Pending requests sit in a double-ended buffer that is only ever pushed and
//! popped at the tail, so the most recent request fires first. One request at
//! most is executed per tick, and only when the limiter admits it.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::actuator::{Actuation, Actuator};
use crate::error::{ActuationError, Result};
use crate::limiter::{Admission, RateLimitConfig, RateLimiter};
use crate::request::ActuationRequest;

/// Result of one [`ActuationQueue::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing was pending.
    Idle,
    /// The limiter denied admission; the queue is untouched.
    RateLimited { retry_after_ms: u64 },
    /// The request was applied.
    Executed(ActuationRequest),
    /// The target vanished; the request was dropped.
    TargetMissing(ActuationRequest),
    /// The actuator failed; the request was dropped.
    Failed(ActuationRequest),
}

/// Running totals for the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Requests accepted into the queue.
    pub enqueued: u64,
    /// Requests applied.
    pub executed: u64,
    /// Requests dropped because their target was gone.
    pub target_missing: u64,
    /// Requests dropped because the actuator failed.
    pub failed: u64,
    /// Requests discarded by [`ActuationQueue::clear`].
    pub discarded: u64,
    /// Ticks deferred by the limiter.
    pub rate_limited: u64,
}

impl QueueStats {
    /// Requests that had their one execution attempt.
    pub fn processed(&self) -> u64 {
        self.executed + self.target_missing + self.failed
    }
}

/// How [`ActuationQueue::accept_batch`] treats a busy queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// Append to whatever is pending.
    #[default]
    Append,
    /// Refuse while anything is still pending.
    Exclusive,
}

/// Requests proposed by a discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalBatch {
    /// Queue epoch the run started in.
    pub epoch: u64,
    /// Proposed requests, in candidate order.
    pub requests: Vec<ActuationRequest>,
    /// Probes that failed and contributed nothing.
    pub failed_probes: usize,
}

impl ProposalBatch {
    /// Number of proposed requests.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether nothing was proposed.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Rate-limited LIFO queue of actuation requests.
#[derive(Debug)]
pub struct ActuationQueue {
    pending: VecDeque<ActuationRequest>,
    limiter: RateLimiter,
    epoch: u64,
    stats: QueueStats,
}

impl ActuationQueue {
    /// Create an empty queue.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            pending: VecDeque::new(),
            limiter: RateLimiter::new(config),
            epoch: 0,
            stats: QueueStats::default(),
        }
    }

    /// Push a request at the tail.
    pub fn enqueue(&mut self, request: ActuationRequest) {
        self.pending.push_back(request);
        self.stats.enqueued += 1;
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The request the next admitted tick would execute.
    pub fn peek(&self) -> Option<&ActuationRequest> {
        self.pending.back()
    }

    /// Counters since creation.
    pub fn stats(&self) -> QueueStats {
        self.stats
    }

    /// Current epoch; bumped by every [`ActuationQueue::clear`].
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The limiter gating execution.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Follow new server limits without dropping pending requests.
    pub fn set_rate_limit(&mut self, config: RateLimitConfig) {
        debug!(
            window_ms = config.window_ms,
            capacity = config.capacity,
            "rate limit changed"
        );
        self.limiter.set_config(config);
    }

    /// Forget the limiter's open window; the next request is admitted at once.
    pub fn reset_limiter(&mut self) {
        self.limiter.reset();
    }

    /// Advance the queue by one scheduling step.
    ///
    /// An empty queue never consumes a grant. Execution errors are logged and
    /// the request dropped; nothing is ever re-queued.
    pub fn tick(&mut self, now_ms: u64, actuator: &mut dyn Actuator) -> TickOutcome {
        if self.pending.is_empty() {
            return TickOutcome::Idle;
        }

        if let Admission::Denied { retry_after_ms } = self.limiter.allow(now_ms) {
            self.stats.rate_limited += 1;
            return TickOutcome::RateLimited { retry_after_ms };
        }

        let Some(request) = self.pending.pop_back() else {
            return TickOutcome::Idle;
        };

        match actuator.actuate(&request) {
            Ok(Actuation::Applied) => {
                debug!(x = request.x, y = request.y, "actuation applied");
                self.stats.executed += 1;
                TickOutcome::Executed(request)
            }
            Ok(Actuation::TargetMissing) => {
                debug!(x = request.x, y = request.y, "actuation target missing");
                self.stats.target_missing += 1;
                TickOutcome::TargetMissing(request)
            }
            Err(e) => {
                warn!(x = request.x, y = request.y, error = %e, "actuation failed, dropping request");
                self.stats.failed += 1;
                TickOutcome::Failed(request)
            }
        }
    }

    /// Discard every pending request and start a new epoch.
    ///
    /// Returns the number discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.pending.len();
        self.pending.clear();
        self.epoch += 1;
        self.stats.discarded += discarded as u64;
        debug!(discarded, epoch = self.epoch, "actuation queue cleared");
        discarded
    }

    /// Enqueue a discovery batch, in order.
    ///
    /// Batches from an earlier epoch are rejected so that nothing collected
    /// before a clear can be enqueued after it.
    pub fn accept_batch(&mut self, batch: ProposalBatch, mode: BatchMode) -> Result<usize> {
        if batch.epoch != self.epoch {
            warn!(
                batch_epoch = batch.epoch,
                current_epoch = self.epoch,
                "discarding stale discovery batch"
            );
            return Err(ActuationError::StaleBatch {
                batch_epoch: batch.epoch,
                current_epoch: self.epoch,
            });
        }

        if mode == BatchMode::Exclusive && !self.pending.is_empty() {
            return Err(ActuationError::QueueBusy {
                pending: self.pending.len(),
            });
        }

        let count = batch.requests.len();
        for request in batch.requests {
            self.enqueue(request);
        }
        Ok(count)
    }
}

impl Default for ActuationQueue {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
