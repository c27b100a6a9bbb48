//! Parallel discovery of actuation proposals.
//!
//! Probing many candidates (e.g. every power node in range for a bulk repair)
//! runs on a bounded set of tokio tasks. Probes only propose requests; the
//! batch is handed back to the single-threaded queue, which stays the one
//! place where world mutation is decided.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::{ActuationError, Result};
use crate::queue::ProposalBatch;
use crate::request::ActuationRequest;

/// Discovery configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Maximum probes in flight.
    pub max_concurrency: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { max_concurrency: 8 }
    }
}

/// Inspects one candidate and proposes requests for it.
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    /// The thing being probed.
    type Candidate: Send + 'static;

    /// Propose requests for `candidate`. Must not mutate the world.
    async fn probe(&self, candidate: Self::Candidate) -> anyhow::Result<Vec<ActuationRequest>>;
}

/// Cancels a discovery run from anywhere.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Stop outstanding probes. The run returns [`ActuationError::Cancelled`].
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// A single discovery run over a set of candidates.
pub struct Discovery<P: Probe> {
    probe: Arc<P>,
    config: DiscoveryConfig,
    cancel: Arc<watch::Sender<bool>>,
}

impl<P: Probe> Discovery<P> {
    /// Create a run.
    pub fn new(probe: P, config: DiscoveryConfig) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            probe: Arc::new(probe),
            config,
            cancel: Arc::new(tx),
        }
    }

    /// Handle that cancels this run.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.cancel),
        }
    }

    /// Probe every candidate and collect the proposals.
    ///
    /// `epoch` is the queue epoch at the start of the run; the queue rejects
    /// the batch if it was cleared in the meantime. Failed probes are logged
    /// and counted. Duplicate proposals keep their first occurrence, in
    /// candidate order.
    pub async fn run(&self, candidates: Vec<P::Candidate>, epoch: u64) -> Result<ProposalBatch> {
        if *self.cancel.borrow() {
            return Err(ActuationError::Cancelled);
        }

        let permits = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, candidate) in candidates.into_iter().enumerate() {
            let probe = Arc::clone(&self.probe);
            let permits = Arc::clone(&permits);
            let mut cancelled = self.cancel.subscribe();

            tasks.spawn(async move {
                let work = async move {
                    let _permit = permits.acquire_owned().await.ok()?;
                    Some(probe.probe(candidate).await)
                };
                tokio::select! {
                    biased;
                    _ = wait_cancelled(&mut cancelled) => (index, None),
                    result = work => (index, result),
                }
            });
        }

        let mut results: Vec<(usize, anyhow::Result<Vec<ActuationRequest>>)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined.map_err(|e| ActuationError::ProbeTask(e.to_string()))?;
            if let Some(result) = result {
                results.push((index, result));
            }
        }

        if *self.cancel.borrow() {
            debug!("discovery cancelled, dropping proposals");
            return Err(ActuationError::Cancelled);
        }

        results.sort_by_key(|(index, _)| *index);

        let mut batch = ProposalBatch {
            epoch,
            ..ProposalBatch::default()
        };
        let mut seen = HashSet::new();
        for (index, result) in results {
            match result {
                Ok(requests) => {
                    for request in requests {
                        if seen.insert(request.clone()) {
                            batch.requests.push(request);
                        }
                    }
                }
                Err(e) => {
                    warn!(candidate = index, error = %e, "probe failed");
                    batch.failed_probes += 1;
                }
            }
        }

        debug!(
            proposals = batch.requests.len(),
            failed = batch.failed_probes,
            "discovery finished"
        );
        Ok(batch)
    }
}

async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{ActuationQueue, BatchMode};
    use crate::request::ConfigValue;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Proposes a link from each candidate node to the origin.
    struct LinkProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl LinkProbe {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Probe for LinkProbe {
        type Candidate = (i32, i32);

        async fn probe(&self, (x, y): (i32, i32)) -> anyhow::Result<Vec<ActuationRequest>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if x < 0 {
                anyhow::bail!("node at {x},{y} is not a power node");
            }
            Ok(vec![ActuationRequest::new(
                x,
                y,
                ConfigValue::Pos { x: 0, y: 0 },
            )])
        }
    }

    struct SlowProbe;

    #[async_trait]
    impl Probe for SlowProbe {
        type Candidate = i32;

        async fn probe(&self, n: i32) -> anyhow::Result<Vec<ActuationRequest>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec![ActuationRequest::new(n, n, ConfigValue::Unset)])
        }
    }

    struct DuplicatingProbe;

    #[async_trait]
    impl Probe for DuplicatingProbe {
        type Candidate = i32;

        async fn probe(&self, n: i32) -> anyhow::Result<Vec<ActuationRequest>> {
            Ok(vec![
                ActuationRequest::new(0, 0, ConfigValue::Int(1)),
                ActuationRequest::new(n, n, ConfigValue::Int(1)),
            ])
        }
    }

    #[tokio::test]
    async fn test_collects_in_candidate_order() {
        let discovery = Discovery::new(LinkProbe::new(), DiscoveryConfig { max_concurrency: 4 });
        let candidates: Vec<_> = (1..=10).map(|i| (i, i * 2)).collect();

        let batch = discovery.run(candidates, 0).await.unwrap();

        assert_eq!(batch.len(), 10);
        assert_eq!(batch.requests[0].x, 1);
        assert_eq!(batch.requests[9].x, 10);
        assert_eq!(batch.failed_probes, 0);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let discovery = Discovery::new(LinkProbe::new(), DiscoveryConfig { max_concurrency: 3 });
        let candidates: Vec<_> = (0..20).map(|i| (i, 0)).collect();

        discovery.run(candidates, 0).await.unwrap();

        assert!(discovery.probe.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_failed_probes_are_counted() {
        let discovery = Discovery::new(LinkProbe::new(), DiscoveryConfig::default());
        let batch = discovery.run(vec![(1, 1), (-1, 1), (2, 2)], 0).await.unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.failed_probes, 1);
    }

    #[tokio::test]
    async fn test_duplicates_collapse() {
        let discovery = Discovery::new(DuplicatingProbe, DiscoveryConfig::default());
        let batch = discovery.run(vec![1, 2], 0).await.unwrap();

        assert_eq!(
            batch.requests,
            vec![
                ActuationRequest::new(0, 0, ConfigValue::Int(1)),
                ActuationRequest::new(1, 1, ConfigValue::Int(1)),
                ActuationRequest::new(2, 2, ConfigValue::Int(1)),
            ]
        );
    }

    #[tokio::test]
    async fn test_cancel_yields_no_batch() {
        let discovery = Discovery::new(SlowProbe, DiscoveryConfig::default());
        let handle = discovery.cancel_handle();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });

        let result = discovery.run(vec![1, 2, 3], 0).await;
        canceller.await.unwrap();

        assert!(matches!(result, Err(ActuationError::Cancelled)));
        assert!(discovery.cancel_handle().is_cancelled());
    }

    #[tokio::test]
    async fn test_batch_from_before_clear_is_not_enqueued() {
        let mut queue = ActuationQueue::default();
        let discovery = Discovery::new(LinkProbe::new(), DiscoveryConfig::default());

        let batch = discovery.run(vec![(1, 1)], queue.epoch()).await.unwrap();
        queue.clear();

        assert!(queue.accept_batch(batch, BatchMode::Append).is_err());
        assert!(queue.is_empty());
    }
}
