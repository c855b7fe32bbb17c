//! Bounded worker pool.
//!
//! Runs a [`Probe`] over every candidate with a fixed number of worker
//! tasks. Workers claim candidate indices from a shared cursor, so no more
//! than `concurrency` probes are ever in flight and no task is created per
//! candidate. Outcomes are written back into a pre-sized slot vector after
//! the join, keeping `outcomes[i]` aligned with `candidates[i]` regardless
//! of completion order.

use crate::error::{ConfigError, ConfigResult, ProbeFailure};
use crate::scanner::traits::{Probe, ProbeOutcome};
use futures::FutureExt;
use indicatif::ProgressBar;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

/// A fixed-size pool of probe workers.
#[derive(Clone)]
pub struct WorkerPool {
    concurrency: usize,
    probe_timeout: Option<Duration>,
    progress: Option<ProgressBar>,
}

impl WorkerPool {
    /// Create a pool running at most `concurrency` probes at once.
    pub fn new(concurrency: usize) -> ConfigResult<Self> {
        if concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        Ok(Self {
            concurrency,
            probe_timeout: None,
            progress: None,
        })
    }

    /// Bound every probe invocation; overruns count as [`ProbeFailure::Timeout`].
    pub fn with_probe_timeout(mut self, limit: Duration) -> Self {
        self.probe_timeout = Some(limit);
        self
    }

    /// Advance `progress` once per completed probe.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Probe every candidate and return one outcome per candidate, in input order.
    ///
    /// Returns only after every worker has finished.
    pub async fn run<P>(
        &self,
        probe: Arc<P>,
        candidates: Vec<P::Candidate>,
    ) -> Vec<ProbeOutcome<P::Finding>>
    where
        P: Probe + 'static,
    {
        let total = candidates.len();
        if total == 0 {
            return Vec::new();
        }

        let candidates: Arc<[P::Candidate]> = candidates.into();
        let cursor = Arc::new(AtomicUsize::new(0));
        let workers = self.concurrency.min(total);
        debug!(kind = %probe.kind(), candidates = total, workers, "starting worker pool");

        let mut set = JoinSet::new();
        for worker in 0..workers {
            let probe = Arc::clone(&probe);
            let candidates = Arc::clone(&candidates);
            let cursor = Arc::clone(&cursor);
            let limit = self.probe_timeout;
            let progress = self.progress.clone();

            set.spawn(async move {
                let mut completed = Vec::new();
                loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(candidate) = candidates.get(index) else {
                        break;
                    };

                    let outcome = guarded_probe(probe.as_ref(), candidate, limit).await;
                    if let Some(ref pb) = progress {
                        pb.inc(1);
                    }
                    completed.push((index, outcome));
                }
                trace!(worker, probed = completed.len(), "worker drained queue");
                completed
            });
        }

        let mut slots: Vec<Option<ProbeOutcome<P::Finding>>> =
            std::iter::repeat_with(|| None).take(total).collect();

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(completed) => {
                    for (index, outcome) in completed {
                        slots[index] = Some(outcome);
                    }
                }
                Err(e) => warn!(error = %e, "probe worker terminated abnormally"),
            }
        }

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or(ProbeOutcome::NotInteresting(ProbeFailure::Aborted)))
            .collect()
    }
}

/// Run one probe, converting panics and overruns into failures.
async fn guarded_probe<P>(
    probe: &P,
    candidate: &P::Candidate,
    limit: Option<Duration>,
) -> ProbeOutcome<P::Finding>
where
    P: Probe + ?Sized,
{
    let attempt = AssertUnwindSafe(probe.probe(candidate)).catch_unwind();
    let result = match limit {
        Some(limit) => match timeout(limit, attempt).await {
            Ok(result) => result,
            Err(_) => return ProbeOutcome::NotInteresting(ProbeFailure::Timeout),
        },
        None => attempt.await,
    };

    result.unwrap_or(ProbeOutcome::NotInteresting(ProbeFailure::Panicked))
}
