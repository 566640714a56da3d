//! Concurrent synthesis dispatch with per-segment retry.
//!
//! Each segment request runs as an independent tokio task, bounded by an
//! in-flight semaphore. Transient failures are retried per segment with
//! exponential backoff; one segment's retries never delay or cancel its
//! siblings. The result is a mapping total over every segment index,
//! regardless of completion order.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ComposeConfig;
use crate::error::{Error, Result};
use crate::request::SynthesisRequest;
use crate::synth::{SynthesisError, SynthesizedClip, Synthesizer};

/// Classification of a segment's terminal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Retry budget exhausted on retryable errors.
    Transient,
    /// The collaborator rejected the request outright.
    Permanent,
}

/// Terminal result of one dispatched segment. Created once by the
/// dispatcher and never mutated afterwards.
#[derive(Debug)]
pub enum SegmentOutcome {
    /// The segment synthesized successfully.
    Succeeded(SynthesizedClip),
    /// The segment failed after `attempts` synthesis attempts.
    Failed {
        kind: FailureKind,
        message: String,
        attempts: u32,
    },
}

impl SegmentOutcome {
    /// Returns true for a succeeded outcome.
    pub fn is_succeeded(&self) -> bool {
        matches!(self, SegmentOutcome::Succeeded(_))
    }
}

/// Dispatches segment requests concurrently against a synthesizer.
pub struct Dispatcher {
    config: ComposeConfig,
}

impl Dispatcher {
    /// Creates a dispatcher with the given configuration.
    pub fn new(config: ComposeConfig) -> Self {
        Self { config }
    }

    /// Runs every request to a terminal outcome.
    ///
    /// Fan-out is one task per request, bounded by `max_in_flight`
    /// permits. Fan-in fills a pre-sized slot vector keyed by segment
    /// index; each worker writes only its own slot. The returned vector
    /// is total over `0..requests.len()`.
    ///
    /// Cancellation aborts all in-flight work and returns
    /// [`Error::Cancelled`]; no partial result is produced.
    pub async fn run(
        &self,
        requests: Vec<SynthesisRequest>,
        synthesizer: Arc<dyn Synthesizer>,
        cancel: CancellationToken,
    ) -> Result<Vec<SegmentOutcome>> {
        let total = requests.len();
        let semaphore = Arc::new(Semaphore::new(self.config.max_in_flight.max(1)));
        let mut workers = JoinSet::new();

        for request in requests {
            let synthesizer = synthesizer.clone();
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();
            let config = self.config.clone();

            workers.spawn(async move {
                let index = request.index;
                tokio::select! {
                    outcome = run_segment(&request, synthesizer.as_ref(), &semaphore, &config) => {
                        (index, outcome)
                    }
                    _ = cancel.cancelled() => {
                        (index, SegmentOutcome::Failed {
                            kind: FailureKind::Transient,
                            message: "cancelled".to_string(),
                            attempts: 0,
                        })
                    }
                }
            });
        }

        let mut slots: Vec<Option<SegmentOutcome>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);

        loop {
            tokio::select! {
                joined = workers.join_next() => {
                    match joined {
                        Some(result) => {
                            let (index, outcome) = result?;
                            // Each worker owns exactly one slot.
                            slots[index] = Some(outcome);
                        }
                        None => break,
                    }
                }
                _ = cancel.cancelled() => {
                    workers.abort_all();
                    return Err(Error::Cancelled);
                }
            }
        }

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    Error::InvalidScript(format!("no outcome recorded for segment {}", index))
                })
            })
            .collect()
    }
}

/// Runs one segment to a terminal outcome: attempt, classify, back off,
/// retry. The in-flight permit is held only for the duration of a
/// network attempt, never across a backoff sleep, so a retrying segment
/// does not occupy a rate-limit slot.
async fn run_segment(
    request: &SynthesisRequest,
    synthesizer: &dyn Synthesizer,
    semaphore: &Arc<Semaphore>,
    config: &ComposeConfig,
) -> SegmentOutcome {
    let max_attempts = config.max_retries.max(1);
    let mut attempts = 0u32;
    let mut last_message = String::new();

    while attempts < max_attempts {
        if attempts > 0 {
            let delay = config.backoff_delay(attempts);
            warn!(
                index = request.index,
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %last_message,
                "segment synthesis failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
        attempts += 1;

        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                return SegmentOutcome::Failed {
                    kind: FailureKind::Transient,
                    message: "dispatcher shut down".to_string(),
                    attempts,
                };
            }
        };

        let attempt =
            tokio::time::timeout(config.attempt_timeout(), synthesizer.synthesize(request)).await;
        drop(permit);

        let err = match attempt {
            Ok(Ok(clip)) => {
                debug!(
                    index = request.index,
                    attempts,
                    bytes = clip.audio.len(),
                    "segment synthesized"
                );
                return SegmentOutcome::Succeeded(clip);
            }
            Ok(Err(err)) => err,
            Err(_) => SynthesisError::Transient(format!(
                "attempt timed out after {}ms",
                config.attempt_timeout_ms
            )),
        };

        if !err.is_transient() {
            return SegmentOutcome::Failed {
                kind: FailureKind::Permanent,
                message: err.to_string(),
                attempts,
            };
        }
        last_message = err.to_string();
    }

    SegmentOutcome::Failed {
        kind: FailureKind::Transient,
        message: last_message,
        attempts,
    }
}
