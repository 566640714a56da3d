//! Composition engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default attempt ceiling per segment.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default bound on concurrently in-flight synthesis calls.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;
/// Default per-attempt timeout.
pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 30_000;
/// Default base delay for exponential backoff.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;
/// Default backoff cap.
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 8_000;

/// Configuration for a composition run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Maximum synthesis attempts per segment, counting the first.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Maximum number of segment requests in flight at once. Segments
    /// beyond the bound queue until a slot frees.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Bound on a single synthesis attempt; exceeding it counts as a
    /// transient failure.
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,

    /// Backoff before retry N is `retry_base_delay_ms * 2^(N-1)`.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Cap on the backoff delay.
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
fn default_max_in_flight() -> usize {
    DEFAULT_MAX_IN_FLIGHT
}
fn default_attempt_timeout_ms() -> u64 {
    DEFAULT_ATTEMPT_TIMEOUT_MS
}
fn default_retry_base_delay_ms() -> u64 {
    DEFAULT_RETRY_BASE_DELAY_MS
}
fn default_retry_max_delay_ms() -> u64 {
    DEFAULT_RETRY_MAX_DELAY_MS
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            attempt_timeout_ms: DEFAULT_ATTEMPT_TIMEOUT_MS,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            retry_max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
        }
    }
}

impl ComposeConfig {
    /// Per-attempt timeout as a [`Duration`].
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Backoff delay before the retry following `attempt` (1-based),
    /// capped at `retry_max_delay_ms`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let delay = self.retry_base_delay_ms.saturating_mul(1u64 << shift);
        Duration::from_millis(delay.min(self.retry_max_delay_ms))
    }
}
