//! Error types for the composition engine.

use thiserror::Error;

use crate::validate::SegmentErrors;

/// Result type alias for composition operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for composition operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The script was rejected before any synthesis call was made.
    /// Carries every validation error for every offending segment.
    #[error("script validation failed for {} segment(s)", .0.len())]
    Validation(Vec<SegmentErrors>),

    /// The script violates a structural invariant the loader should
    /// have enforced (empty script, non-contiguous indices).
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// The caller cancelled the composition; all in-flight segment
    /// requests were aborted and no partial artifact is produced.
    #[error("composition cancelled")]
    Cancelled,

    /// A dispatcher worker task failed to complete.
    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
