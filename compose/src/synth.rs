//! Interface to the external synthesis collaborator.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::pcm::PcmFormat;
use crate::request::SynthesisRequest;

/// Error returned by a synthesis attempt.
///
/// The transient/permanent split drives the dispatcher's retry policy:
/// transient errors are retried up to the configured attempt budget,
/// permanent errors fail the segment immediately.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Retryable failure: network error, rate limit, server-side error.
    #[error("transient synthesis error: {0}")]
    Transient(String),

    /// Non-retryable failure: the collaborator rejected the request.
    #[error("permanent synthesis error: {0}")]
    Permanent(String),
}

impl SynthesisError {
    /// Returns true if the attempt can be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, SynthesisError::Transient(_))
    }
}

/// Audio produced for one segment.
#[derive(Debug, Clone)]
pub struct SynthesizedClip {
    /// Raw PCM audio bytes.
    pub audio: Vec<u8>,
    /// Clip duration.
    pub duration: Duration,
    /// Format of the audio bytes.
    pub format: PcmFormat,
}

impl SynthesizedClip {
    /// Creates a clip from raw PCM bytes, deriving the duration from
    /// the byte length.
    pub fn from_pcm(audio: Vec<u8>, format: PcmFormat) -> Self {
        let duration = format.duration(audio.len());
        Self {
            audio,
            duration,
            format,
        }
    }
}

/// A text-to-speech backend that turns one segment request into one
/// audio clip.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Performs a single synthesis attempt for one segment.
    async fn synthesize(&self, req: &SynthesisRequest) -> Result<SynthesizedClip, SynthesisError>;
}
