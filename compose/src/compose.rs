//! Audio composition: ordered concatenation with silence insertion.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::dispatch::{FailureKind, SegmentOutcome};
use crate::pcm::PcmFormat;
use crate::script::Script;

/// Overall status of a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionStatus {
    /// Every segment synthesized successfully.
    AllSucceeded,
    /// At least one segment succeeded and at least one failed.
    PartialFailure,
    /// Every segment failed; no audio is produced.
    TotalFailure,
}

/// Per-segment entry in the composition manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    /// Segment index in script order.
    pub index: usize,
    /// Voice identifier of the segment.
    pub speaker_id: String,
    /// What happened to the segment.
    #[serde(flatten)]
    pub status: EntryStatus,
}

/// Outcome summary for one manifest entry.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryStatus {
    /// The segment's audio is present in the composed stream.
    Succeeded {
        /// Clip duration, excluding configured pauses.
        duration_ms: u64,
    },
    /// The segment contributed nothing to the composed stream.
    Failed {
        kind: FailureKind,
        message: String,
        attempts: u32,
    },
}

/// The per-segment outcome report accompanying the composed audio.
/// Produced once at the end of composition, read-only thereafter.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    /// Overall status.
    pub status: CompositionStatus,
    /// Entries in segment index order.
    pub entries: Vec<ManifestEntry>,
}

/// The composed audio artifact.
#[derive(Debug, Clone)]
pub struct ComposedAudio {
    /// Concatenated PCM bytes.
    pub data: Vec<u8>,
    /// Total duration including inserted silence.
    pub duration: Duration,
    /// Format inherited from the synthesized clips.
    pub format: PcmFormat,
}

/// Assembles per-segment outcomes into one ordered audio stream.
///
/// Iterates strictly in segment index order. A succeeded segment emits
/// its configured leading silence, its audio, then its trailing
/// silence. A failed segment emits nothing but keeps its manifest
/// position; composition continues through the remaining segments.
///
/// The output format is the first succeeded clip's format. A succeeded
/// clip in a different format cannot be concatenated without
/// transcoding, which the composer never does, so it is demoted to a
/// failed entry and skipped.
pub fn compose_audio(
    script: &Script,
    outcomes: Vec<SegmentOutcome>,
) -> (Option<ComposedAudio>, Manifest) {
    let mut data = Vec::new();
    let mut format: Option<PcmFormat> = None;
    let mut entries = Vec::with_capacity(outcomes.len());
    let mut succeeded = 0usize;
    let mut failed = 0usize;

    for (segment, outcome) in script.segments.iter().zip(outcomes) {
        let status = match outcome {
            SegmentOutcome::Succeeded(clip) => {
                let out_format = *format.get_or_insert(clip.format);
                if clip.format != out_format {
                    failed += 1;
                    EntryStatus::Failed {
                        kind: FailureKind::Permanent,
                        message: format!(
                            "clip format {:?} does not match composition format {:?}",
                            clip.format, out_format
                        ),
                        attempts: 1,
                    }
                } else {
                    data.extend_from_slice(&out_format.silence(Duration::from_millis(
                        segment.pause_before_ms,
                    )));
                    data.extend_from_slice(&clip.audio);
                    data.extend_from_slice(&out_format.silence(Duration::from_millis(
                        segment.pause_after_ms,
                    )));
                    succeeded += 1;
                    EntryStatus::Succeeded {
                        duration_ms: clip.duration.as_millis() as u64,
                    }
                }
            }
            SegmentOutcome::Failed {
                kind,
                message,
                attempts,
            } => {
                failed += 1;
                EntryStatus::Failed {
                    kind,
                    message,
                    attempts,
                }
            }
        };

        entries.push(ManifestEntry {
            index: segment.index,
            speaker_id: segment.speaker_id.clone(),
            status,
        });
    }

    let status = if failed == 0 {
        CompositionStatus::AllSucceeded
    } else if succeeded > 0 {
        CompositionStatus::PartialFailure
    } else {
        CompositionStatus::TotalFailure
    };

    let audio = format.filter(|_| succeeded > 0).map(|format| {
        let duration = format.duration(data.len());
        debug!(
            bytes = data.len(),
            duration_ms = duration.as_millis() as u64,
            ?status,
            "composition assembled"
        );
        ComposedAudio {
            data,
            duration,
            format,
        }
    });

    (audio, Manifest { status, entries })
}
