//! Script data model for multi-speaker composition.

use serde::{Deserialize, Serialize};

/// Minimum pitch adjustment accepted by the provider.
pub const PITCH_MIN: i32 = -250;
/// Maximum pitch adjustment accepted by the provider.
pub const PITCH_MAX: i32 = 500;
/// Minimum tempo multiplier accepted by the provider.
pub const TEMPO_MIN: f64 = 0.5;
/// Maximum tempo multiplier accepted by the provider.
pub const TEMPO_MAX: f64 = 2.5;
/// Minimum loudness adjustment accepted by the provider.
pub const LOUDNESS_MIN: i32 = -20;
/// Maximum loudness adjustment accepted by the provider.
pub const LOUDNESS_MAX: i32 = 10;

/// An ordered multi-speaker script.
///
/// Segment order in the vector defines the final audio order. Each
/// segment's `index` must match its position; the request builder
/// rejects scripts that break this invariant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    /// Spoken turns, in playback order.
    pub segments: Vec<Segment>,
}

impl Script {
    /// Creates a script from a list of segments, assigning indices
    /// by position.
    pub fn new(segments: impl IntoIterator<Item = Segment>) -> Self {
        let segments = segments
            .into_iter()
            .enumerate()
            .map(|(i, mut seg)| {
                seg.index = i;
                seg
            })
            .collect();
        Self { segments }
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the script has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// One spoken turn in a script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Segment {
    /// Position in the script (0-based). Defines final ordering.
    #[serde(default)]
    pub index: usize,

    /// Voice identifier for this turn.
    pub speaker_id: String,

    /// Text to speak.
    pub text: String,

    /// Silence inserted before this turn, in milliseconds.
    #[serde(default)]
    pub pause_before_ms: u64,

    /// Silence inserted after this turn, in milliseconds.
    #[serde(default)]
    pub pause_after_ms: u64,

    /// Optional pitch/tempo/loudness overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceParameters>,

    /// Pronunciation overrides, applied in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub respellings: Vec<Respelling>,

    /// Raw delivery markup already present in the text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub director_tags: String,
}

/// Per-segment voice parameter overrides.
///
/// Absent fields fall back to the provider default. Legal ranges are
/// checked by the validator before any request is dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceParameters {
    /// Pitch adjustment, -250 to +500.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<i32>,

    /// Tempo multiplier, 0.5 to 2.5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<f64>,

    /// Loudness adjustment, -20 to +10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loudness: Option<i32>,
}

impl VoiceParameters {
    /// Returns true if no override is set.
    pub fn is_default(&self) -> bool {
        self.pitch.is_none() && self.tempo.is_none() && self.loudness.is_none()
    }
}

/// A pronunciation override for one word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Respelling {
    /// The word as it appears in the segment text.
    pub word: String,

    /// Phonetic respelling, hyphen-delimited sections.
    pub phonetic: String,
}
