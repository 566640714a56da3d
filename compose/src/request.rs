//! Builds per-segment synthesis requests from a validated script.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::script::{Respelling, Script, VoiceParameters};

/// One synthesis request, carrying its originating segment index so the
/// result can be matched back regardless of completion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Index of the originating segment.
    pub index: usize,
    /// Voice identifier.
    pub speaker_id: String,
    /// Text to speak.
    pub text: String,
    /// Raw delivery markup.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub director_tags: String,
    /// Pronunciation overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub respellings: Vec<Respelling>,
    /// Voice parameter overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceParameters>,
}

/// Maps a validated script to an ordered request list.
///
/// Performs no I/O. An empty script or a broken index invariant is a
/// programmer error upstream of this point and is reported as
/// [`Error::InvalidScript`].
pub fn build_requests(script: &Script) -> Result<Vec<SynthesisRequest>> {
    if script.is_empty() {
        return Err(Error::InvalidScript("script has no segments".to_string()));
    }

    let mut requests = Vec::with_capacity(script.len());
    for (position, segment) in script.segments.iter().enumerate() {
        if segment.index != position {
            return Err(Error::InvalidScript(format!(
                "segment at position {} carries index {}",
                position, segment.index
            )));
        }
        requests.push(SynthesisRequest {
            index: segment.index,
            speaker_id: segment.speaker_id.clone(),
            text: segment.text.clone(),
            director_tags: segment.director_tags.clone(),
            respellings: segment.respellings.clone(),
            voice: segment.voice,
        });
    }

    Ok(requests)
}
