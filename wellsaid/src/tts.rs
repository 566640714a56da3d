//! Speech synthesis service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use voxkit_compose::{PcmFormat, SynthesisError, SynthesisRequest, SynthesizedClip, Synthesizer};

use crate::client::Client;
use crate::director;
use crate::error::{Error, Result};
use crate::http::HttpClient;

/// Speech synthesis service.
pub struct TtsService {
    http: Arc<HttpClient>,
    default_format: PcmFormat,
}

impl TtsService {
    pub(crate) fn new(http: Arc<HttpClient>, default_format: PcmFormat) -> Self {
        Self {
            http,
            default_format,
        }
    }

    /// Synthesizes one block of tagged text into a single audio clip.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use voxkit_wellsaid::{Client, SpeechRequest, MODEL_CARUSO};
    ///
    /// # async fn run() -> voxkit_wellsaid::Result<()> {
    /// let client = Client::new("api-key")?;
    /// let response = client.tts().synthesize(&SpeechRequest {
    ///     text: "Hello, world!".to_string(),
    ///     speaker_id: "3".to_string(),
    ///     model: MODEL_CARUSO.to_string(),
    ///     ..Default::default()
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechResponse> {
        if request.text.is_empty() {
            return Err(Error::Config("text is required".to_string()));
        }
        if request.speaker_id.is_empty() {
            return Err(Error::Config("speaker_id is required".to_string()));
        }

        let (audio, content_type) = self
            .http
            .request_audio("POST", "/stream", Some(request))
            .await?;

        let format = parse_pcm_content_type(&content_type).unwrap_or(self.default_format);
        let duration = format.duration(audio.len());

        debug!(
            speaker_id = %request.speaker_id,
            bytes = audio.len(),
            duration_ms = duration.as_millis() as u64,
            "clip synthesized"
        );

        Ok(SpeechResponse {
            audio: audio.to_vec(),
            duration,
            format,
            content_type,
        })
    }
}

/// Renders a segment request into provider markup: respellings first,
/// then voice parameter wrappers around the whole text.
pub fn render_segment_text(request: &SynthesisRequest) -> String {
    let base = if request.director_tags.is_empty() {
        request.text.as_str()
    } else {
        request.director_tags.as_str()
    };

    let mut text = director::apply_respellings(base, &request.respellings);
    if let Some(voice) = &request.voice {
        text = director::apply_voice(&text, voice);
    }
    text
}

#[async_trait]
impl Synthesizer for Client {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> std::result::Result<SynthesizedClip, SynthesisError> {
        let speech_request = SpeechRequest {
            text: render_segment_text(request),
            speaker_id: request.speaker_id.clone(),
            model: self.default_model().to_string(),
            sample_rate: None,
        };

        let response = self
            .tts()
            .synthesize(&speech_request)
            .await
            .map_err(SynthesisError::from)?;

        Ok(SynthesizedClip {
            audio: response.audio,
            duration: response.duration,
            format: response.format,
        })
    }
}

/// Parses a PCM format out of a content type such as
/// `audio/l16;rate=16000;channels=1`.
fn parse_pcm_content_type(content_type: &str) -> Option<PcmFormat> {
    let mut parts = content_type.split(';').map(str::trim);
    let mime = parts.next()?;
    if !mime.eq_ignore_ascii_case("audio/l16") {
        return None;
    }

    let mut sample_rate = None;
    let mut channels = 1u16;
    for part in parts {
        if let Some(rate) = part.strip_prefix("rate=") {
            sample_rate = rate.parse().ok();
        } else if let Some(ch) = part.strip_prefix("channels=") {
            channels = ch.parse().unwrap_or(1);
        }
    }

    sample_rate.map(|sample_rate| PcmFormat {
        sample_rate,
        channels,
    })
}

// ==================== Request/Response Types ====================

/// Request for speech synthesis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Tagged text to synthesize.
    pub text: String,

    /// Voice identifier.
    pub speaker_id: String,

    /// Voice model (`legacy` or `caruso`).
    pub model: String,

    /// Requested output sample rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
}

/// Response from speech synthesis.
#[derive(Debug, Clone)]
pub struct SpeechResponse {
    /// Raw PCM audio bytes.
    pub audio: Vec<u8>,

    /// Clip duration derived from the byte length.
    pub duration: Duration,

    /// Audio format.
    pub format: PcmFormat,

    /// Content type reported by the server.
    pub content_type: String,
}
