//! Clip creation and polling.
//!
//! The clip flow is the provider's asynchronous path: submit a clip,
//! poll until it finishes rendering, then download the audio from the
//! returned URL. The `/stream` path in [`crate::TtsService`] is the
//! synchronous alternative used by the composition engine.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::http::HttpClient;

/// Maximum number of status polls before giving up on a clip.
const MAX_POLLS: u32 = 20;
/// Delay between status polls.
const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Clip management service.
pub struct ClipService {
    http: Arc<HttpClient>,
}

impl ClipService {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Submits a clip for rendering.
    pub async fn create(&self, request: &ClipRequest) -> Result<ClipTask> {
        if request.text.is_empty() {
            return Err(Error::Config("text is required".to_string()));
        }

        let response: CreateClipResponse =
            self.http.request("POST", "/clips", Some(request)).await?;

        debug!(clip_id = %response.clip_id, "clip submitted");
        Ok(ClipTask {
            id: response.clip_id,
            http: self.http.clone(),
        })
    }

    /// Queries a clip's rendering status.
    pub async fn get(&self, clip_id: &str) -> Result<ClipStatus> {
        get_status(&self.http, clip_id).await
    }
}

/// A submitted clip that can be polled to completion.
pub struct ClipTask {
    id: String,
    http: Arc<HttpClient>,
}

impl ClipTask {
    /// Returns the clip ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Queries the current rendering status.
    pub async fn status(&self) -> Result<ClipStatus> {
        get_status(&self.http, &self.id).await
    }

    /// Polls until the clip completes or the polling budget runs out.
    pub async fn wait(&self) -> Result<ClipStatus> {
        for _ in 0..MAX_POLLS {
            let status = self.status().await?;
            match status.state {
                ClipState::Complete => return Ok(status),
                ClipState::Failed => {
                    return Err(Error::Other(format!("clip {} failed to render", self.id)));
                }
                ClipState::Processing => {
                    debug!(clip_id = %self.id, "clip still processing");
                }
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        Err(Error::ClipTimeout(self.id.clone()))
    }

    /// Downloads the finished clip's audio.
    pub async fn download(&self, status: &ClipStatus) -> Result<Bytes> {
        let url = status
            .url
            .as_deref()
            .ok_or_else(|| Error::Other(format!("clip {} has no audio url", self.id)))?;
        self.http.download(url).await
    }
}

async fn get_status(http: &HttpClient, clip_id: &str) -> Result<ClipStatus> {
    let response: ClipStatusResponse = http
        .request::<(), _>("GET", &format!("/clips/{}", clip_id), None)
        .await?;

    Ok(ClipStatus {
        clip_id: clip_id.to_string(),
        state: ClipState::from_status(&response.status),
        url: response.url,
    })
}

// ==================== Request/Response Types ====================

/// Request to render one clip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipRequest {
    /// Tagged text to synthesize.
    pub text: String,
    /// Voice identifier.
    pub speaker_id: String,
    /// Voice model (`legacy` or `caruso`).
    pub model: String,
}

/// Rendering state of a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipState {
    /// Still rendering.
    Processing,
    /// Finished; audio is available.
    Complete,
    /// Rendering failed.
    Failed,
}

impl ClipState {
    fn from_status(status: &str) -> Self {
        match status {
            "COMPLETE" => ClipState::Complete,
            "ERROR" | "FAILED" => ClipState::Failed,
            _ => ClipState::Processing,
        }
    }
}

/// Status of a submitted clip.
#[derive(Debug, Clone)]
pub struct ClipStatus {
    /// Clip ID.
    pub clip_id: String,
    /// Rendering state.
    pub state: ClipState,
    /// Audio URL, present once rendering completes.
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateClipResponse {
    clip_id: String,
}

#[derive(Debug, Deserialize)]
struct ClipStatusResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    url: Option<String>,
}
