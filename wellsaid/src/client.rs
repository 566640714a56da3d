//! WellSaid API client.

use std::sync::Arc;
use std::time::Duration;

use voxkit_compose::PcmFormat;

use crate::{
    avatars::AvatarService,
    clips::ClipService,
    error::{Error, Result},
    http::HttpClient,
    tts::TtsService,
};

/// Default WellSaid API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.wellsaidlabs.com/v1/tts";

/// Voice model covering the classic avatar set.
pub const MODEL_LEGACY: &str = "legacy";

/// Current-generation voice model.
pub const MODEL_CARUSO: &str = "caruso";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// WellSaid API client.
///
/// The client provides access to all WellSaid API services and
/// implements [`voxkit_compose::Synthesizer`], so it plugs directly
/// into the composition engine.
///
/// # Example
///
/// ```rust,no_run
/// use voxkit_wellsaid::Client;
///
/// # async fn run() -> voxkit_wellsaid::Result<()> {
/// let client = Client::new("your-api-key")?;
/// let avatars = client.avatars().list().await?;
/// # Ok(())
/// # }
/// ```
pub struct Client {
    http: Arc<HttpClient>,
    config: ClientConfig,
}

/// Client configuration.
#[derive(Clone)]
struct ClientConfig {
    base_url: String,
    default_model: String,
    default_format: PcmFormat,
}

impl Client {
    /// Creates a new WellSaid API client with default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(api_key).build()
    }

    /// Creates a new client builder for more configuration options.
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Returns the model used when a request does not name one.
    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    /// Returns the speech synthesis service.
    pub fn tts(&self) -> TtsService {
        TtsService::new(self.http.clone(), self.config.default_format)
    }

    /// Returns the clip rendering service.
    pub fn clips(&self) -> ClipService {
        ClipService::new(self.http.clone())
    }

    /// Returns the avatar catalog service.
    pub fn avatars(&self) -> AvatarService {
        AvatarService::new(self.http.clone())
    }
}

/// Builder for creating a WellSaid API client.
pub struct ClientBuilder {
    api_key: String,
    base_url: String,
    default_model: String,
    default_format: PcmFormat,
    timeout: Duration,
}

impl ClientBuilder {
    /// Creates a new client builder.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: MODEL_CARUSO.to_string(),
            default_format: PcmFormat::L16_MONO_16K,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom base URL for the API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the model used when a request does not name one.
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Sets the PCM format assumed when the server does not declare one.
    pub fn default_format(mut self, format: PcmFormat) -> Self {
        self.default_format = format;
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<Client> {
        if self.api_key.is_empty() {
            return Err(Error::Config("api_key must be non-empty".to_string()));
        }

        let http = HttpClient::new(self.base_url.clone(), self.api_key, self.timeout)?;

        Ok(Client {
            http: Arc::new(http),
            config: ClientConfig {
                base_url: self.base_url,
                default_model: self.default_model,
                default_format: self.default_format,
            },
        })
    }
}

#[cfg(test)]
mod client_tests {
    use super::*;

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(matches!(Client::new(""), Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_overrides() {
        let client = Client::builder("key")
            .base_url("http://localhost:9999")
            .default_model(MODEL_LEGACY)
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999");
        assert_eq!(client.default_model(), MODEL_LEGACY);
    }
}
