//! Error types for the WellSaid API client.

use thiserror::Error;

use voxkit_compose::SynthesisError;

/// Result type alias for WellSaid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for WellSaid API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// API error returned by WellSaid.
    #[error("wellsaid: {message} (status={http_status}, request={request_id})")]
    Api {
        message: String,
        request_id: String,
        http_status: u16,
    },

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The server returned a non-audio body where audio was expected.
    #[error("unexpected content type: {0}")]
    UnexpectedContentType(String),

    /// A clip did not finish processing within the polling budget.
    #[error("clip {0} did not complete in time")]
    ClipTimeout(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a new API error.
    pub fn api(message: impl Into<String>, http_status: u16) -> Self {
        Error::Api {
            message: message.into(),
            request_id: String::new(),
            http_status,
        }
    }

    /// Creates a new API error with a request ID.
    pub fn api_with_request_id(
        message: impl Into<String>,
        request_id: impl Into<String>,
        http_status: u16,
    ) -> Self {
        Error::Api {
            message: message.into(),
            request_id: request_id.into(),
            http_status,
        }
    }

    /// Returns true if this is a rate limit error.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::Api { http_status, .. } if *http_status == 429)
    }

    /// Returns true if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Api { http_status, .. } if *http_status == 401 || *http_status == 403)
    }

    /// Returns true if this is a server-side error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { http_status, .. } if *http_status >= 500)
    }

    /// Returns true if the request itself was rejected.
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            Error::Api { http_status, .. }
                if (400..500).contains(http_status) && *http_status != 429
        )
    }

    /// Returns true if the request can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::ClipTimeout(_) => true,
            _ => self.is_rate_limit() || self.is_server_error(),
        }
    }
}

/// Classifies an SDK error at the composition engine's collaborator
/// boundary: retryable errors become transient, the rest permanent.
impl From<Error> for SynthesisError {
    fn from(err: Error) -> Self {
        if err.is_retryable() {
            SynthesisError::Transient(err.to_string())
        } else {
            SynthesisError::Permanent(err.to_string())
        }
    }
}
