//! HTTP client implementation for the WellSaid API.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT},
    Client as ReqwestClient, Response,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// HTTP client for the WellSaid API.
///
/// Performs single attempts only: the composition dispatcher owns the
/// retry policy, so a segment's attempt budget stays exact.
pub struct HttpClient {
    client: ReqwestClient,
    base_url: String,
    api_key: String,
}

impl HttpClient {
    /// Creates a new HTTP client.
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let client = ReqwestClient::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Makes a JSON request to the API.
    pub async fn request<T, R>(&self, method: &str, path: &str, body: Option<&T>) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(method, path, body).await?;
        self.handle_response(response).await
    }

    /// Makes a request expecting a raw audio body.
    ///
    /// Returns the audio bytes and the response content type.
    pub async fn request_audio<T>(
        &self,
        method: &str,
        path: &str,
        body: Option<&T>,
    ) -> Result<(Bytes, String)>
    where
        T: Serialize + ?Sized,
    {
        let response = self.send(method, path, body).await?;

        if !response.status().is_success() {
            return Err(self.handle_error_response(response).await);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.starts_with("audio/") {
            return Err(Error::UnexpectedContentType(content_type));
        }

        Ok((response.bytes().await?, content_type))
    }

    /// Downloads bytes from an absolute URL (finished clip audio).
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(self.handle_error_response(response).await);
        }
        Ok(response.bytes().await?)
    }

    async fn send<T>(&self, method: &str, path: &str, body: Option<&T>) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);

        let mut request = match method {
            "GET" => self.client.get(&url),
            "POST" => self.client.post(&url),
            "DELETE" => self.client.delete(&url),
            _ => return Err(Error::Other(format!("unsupported method: {}", method))),
        };

        request = request.headers(self.default_headers());

        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Returns default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("X-Api-Key", value);
        }
        if let Ok(value) = HeaderValue::from_str(&generate_request_id()) {
            headers.insert(REQUEST_ID_HEADER, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("voxkit-wellsaid-rust/1.0"),
        );
        headers
    }

    /// Handles a JSON API response.
    async fn handle_response<R>(&self, response: Response) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let status = response.status();
        let request_id = header_value(&response, REQUEST_ID_HEADER);
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(parse_error(&body, status.as_u16(), &request_id));
        }

        serde_json::from_slice(&body).map_err(Error::from)
    }

    /// Handles an error response.
    async fn handle_error_response(&self, response: Response) -> Error {
        let status = response.status().as_u16();
        let request_id = header_value(&response, REQUEST_ID_HEADER);
        match response.bytes().await {
            Ok(body) => parse_error(&body, status, &request_id),
            Err(e) => Error::Http(e),
        }
    }
}

fn header_value(response: &Response, name: &str) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

/// Parses an error response body.
fn parse_error(body: &[u8], http_status: u16, request_id: &str) -> Error {
    if let Ok(api_err) = serde_json::from_slice::<ApiError>(body) {
        if !api_err.message.is_empty() {
            return Error::api_with_request_id(api_err.message, request_id, http_status);
        }
    }

    Error::api_with_request_id(
        String::from_utf8_lossy(body).to_string(),
        request_id,
        http_status,
    )
}

/// Generates a unique request ID.
pub(crate) fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// API error body.
#[derive(Debug, serde::Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod http_tests {
    use super::*;

    #[test]
    fn test_parse_error_json_message() {
        let err = parse_error(br#"{"message":"invalid speaker_id"}"#, 400, "req-1");
        match err {
            Error::Api {
                message,
                request_id,
                http_status,
            } => {
                assert_eq!(message, "invalid speaker_id");
                assert_eq!(request_id, "req-1");
                assert_eq!(http_status, 400);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_plain_body() {
        let err = parse_error(b"service unavailable", 503, "");
        assert!(err.is_server_error());
        assert!(err.to_string().contains("service unavailable"));
    }
}
