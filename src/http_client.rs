//! HTTP client abstraction for the generation endpoint.
//!
//! The provider answers with a server-sent-events body that has to be read
//! incrementally, so the trait hands back the response as a stream of byte
//! chunks instead of a complete string. Tests inject canned chunk sequences
//! through the same seam.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;

/// A response body delivered chunk by chunk, in arrival order.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>>>;

/// Trait for HTTP communication with the generation endpoint.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a POST request with a JSON body and returns the response body
    /// as a stream of chunks.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the server answers
    /// with an error status. Errors while reading the body surface as error
    /// items in the stream.
    async fn post_json_stream(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<ByteStream>;
}

/// HTTP client implementation using reqwest.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client with default configuration.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json_stream(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<ByteStream> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let response = request.json(body).send().await?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "HTTP {}: {}",
                status.as_u16(),
                error_message(&text)
            ));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(anyhow::Error::from));
        Ok(stream.boxed())
    }
}

/// Pulls `error.message` out of a provider error body, falling back to the
/// raw text.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
