use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::io::Write;
use tracing::{debug, info};

use crate::config::Config;
use crate::http_client::{ByteStream, HttpClient, ReqwestHttpClient};
use crate::sse::SseParser;

/// Generated text delivered piece by piece. Finite and not restartable.
pub type FragmentStream = BoxStream<'static, Result<String>>;

#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// Model identifier shown to the user.
    fn model_name(&self) -> &str;

    /// Submits the prompt and returns the response as a lazy fragment stream.
    async fn stream_fragments(&self, prompt: &str) -> Result<FragmentStream>;
}

pub struct GeminiGenerator<H: HttpClient = ReqwestHttpClient> {
    http: H,
    api_key: String,
    model: String,
    temperature: f32,
    base_url: String,
}

impl GeminiGenerator<ReqwestHttpClient> {
    pub fn new(config: &Config, api_key: String) -> Self {
        Self::with_http_client(ReqwestHttpClient::new(), config, api_key)
    }
}

impl<H: HttpClient> GeminiGenerator<H> {
    pub fn with_http_client(http: H, config: &Config, api_key: String) -> Self {
        Self {
            http,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ],
            "generationConfig": {
                "temperature": self.temperature
            }
        })
    }
}

#[async_trait]
impl<H: HttpClient> CodeGenerator for GeminiGenerator<H> {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn stream_fragments(&self, prompt: &str) -> Result<FragmentStream> {
        let url = self.stream_url();
        info!("Requesting streamed generation from {}", self.model);
        debug!("POST {}", url);

        let headers = [
            ("x-goog-api-key", self.api_key.as_str()),
            ("content-type", "application/json"),
        ];
        let bytes = self
            .http
            .post_json_stream(&url, &headers, &self.request_body(prompt))
            .await?;

        Ok(decode_fragments(bytes))
    }
}

struct FragmentDecoder {
    bytes: ByteStream,
    parser: SseParser,
    events: VecDeque<String>,
    finished: bool,
}

/// Turns an SSE response body into text fragments, one per event that
/// carries text. The first error ends the stream.
pub fn decode_fragments(bytes: ByteStream) -> FragmentStream {
    let decoder = FragmentDecoder {
        bytes,
        parser: SseParser::new(),
        events: VecDeque::new(),
        finished: false,
    };

    stream::unfold(decoder, |mut decoder| async move {
        loop {
            if let Some(data) = decoder.events.pop_front() {
                match fragment_from_event(&data) {
                    Ok(Some(text)) => return Some((Ok(text), decoder)),
                    Ok(None) => continue,
                    Err(e) => {
                        decoder.finished = true;
                        decoder.events.clear();
                        return Some((Err(e), decoder));
                    }
                }
            }

            if decoder.finished {
                return None;
            }

            match decoder.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = decoder.parser.feed_bytes(&chunk);
                    decoder.events.extend(events);
                }
                Some(Err(e)) => {
                    decoder.finished = true;
                    return Some((Err(e.context("Stream read error")), decoder));
                }
                None => {
                    decoder.finished = true;
                    let tail = decoder.parser.finish();
                    decoder.events.extend(tail);
                }
            }
        }
    })
    .boxed()
}

/// Extracts the text of one streamed response chunk.
///
/// Returns `Ok(None)` for chunks without text, such as a trailing
/// usage-metadata chunk.
pub fn fragment_from_event(data: &str) -> Result<Option<String>> {
    let value: Value = serde_json::from_str(data)
        .with_context(|| format!("Malformed stream event: {}", data))?;

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown provider error");
        return Err(anyhow!("Provider error: {}", message));
    }

    let parts = value
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array);

    if parts.is_none() {
        if let Some(reason) = value
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
        {
            return Err(anyhow!("Prompt blocked by provider: {}", reason));
        }
    }

    let text: String = parts
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

/// Writes every fragment to `out` as soon as it arrives and returns their
/// concatenation in arrival order.
pub async fn stream_to_writer<W: Write>(
    mut fragments: FragmentStream,
    out: &mut W,
) -> Result<String> {
    let mut full_response = String::new();

    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        write!(out, "{}", fragment)?;
        out.flush()?;
        full_response.push_str(&fragment);
    }

    Ok(full_response)
}

/// Offline generator returning canned fragments; needs no credential.
pub struct MockGenerator;

impl MockGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn mock_fragments(&self, prompt: &str) -> Vec<String> {
        let fence = prompt
            .split("```")
            .nth(1)
            .and_then(|s| s.split_whitespace().next())
            .unwrap_or("text")
            .to_string();
        let description = prompt
            .split_once("Description:\n")
            .map(|(_, d)| d.trim())
            .unwrap_or_default();
        let comment = match fence.as_str() {
            "python" | "ruby" | "bash" | "sh" | "shell" | "perl" | "r" => "#",
            "sql" | "lua" | "haskell" => "--",
            _ => "//",
        };

        vec![
            format!("```{}\n", fence),
            format!("{} Mock implementation for: {}\n", comment, description),
            format!("{} Generated offline, no request was sent\n", comment),
            "```".to_string(),
        ]
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CodeGenerator for MockGenerator {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn stream_fragments(&self, prompt: &str) -> Result<FragmentStream> {
        let fragments = self.mock_fragments(prompt);
        Ok(stream::iter(fragments.into_iter().map(Ok)).boxed())
    }
}
