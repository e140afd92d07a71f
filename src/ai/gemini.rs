//! Gemini streaming adapter.
//!
//! Calls `POST {base}/v1beta/models/{model}:streamGenerateContent?alt=sse`
//! and turns each SSE chunk's candidate text parts into increments.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use futures_util::StreamExt;
//! use screenwise::ai::AiTextService;
//! use screenwise::ai::gemini::{GeminiConfig, GeminiTextService};
//! use screenwise::credentials::StaticSecrets;
//!
//! # async fn example() -> Result<(), screenwise::ai::AiError> {
//! let service = GeminiTextService::new(
//!     GeminiConfig::new("gemini-2.0-flash"),
//!     Arc::new(StaticSecrets::new("AIza...")),
//! );
//! let mut stream = service.submit("Summarize.", "Some text").await?;
//! while let Some(fragment) = stream.next().await {
//!     print!("{}", fragment?);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::{Value, json};

use super::error::AiError;
use super::prompts::compose;
use super::sse::{SseEvent, SseLineParser};
use super::{AiTextService, TextStream};
use crate::config::AiConfig;
use crate::credentials::SecretsProvider;

/// Configuration for the Gemini adapter.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL (defaults to `https://generativelanguage.googleapis.com`).
    pub base_url: String,
    /// The model to use.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
}

impl GeminiConfig {
    pub fn new(model: impl Into<String>) -> Self {
        let defaults = AiConfig::default();
        Self {
            base_url: defaults.base_url,
            model: model.into(),
            temperature: defaults.temperature,
            max_output_tokens: defaults.max_output_tokens,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl From<&AiConfig> for GeminiConfig {
    fn from(config: &AiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Build the `streamGenerateContent` request body.
pub fn build_request_body(config: &GeminiConfig, prompt: &str, context: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": compose(prompt, context) }]
        }],
        "generationConfig": {
            "temperature": config.temperature,
            "maxOutputTokens": config.max_output_tokens
        }
    })
}

/// Text parts of the first candidate in one stream chunk.
///
/// # Errors
///
/// Returns [`AiError::InvalidResponse`] for malformed JSON or a blocked
/// prompt, and the mapped error for an inline `error` object.
pub fn parse_stream_chunk(data: &str) -> Result<Option<String>, AiError> {
    let value: Value = serde_json::from_str(data)
        .map_err(|e| AiError::InvalidResponse(format!("malformed stream chunk: {e}")))?;

    if let Some(error) = value.get("error") {
        let status = error
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or(0);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(map_status(status, message));
    }

    if let Some(reason) = value
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(Value::as_str)
    {
        return Err(AiError::InvalidResponse(format!("prompt blocked: {reason}")));
    }

    let Some(candidate) = value.get("candidates").and_then(|c| c.get(0)) else {
        return Ok(None);
    };

    let text: String = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        if candidate.get("finishReason").and_then(Value::as_str) == Some("SAFETY") {
            return Err(AiError::InvalidResponse(
                "response blocked by safety filters".into(),
            ));
        }
        return Ok(None);
    }
    Ok(Some(text))
}

/// Map an HTTP status (plus error message) to an [`AiError`].
pub fn map_status(status: u16, message: &str) -> AiError {
    let lowered = message.to_ascii_lowercase();
    match status {
        400 if lowered.contains("api key") || lowered.contains("api_key_invalid") => {
            AiError::AuthError(format!("Gemini rejected the API key: {message}"))
        }
        401 | 403 => AiError::AuthError(format!("Gemini authentication failed: {message}")),
        429 => AiError::RateLimited(format!("Gemini quota exceeded: {message}")),
        500 | 502 | 503 | 504 => {
            AiError::NetworkError(format!("Gemini unavailable (HTTP {status}): {message}"))
        }
        _ => AiError::ProviderError(format!("Gemini HTTP {status}: {message}")),
    }
}

/// Extract `error.message` from a Gemini error body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_owned())
}

/// Streaming text service backed by the Gemini API.
pub struct GeminiTextService {
    config: GeminiConfig,
    client: reqwest::Client,
    secrets: Arc<dyn SecretsProvider>,
}

impl std::fmt::Debug for GeminiTextService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiTextService")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl GeminiTextService {
    pub fn new(config: GeminiConfig, secrets: Arc<dyn SecretsProvider>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            secrets,
        }
    }
}

#[async_trait]
impl AiTextService for GeminiTextService {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn submit(&self, prompt: &str, context: &str) -> Result<TextStream, AiError> {
        let api_key = self
            .secrets
            .api_key()
            .ok_or_else(|| AiError::AuthError("no API key configured".into()))?;

        let body = build_request_body(&self.config, prompt, context);
        tracing::debug!(
            model = %self.config.model,
            context_chars = context.chars().count(),
            "submitting Gemini stream request"
        );

        let response = self
            .client
            .post(self.config.stream_url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::NetworkError(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(map_status(
                status.as_u16(),
                &extract_error_message(&body_text),
            ));
        }

        let mut bytes = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut parser = SseLineParser::new();
            loop {
                match bytes.next().await {
                    Some(Ok(chunk)) => {
                        for event in parser.push(&chunk) {
                            match chunk_text(&event) {
                                Ok(Some(text)) => yield Ok(text),
                                Ok(None) => {}
                                Err(e) => {
                                    yield Err(e);
                                    return;
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        yield Err(AiError::NetworkError(format!("stream read error: {e}")));
                        return;
                    }
                    None => {
                        if let Some(event) = parser.flush() {
                            match chunk_text(&event) {
                                Ok(Some(text)) => yield Ok(text),
                                Ok(None) => {}
                                Err(e) => yield Err(e),
                            }
                        }
                        return;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

fn chunk_text(event: &SseEvent) -> Result<Option<String>, AiError> {
    if event.data.trim() == "[DONE]" {
        return Ok(None);
    }
    parse_stream_chunk(&event.data)
}
