//! Generative text backend: the streaming "submit prompt, receive
//! incremental text" capability the orchestrator drives.
//!
//! [`AiTextService`] is the seam. [`gemini::GeminiTextService`] is the
//! shipped HTTP adapter; tests substitute scripted services.

pub mod error;
pub mod gemini;
pub mod prompts;
pub mod sse;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

pub use error::AiError;
pub use prompts::PromptTemplateId;

/// Incremental text from one submission.
///
/// Each `Ok` item is the next fragment, in arrival order. An `Err` item is
/// terminal. Dropping the stream cancels the submission and releases the
/// underlying connection.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, AiError>> + Send>>;

/// A streaming text-generation backend.
#[async_trait]
pub trait AiTextService: Send + Sync {
    /// Backend name for logs, e.g. `"gemini"`.
    fn name(&self) -> &str;

    /// Submit an instruction and the on-screen context.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request cannot be started (missing key,
    /// transport failure, non-success HTTP status). Failures after the
    /// stream has started arrive as an `Err` item instead.
    async fn submit(&self, prompt: &str, context: &str) -> Result<TextStream, AiError>;
}
