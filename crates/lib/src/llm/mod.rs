//! Generation service abstraction and the Gemini client.
//!
//! The gateway depends only on [`GenerationService`]: prompt in, text out, with an optional
//! server-enforced response schema and an optional web-grounding tool.

mod gemini;

use async_trait::async_trait;

pub use gemini::GeminiClient;

/// One generation call.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    /// JSON schema the service must follow (Gemini `responseSchema` dialect).
    pub response_schema: Option<serde_json::Value>,
    /// Ask the service to ground the answer in live web search.
    pub web_grounding: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("generation api error: {0}")]
    Api(String),
    #[error("generation response contained no text")]
    EmptyResponse,
}

/// Turns a prompt into text. Implemented by [`GeminiClient`]; tests use in-memory fakes.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GenerationError>;
}
