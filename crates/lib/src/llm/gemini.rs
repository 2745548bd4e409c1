//! Gemini `generateContent` client.
//!
//! One non-streaming POST per call. The response schema, when present, goes into
//! `generationConfig`; web grounding is the `google_search` tool.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{self, Config, ConfigError};
use crate::llm::{GenerateRequest, GenerationError, GenerationService};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from config. Fails when no API key resolves, so no gateway exists without one.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config::resolve_api_key(config).ok_or(ConfigError::MissingApiKey)?;
        Ok(Self::new(
            config.generation.base_url.clone(),
            config.generation.model.clone(),
            api_key,
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    /// POST /models/{model}:generateContent; returns the first candidate's text.
    async fn generate(&self, request: GenerateRequest) -> Result<String, GenerationError> {
        let url = self.endpoint();
        let body = GenerateContentRequest::from(request);
        log::debug!(
            "gemini: POST {} (schema: {}, grounding: {})",
            url,
            body.generation_config.is_some(),
            body.tools.is_some()
        );
        let res = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(GenerationError::Api(format!("{} {}", status, body)));
        }
        let data: GenerateContentResponse = res.json().await?;
        data.text().ok_or(GenerationError::EmptyResponse)
    }
}

// --- wire types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfigWire>,
}

impl From<GenerateRequest> for GenerateContentRequest {
    fn from(request: GenerateRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(request.prompt),
                }],
            }],
            tools: request.web_grounding.then(|| {
                vec![Tool {
                    google_search: serde_json::Map::new(),
                }]
            }),
            generation_config: request.response_schema.map(|schema| GenerationConfigWire {
                response_mime_type: "application/json".to_string(),
                response_schema: schema,
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigWire {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate; None when there is no text at all.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
