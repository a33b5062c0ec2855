use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::config::AiConfig;

const GENERATION_PATH: &str = "/services/aigc/text-generation/generation";

#[derive(Error, Debug)]
pub enum AiError {
    #[error("AI service is not configured: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} error: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Response carried no message content")]
    MissingContent,

    #[error("Failed to parse model output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Incomplete model output: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
}

/// A text-generation backend: prompt in, free-form text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model name, stamped onto generated plans.
    fn model(&self) -> &str;

    async fn generate(&self, request: GenerationRequest) -> Result<Completion, AiError>;
}

/// Client for the DashScope (Bailian) text-generation endpoint.
pub struct DashScopeClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    output: Option<GenerationOutput>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct GenerationOutput {
    #[serde(default)]
    choices: Vec<GenerationChoice>,
}

#[derive(Debug, Deserialize)]
struct GenerationChoice {
    message: GenerationMessage,
}

#[derive(Debug, Deserialize)]
struct GenerationMessage {
    content: Option<String>,
}

impl DashScopeClient {
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), GENERATION_PATH)
    }
}

#[async_trait]
impl TextGenerator for DashScopeClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Completion, AiError> {
        if self.api_key.is_empty() {
            return Err(AiError::Config("BAILIAN_API_KEY is empty".to_string()));
        }

        let mut parameters = json!({ "result_format": "message" });
        if let Some(temperature) = request.temperature {
            parameters["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            parameters["max_tokens"] = json!(max_tokens);
        }

        let body = json!({
            "model": self.model,
            "input": { "messages": request.messages },
            "parameters": parameters,
        });

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status { status, body });
        }

        let parsed: GenerationResponse = response.json().await?;
        let content = parsed
            .output
            .and_then(|output| output.choices.into_iter().next())
            .and_then(|choice| choice.message.content)
            .ok_or(AiError::MissingContent)?;

        Ok(Completion {
            content,
            usage: parsed.usage.unwrap_or_default(),
        })
    }
}
