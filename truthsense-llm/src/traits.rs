use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One piece of a multimodal request: plain text or an inline image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Part {
    Text(String),
    /// Base64-encoded image bytes plus their MIME type.
    InlineImage { mime_type: String, data: String },
}

impl Part {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Build an inline image part from raw bytes.
    pub fn image_from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        use base64::Engine as _;
        Self::InlineImage {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// Sampling parameters forwarded to the model verbatim.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Near-deterministic settings for claim and video verdicts.
    pub fn claim_analysis() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 4096,
        }
    }

    /// Settings for structured content classification output.
    pub fn content_classification() -> Self {
        Self {
            temperature: 0.15,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }

    /// Coldest settings; frame forensics must not improvise.
    pub fn frame_forensics() -> Self {
        Self {
            temperature: 0.02,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 3072,
        }
    }

    /// Short creative output for conversation titles.
    pub fn chat_title() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 50,
        }
    }
}

/// A complete generation request: optional system instruction, ordered
/// user parts, and sampling config.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub system_instruction: Option<String>,
    pub parts: Vec<Part>,
    pub config: GenerationConfig,
}

impl GenerateRequest {
    pub fn text_only(prompt: impl Into<String>, config: GenerationConfig) -> Self {
        Self {
            system_instruction: None,
            parts: vec![Part::Text(prompt.into())],
            config,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Invalid or unauthorized API key")]
    InvalidKey,

    #[error("Content blocked by safety filters")]
    Blocked,

    #[error("Model returned no usable content")]
    Empty,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Provider-agnostic interface to a generative model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one generation request and return the first candidate's text.
    async fn generate(&self, request: GenerateRequest) -> Result<LlmResponse, LlmError>;

    /// Check whether the model endpoint is reachable and accepting requests.
    async fn health_check(&self) -> bool {
        let req = GenerateRequest::text_only("Respond with just 'OK'", GenerationConfig::chat_title());
        match self.generate(req).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(target: "llm", error = %e, "llm.health_check.failed");
                false
            }
        }
    }

    /// Name of the model backing this client.
    fn model_name(&self) -> &str;
}
