use crate::traits::{GenerateRequest, LlmClient, LlmError, LlmResponse, Part};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Duration;
use truthsense_http::{Auth, HttpClient, HttpError, RequestOpts};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
    safety_settings: Vec<GeminiSafetySetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
enum GeminiPart {
    #[serde(rename = "text")]
    Text(String),
    #[serde(rename = "inlineData", rename_all = "camelCase")]
    InlineData { mime_type: String, data: String },
}

impl GeminiPart {
    fn from_part(part: Part) -> Self {
        match part {
            Part::Text(t) => Self::Text(t),
            Part::InlineImage { mime_type, data } => Self::InlineData { mime_type, data },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct GeminiSafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    total_token_count: Option<u32>,
}

/// Google Gemini API client over the shared HTTP layer.
///
/// The API key rides in a `key` query parameter. Model calls are never
/// retried at the HTTP layer; a failed generation degrades to an
/// unverifiable result upstream instead of burning quota on replays.
#[derive(Debug)]
pub struct GeminiClient {
    http: HttpClient,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(endpoint: &str, api_key: String, model: String) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("model API key is empty".into()));
        }
        let http = HttpClient::new(endpoint)
            .map_err(|e| LlmError::Config(e.to_string()))?
            .with_timeout(Duration::from_secs(60))
            .with_retries(0);
        Ok(Self {
            http,
            api_key,
            model,
        })
    }

    fn safety_settings() -> Vec<GeminiSafetySetting> {
        [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|category| GeminiSafetySetting {
            category: category.to_string(),
            threshold: "BLOCK_MEDIUM_AND_ABOVE".to_string(),
        })
        .collect()
    }

    fn map_http_error(err: HttpError) -> LlmError {
        match err {
            HttpError::Api {
                status, message, ..
            } => match status.as_u16() {
                429 => LlmError::RateLimit,
                401 | 403 => LlmError::InvalidKey,
                code => LlmError::Api {
                    status: code,
                    message,
                },
            },
            HttpError::Network(m) => LlmError::Network(m),
            other => LlmError::Network(other.to_string()),
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<LlmResponse, LlmError> {
        let path = format!("models/{}:generateContent", self.model);

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: request
                    .parts
                    .into_iter()
                    .map(GeminiPart::from_part)
                    .collect(),
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.config.temperature,
                top_p: request.config.top_p,
                top_k: request.config.top_k,
                max_output_tokens: request.config.max_output_tokens,
            },
            safety_settings: Self::safety_settings(),
            system_instruction: request.system_instruction.map(|text| GeminiContent {
                parts: vec![GeminiPart::Text(text)],
            }),
        };

        tracing::debug!(
            target: "llm.gemini",
            model = %self.model,
            temperature = body.generation_config.temperature,
            max_output_tokens = body.generation_config.max_output_tokens,
            "llm.generate.start"
        );

        let opts = RequestOpts {
            retries: Some(0),
            auth: Some(Auth::Query {
                name: "key",
                value: Cow::Borrowed(&self.api_key),
            }),
            ..Default::default()
        };

        let response: GeminiResponse = self
            .http
            .post_json(&path, &body, opts)
            .await
            .map_err(Self::map_http_error)?;

        let candidate = response.candidates.into_iter().next().ok_or(LlmError::Empty)?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            tracing::warn!(target: "llm.gemini", "llm.generate.blocked");
            return Err(LlmError::Blocked);
        }

        let text = candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or(LlmError::Empty)?;

        let tokens_used = response.usage_metadata.and_then(|u| u.total_token_count);
        tracing::debug!(
            target: "llm.gemini",
            text_len = text.len(),
            ?tokens_used,
            "llm.generate.done"
        );

        Ok(LlmResponse {
            text,
            model: Some(self.model.clone()),
            tokens_used,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
