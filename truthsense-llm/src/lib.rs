//! Generative-model integration.
//!
//! Exposes a provider-agnostic [`traits::LlmClient`] and a concrete Gemini
//! implementation built on the shared HTTP layer. Requests are multimodal:
//! callers assemble ordered [`traits::Part`]s (text and inline images) and
//! pick one of the sampling presets on [`traits::GenerationConfig`].
//!
//! # Examples
//! ```no_run
//! use truthsense_llm::gemini::GeminiClient;
//! use truthsense_llm::traits::{GenerateRequest, GenerationConfig, LlmClient};
//!
//! # async fn demo() -> Result<(), truthsense_llm::traits::LlmError> {
//! let client = GeminiClient::new(
//!     "https://generativelanguage.googleapis.com/v1beta/",
//!     "api-key".into(),
//!     "gemini-2.0-flash-exp".into(),
//! )?;
//! let req = GenerateRequest::text_only("Is water wet?", GenerationConfig::claim_analysis());
//! let resp = client.generate(req).await?;
//! assert!(!resp.text.is_empty());
//! # Ok(()) }
//! ```
pub mod gemini;
pub mod traits;

pub use gemini::GeminiClient;
pub use traits::{GenerateRequest, GenerationConfig, LlmClient, LlmError, LlmResponse, Part};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
