//! Common types shared across TruthSense crates.
//!
//! This crate defines the verdict vocabulary, shared error types, and the
//! centralised observability helpers used by every binary and test harness.
//! It is intentionally lightweight so that all crates can depend on it
//! without introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`Verdict`]: The four-way categorical judgment on a claim or video
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`TruthSenseError`] and [`Result`]: Shared error handling
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod observability;

/// Categorical judgment produced for every analysed claim or video.
///
/// `Unverifiable` is the default and the value every degraded path falls
/// back to; no entry point ever returns without one of these four.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    True,
    False,
    Misleading,
    #[default]
    Unverifiable,
}

impl Verdict {
    /// Parse the verdict literal emitted by the model grammar.
    /// Case-insensitive; anything else is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            "misleading" => Some(Self::Misleading),
            "unverifiable" => Some(Self::Unverifiable),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Misleading => "MISLEADING",
            Self::Unverifiable => "UNVERIFIABLE",
        };
        f.write_str(s)
    }
}

/// Error types used across the TruthSense system.
#[derive(thiserror::Error, Debug)]
pub enum TruthSenseError {
    /// An analysis stage failed to complete a requested operation.
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// An upstream client (model, news, search, video) reported an error.
    #[error("Upstream error: {0}")]
    Upstream(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A referenced conversation could not be located.
    #[error("Conversation not found: {0}")]
    ConversationNotFound(Uuid),

    /// Operation exceeded the configured timeout.
    #[error("Timeout occurred")]
    Timeout,
}

/// Convenient alias for results that use [`TruthSenseError`].
pub type Result<T> = std::result::Result<T, TruthSenseError>;
