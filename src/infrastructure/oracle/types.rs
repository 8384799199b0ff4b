//! Wire types for the Ollama-compatible chat endpoint.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Generation options. Temperature stays at 0.0 so classifications are
/// deterministic for a given input.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOptions {
    pub temperature: f64,
    pub num_predict: u32,
}

/// Request body for `/api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub options: ChatOptions,
}

/// Response body of `/api/chat` (non-streaming).
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
}

/// Response body of `/api/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// One installed model, as listed by `/api/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

/// Errors from the oracle transport. These never escape the analysis
/// stage: the adapter converts them into fallback classification results.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Cannot connect to oracle server: {0}")]
    Connection(String),

    #[error("Model {model} not available on the oracle server")]
    ModelUnavailable { model: String },

    #[error("Oracle request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Oracle returned {0}: {1}")]
    Status(StatusCode, String),

    #[error("Oracle response body malformed: {0}")]
    Malformed(String),
}
