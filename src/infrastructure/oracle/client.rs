//! HTTP client for the classification oracle.
//!
//! Speaks an Ollama-compatible chat endpoint. Transport failures never
//! escape [`Oracle::classify`]: they become fallback classification
//! results carrying the raw error message, distinct from parse fallbacks.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, instrument};

use crate::domain::models::{ClassificationResult, OracleConfig, WorkflowRun};
use crate::domain::ports::Oracle;

use super::parser::parse_classification;
use super::prompt::{failure_analysis_prompt, SYSTEM_PROMPT};
use super::types::{
    ChatMessage, ChatOptions, ChatRequest, ChatResponse, OracleError, TagsResponse,
};

/// Timeout for the connectivity probe against `/api/tags`.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the oracle chat endpoint.
///
/// Constructed once at process start and injected into the analysis
/// stage; there is no shared global connection.
#[derive(Debug, Clone)]
pub struct OracleClient {
    http: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    log_excerpt_chars: usize,
}

impl OracleClient {
    pub fn new(config: &OracleConfig) -> Result<Self, OracleError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            log_excerpt_chars: config.log_excerpt_chars,
        })
    }

    /// Probe the oracle server and check the configured model is
    /// installed.
    #[instrument(skip(self))]
    pub async fn verify_connection(&self) -> Result<(), OracleError> {
        let response = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .timeout(VERIFY_TIMEOUT)
            .send()
            .await
            .map_err(|e| OracleError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status(status, body));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        if !tags.models.iter().any(|m| m.name == self.model) {
            return Err(OracleError::ModelUnavailable {
                model: self.model.clone(),
            });
        }

        info!(model = %self.model, "oracle server connected");
        Ok(())
    }

    /// One non-streaming chat exchange; returns the assistant's text.
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status(status, body));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;
        Ok(body.message.content)
    }

    /// Attach provenance to a freshly produced classification.
    fn stamp(&self, mut result: ClassificationResult, run: &WorkflowRun) -> ClassificationResult {
        result.model = self.model.clone();
        result.run_id = run.id;
        result.run_number = run.run_number;
        result
    }
}

#[async_trait]
impl Oracle for OracleClient {
    #[instrument(skip(self, run, logs), fields(run_number = run.run_number))]
    async fn classify(&self, run: &WorkflowRun, logs: &str) -> ClassificationResult {
        let excerpt: String = logs.chars().take(self.log_excerpt_chars).collect();
        let prompt = failure_analysis_prompt(run, &excerpt);
        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];

        debug!(model = %self.model, "requesting classification");
        let result = match self.chat(messages).await {
            Ok(text) => parse_classification(&text),
            Err(err) => {
                error!(error = %err, "oracle call failed");
                ClassificationResult::oracle_failure(&err.to_string())
            }
        };

        info!(
            category = result.error_category.as_str(),
            confidence = result.confidence_score,
            "classification complete"
        );
        self.stamp(result, run)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
