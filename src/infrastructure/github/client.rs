//! Resilient GitHub HTTP client.
//!
//! Wraps the GitHub REST API v3 with the behavior the control loop
//! depends on: every response's remaining-quota header is honored (zero
//! quota fails fast with the reset time), transient failures are retried
//! with exponential backoff, and all calls carry a fixed timeout so a
//! stalled peer never blocks a pass indefinitely.

use chrono::{DateTime, Utc};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::{GitHubConfig, RetryConfig, WorkflowRun};

use super::errors::GitHubApiError;
use super::retry::RetryPolicy;
use super::types::{
    LogsLocation, RateLimitResponse, RateLimitStatus, RepoInfo, WorkflowRunsResponse,
};

/// Page size used when walking completed runs.
const PAGE_SIZE: usize = 100;

/// Configuration for the GitHub client.
#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    /// Bearer token for authenticated requests.
    pub token: String,
    /// Base URL (overridable for testing/proxies).
    pub base_url: String,
    /// Request timeout in seconds (platform reads).
    pub timeout_secs: u64,
    /// Retry policy settings for transient failures.
    pub retry: RetryConfig,
}

impl GitHubClientConfig {
    /// Resolve a config from the loaded settings, falling back to the
    /// `GITHUB_TOKEN` environment variable for the token.
    pub fn resolve(github: &GitHubConfig, retry: &RetryConfig) -> Result<Self, GitHubApiError> {
        let token = github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                GitHubApiError::Configuration(
                    "GitHub token not configured and GITHUB_TOKEN is not set".to_string(),
                )
            })?;

        Ok(Self {
            token,
            base_url: github.base_url.trim_end_matches('/').to_string(),
            timeout_secs: github.timeout_secs,
            retry: retry.clone(),
        })
    }
}

/// HTTP client for the GitHub REST API v3.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl GitHubClient {
    /// Build a client with an explicit lifecycle: construct once at
    /// process start, inject into stages.
    pub fn new(config: GitHubClientConfig) -> Result<Self, GitHubApiError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| GitHubApiError::Configuration(format!("invalid token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(header::USER_AGENT, HeaderValue::from_static("mender"));

        // Redirects stay visible: log retrieval needs the Location header.
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::from_config(&config.retry),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// GET a JSON body, retrying transient failures.
    #[instrument(skip(self, params), fields(endpoint = %endpoint))]
    pub async fn fetch(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Value, GitHubApiError> {
        self.retry
            .execute(|| self.request_once(Method::GET, endpoint, params, None))
            .await
    }

    /// POST a JSON body (or nothing), retrying transient failures.
    /// Returns the response body, or `Value::Null` when the platform
    /// answers with an empty body (201/204).
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn submit(
        &self,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, GitHubApiError> {
        self.retry
            .execute(|| self.request_once(Method::POST, endpoint, &[], body))
            .await
    }

    async fn request_once(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, GitHubApiError> {
        let mut request = self.http.request(method, self.url(endpoint));
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.check_rate_limit(response.headers())?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.error_for(status, endpoint, response).await);
        }

        let text = response.text().await?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| GitHubApiError::Parse(e.to_string()))
    }

    /// Honor the remaining-quota header on every response. Zero quota
    /// fails fast with the reset time rather than retrying.
    fn check_rate_limit(&self, headers: &HeaderMap) -> Result<(), GitHubApiError> {
        let remaining = headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(1);

        if remaining == 0 {
            let reset_at = headers
                .get("x-ratelimit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<i64>().ok())
                .and_then(|secs| DateTime::from_timestamp(secs, 0));
            warn!(?reset_at, "GitHub API quota exhausted");
            return Err(GitHubApiError::RateLimitExceeded { reset_at });
        }
        Ok(())
    }

    async fn error_for(
        &self,
        status: StatusCode,
        endpoint: &str,
        response: reqwest::Response,
    ) -> GitHubApiError {
        let reset_at = response
            .headers()
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        let body = response.text().await.unwrap_or_default();

        match status {
            StatusCode::NOT_FOUND => GitHubApiError::NotFound(endpoint.to_string()),
            // A 403 is a potential secondary rate limit.
            StatusCode::FORBIDDEN => GitHubApiError::RateLimitExceeded { reset_at },
            s if s.is_server_error() => GitHubApiError::ServerError(s, body),
            s => GitHubApiError::InvalidRequest(s, body),
        }
    }

    /// Fetch repository metadata.
    pub async fn get_repo(&self, owner: &str, repo: &str) -> Result<RepoInfo, GitHubApiError> {
        debug!(owner, repo, "fetching repository");
        let value = self.fetch(&format!("repos/{owner}/{repo}"), &[]).await?;
        serde_json::from_value(value).map_err(|e| GitHubApiError::Parse(e.to_string()))
    }

    /// List one page of workflow runs, newest first.
    pub async fn list_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        branch: Option<&str>,
        status: Option<&str>,
        per_page: usize,
        page: usize,
    ) -> Result<WorkflowRunsResponse, GitHubApiError> {
        let mut params = vec![
            ("per_page", per_page.min(PAGE_SIZE).to_string()),
            ("page", page.to_string()),
        ];
        if let Some(branch) = branch {
            params.push(("branch", branch.to_string()));
        }
        if let Some(status) = status {
            params.push(("status", status.to_string()));
        }

        let value = self
            .fetch(&format!("repos/{owner}/{repo}/actions/runs"), &params)
            .await?;
        serde_json::from_value(value).map_err(|e| GitHubApiError::Parse(e.to_string()))
    }

    /// Walk pages of completed runs and collect those that concluded in
    /// failure, newest first.
    ///
    /// Stops early once `limit` failures are collected, or when a page
    /// comes back short (no more data). Page order is stable
    /// reverse-chronological, so `limit` always yields the most recent
    /// failures.
    #[instrument(skip(self))]
    pub async fn list_failed_runs(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        limit: Option<usize>,
    ) -> Result<Vec<WorkflowRun>, GitHubApiError> {
        info!(owner, repo, branch, ?limit, "fetching failed runs");
        let mut failed: Vec<WorkflowRun> = Vec::new();
        let mut page = 1;

        loop {
            let response = self
                .list_workflow_runs(owner, repo, Some(branch), Some("completed"), PAGE_SIZE, page)
                .await?;

            let page_len = response.workflow_runs.len();
            for run in response.workflow_runs {
                if run.is_failure() {
                    failed.push(run);
                    if let Some(limit) = limit {
                        if failed.len() >= limit {
                            return Ok(failed);
                        }
                    }
                }
            }

            if page_len < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(failed)
    }

    /// Locate a run's logs without downloading them.
    ///
    /// The platform answers with a redirect to external storage, a 410
    /// once logs age past the retention window, or something unexpected;
    /// all three are non-fatal. Callers never block waiting on log
    /// content that may not exist.
    pub async fn get_run_logs(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> Result<LogsLocation, GitHubApiError> {
        debug!(run_id, "locating run logs");
        let endpoint = format!("repos/{owner}/{repo}/actions/runs/{run_id}/logs");
        let response = self.http.get(self.url(&endpoint)).send().await?;
        self.check_rate_limit(response.headers())?;

        let status = response.status();
        if status.is_redirection() {
            let download_url = response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Ok(match download_url {
                Some(download_url) => LogsLocation::Redirect { download_url },
                None => LogsLocation::Unavailable,
            });
        }
        if status == StatusCode::GONE {
            return Ok(LogsLocation::Expired {
                message: "Logs have expired (logs are kept for 90 days)".to_string(),
            });
        }
        if !status.is_success() {
            return Err(self.error_for(status, &endpoint, response).await);
        }
        Ok(LogsLocation::Unavailable)
    }

    /// Re-trigger a run, restricted to its failed jobs only.
    pub async fn rerun_failed_jobs(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> Result<(), GitHubApiError> {
        info!(run_id, "re-running failed jobs");
        self.submit(
            &format!("repos/{owner}/{repo}/actions/runs/{run_id}/rerun-failed-jobs"),
            None,
        )
        .await?;
        Ok(())
    }

    /// Current API quota.
    pub async fn rate_limit_status(&self) -> Result<RateLimitStatus, GitHubApiError> {
        let value = self.fetch("rate_limit", &[]).await?;
        let response: RateLimitResponse =
            serde_json::from_value(value).map_err(|e| GitHubApiError::Parse(e.to_string()))?;
        Ok(response.rate)
    }
}
