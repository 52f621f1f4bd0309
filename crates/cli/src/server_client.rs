//! HTTP client for categorizing through a running rfpcat server.
//!
//! When `--server` is set, the CLI still decodes and selects files locally
//! but sends the submission text to `POST /api/generate?endpoint=categorize`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::debug;

use rfpcat_llm::{
    CategorizeError, CategorizeRequest, CategorizeResponse, Categorizer, ErrorResponse, LlmError,
};

/// Client for the rfpcat server's categorization endpoint.
pub struct ServerClient {
    base_url: String,
    http: reqwest::Client,
}

impl ServerClient {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::new();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn categorize_url(&self) -> String {
        format!("{}/api/generate?endpoint=categorize", self.base_url)
    }

    /// Check if the server is reachable and has a categorizer configured.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let resp = self
            .http
            .get(&url)
            .timeout(std::time::Duration::from_secs(3))
            .send()
            .await
            .context("server not reachable")?;

        if !resp.status().is_success() {
            bail!("server returned {}", resp.status());
        }
        let health: serde_json::Value = resp.json().await.context("failed to parse health response")?;
        if health["categorizer_ready"] == false {
            bail!("server has no LLM provider configured");
        }
        Ok(())
    }
}

#[async_trait]
impl Categorizer for ServerClient {
    async fn categorize(&self, rfp_text: &str) -> Result<String, CategorizeError> {
        if rfp_text.trim().is_empty() {
            return Err(CategorizeError::EmptyInput);
        }

        debug!(url = %self.categorize_url(), chars = rfp_text.len(), "posting RFP to server");
        let resp = self
            .http
            .post(self.categorize_url())
            .json(&CategorizeRequest {
                rfp_text: rfp_text.to_string(),
            })
            .send()
            .await
            .map_err(LlmError::from)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CategorizeError::Remote(remote_message(status, &body)));
        }

        let body: CategorizeResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;
        Ok(body.categorized_rfp)
    }
}

/// `server returned <status>: <error>`, using the `{error}` field when the
/// body carries one.
fn remote_message(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.trim().to_string());
    format!("server returned {}: {}", status, detail)
}
