use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use rfpcat_core::config::{LlmConfig, OllamaConfig, DEFAULT_HEADING_MARKER};

use crate::provider::{LlmError, LlmProvider, Message};

pub const SYSTEM_PROMPT: &str =
    "You are an expert in construction proposals and document categorization.";

/// Fixed message returned to HTTP clients when categorization fails.
pub const CATEGORIZE_FAILED: &str = "Failed to categorize RFP";

/// Turns raw RFP text into sectioned text whose heading lines carry the
/// heading marker.
#[async_trait]
pub trait Categorizer: Send + Sync {
    async fn categorize(&self, rfp_text: &str) -> Result<String, CategorizeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CategorizeError {
    #[error("nothing to categorize: the RFP text is empty")]
    EmptyInput,
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    /// Failure reported by a remote categorization service.
    #[error("categorization service error: {0}")]
    Remote(String),
}

/// Body of `POST /api/generate?endpoint=categorize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizeRequest {
    #[serde(rename = "rfpText")]
    pub rfp_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizeResponse {
    #[serde(rename = "categorizedRFP")]
    pub categorized_rfp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Categorizes RFPs with one chat completion per request. No retries.
pub struct RfpCategorizer {
    provider: Box<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
    heading_marker: String,
}

impl RfpCategorizer {
    pub fn new(provider: Box<dyn LlmProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
            heading_marker: DEFAULT_HEADING_MARKER.to_string(),
        }
    }

    /// Heading marker the model is told to use. Must match the parser's.
    pub fn with_heading_marker(mut self, marker: impl Into<String>) -> Self {
        self.heading_marker = marker.into();
        self
    }

    /// Build from config, creating the appropriate provider.
    pub fn from_config(
        llm_config: &LlmConfig,
        ollama_config: &OllamaConfig,
        heading_marker: &str,
    ) -> Result<Self, LlmError> {
        let provider = crate::providers::create_provider(llm_config, ollama_config)?;
        Ok(Self::new(provider, llm_config.temperature, llm_config.max_tokens)
            .with_heading_marker(heading_marker))
    }

    pub fn heading_marker(&self) -> &str {
        &self.heading_marker
    }

    fn user_prompt(&self, rfp_text: &str) -> String {
        let marker = &self.heading_marker;
        format!(
            "Please categorize and organize the following detailed RFP by creating appropriate \
             headings and subheadings for each section. Ensure that each section includes specific \
             and relevant details.\n\n\
             Start every section heading on its own line with \"{marker} \" (the marker followed \
             by one space), for example \"{marker} Project Overview\". Do not use \"{marker} \" \
             anywhere else.\n\n\
             {rfp_text}\n\n\
             Make sure that each point is detailed, reflects the content, and organizes the \
             information in a logical, structured manner."
        )
    }
}

#[async_trait]
impl Categorizer for RfpCategorizer {
    async fn categorize(&self, rfp_text: &str) -> Result<String, CategorizeError> {
        if rfp_text.trim().is_empty() {
            return Err(CategorizeError::EmptyInput);
        }

        info!(
            provider = %self.provider.describe(),
            chars = rfp_text.len(),
            "categorizing RFP"
        );

        let messages = vec![Message::system(SYSTEM_PROMPT), Message::user(self.user_prompt(rfp_text))];
        let categorized = self
            .provider
            .complete(messages, self.temperature, self.max_tokens)
            .await?;

        debug!(chars = categorized.len(), "categorized RFP received");
        Ok(categorized)
    }
}
