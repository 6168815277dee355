//! Model Invocation Interface
//!
//! The seam between the agents and whatever actually runs the language model.
//! Agents only ever see `ModelInvoker`, so tests substitute deterministic stubs.

use async_trait::async_trait;
use thiserror::Error;

/// Transport or provider failure while invoking the model
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("model API key not configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("provider error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("model returned no output")]
    EmptyResponse,
}

impl From<reqwest::Error> for InvocationError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

/// Per-agent model settings
#[derive(Debug, Clone, PartialEq)]
pub struct ModelProfile {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Offer the web search tool, with this many results per search
    pub search_results: Option<usize>,
}

impl ModelProfile {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            temperature: None,
            max_tokens: None,
            search_results: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_search(mut self, max_results: usize) -> Self {
        self.search_results = Some(max_results);
        self
    }
}

/// One model call: prompts plus optional enrichment context
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Extra material such as resume text
    pub context: Option<String>,
    pub profile: ModelProfile,
}

/// Anything that can turn a request into raw model text
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Run the model. Output shape is not guaranteed in any way.
    async fn invoke(&self, request: &ModelRequest) -> Result<String, InvocationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_builder() {
        let profile = ModelProfile::new("llama-3.3-70b-versatile")
            .with_temperature(0.5)
            .with_max_tokens(4096)
            .with_search(3);

        assert_eq!(profile.temperature, Some(0.5));
        assert_eq!(profile.max_tokens, Some(4096));
        assert_eq!(profile.search_results, Some(3));
    }

    #[test]
    fn test_invocation_error_display() {
        let err = InvocationError::Status {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert!(err.to_string().contains("429"));
    }
}
