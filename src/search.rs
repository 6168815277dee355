//! Web Search
//!
//! Tavily-backed search used as the `web_search` tool during track and
//! roadmap generation. Results are rendered to plain text for the model.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// Longest snippet kept per result
const MAX_SNIPPET_CHARS: usize = 400;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("TAVILY_API_KEY not configured")]
    MissingApiKey,

    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// Anything that can answer a web query
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError>;
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Tavily search API client
#[derive(Clone)]
pub struct TavilyClient {
    client: Client,
    api_key: Option<String>,
}

impl TavilyClient {
    pub fn new(api_key: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.map(|s| s.to_string()),
        }
    }

    /// Create from config
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(config.tavily_api_key.as_deref())
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;

        debug!("Tavily search: query={:?}, max_results={}", query, max_results);

        let response = self
            .client
            .post(TAVILY_SEARCH_URL)
            .timeout(Duration::from_secs(20))
            .json(&SearchRequest {
                api_key,
                query,
                max_results,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status { status, body });
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.results.into_iter().take(max_results).collect())
    }
}

/// Render hits as numbered plain text for a tool message
pub fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results for: {}", query);
    }

    let mut lines = vec![format!("Results for: {}\n", query)];
    for (i, hit) in hits.iter().enumerate() {
        lines.push(format!("{}. {}\n   {}", i + 1, hit.title, hit.url));
        let snippet = hit.content.trim();
        if !snippet.is_empty() {
            let snippet: String = snippet.chars().take(MAX_SNIPPET_CHARS).collect();
            lines.push(format!("   {}", snippet));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hits() {
        let hits = vec![
            SearchHit {
                title: "Kubernetes Course".to_string(),
                url: "https://www.youtube.com/watch?v=X48VuDVv0do".to_string(),
                content: "Full course for beginners".to_string(),
            },
            SearchHit {
                title: "Docs".to_string(),
                url: "https://kubernetes.io/docs".to_string(),
                content: String::new(),
            },
        ];

        let text = format_hits("learn kubernetes", &hits);
        assert!(text.starts_with("Results for: learn kubernetes"));
        assert!(text.contains("1. Kubernetes Course\n   https://www.youtube.com/watch?v=X48VuDVv0do"));
        assert!(text.contains("   Full course for beginners"));
        assert!(text.contains("2. Docs"));
    }

    #[test]
    fn test_format_no_hits() {
        assert_eq!(format_hits("rust jobs", &[]), "No results for: rust jobs");
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let parsed: SearchResponse =
            serde_json::from_str(r#"{"query":"q","results":[{"url":"https://a.dev"}]}"#).unwrap();
        assert_eq!(parsed.results[0].url, "https://a.dev");
        assert!(parsed.results[0].title.is_empty());
    }

    #[tokio::test]
    async fn test_search_without_key() {
        let client = TavilyClient::new(None);
        assert!(!client.is_available());
        assert!(matches!(
            client.search("anything", 3).await,
            Err(SearchError::MissingApiKey)
        ));
    }
}
