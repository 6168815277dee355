//! Configuration management

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::agent::RetryPolicy;

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_FAST_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_RESEARCH_MODEL: &str = "llama-3.3-70b-versatile";

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Groq API key (model calls fail without it; agents fall back)
    pub groq_api_key: Option<String>,

    /// OpenAI-compatible base URL
    pub groq_base_url: String,

    /// Tavily API key (search tool is reported unavailable without it)
    pub tavily_api_key: Option<String>,

    /// Model for questions and level detection
    pub fast_model: String,

    /// Model for tracks and roadmap
    pub research_model: String,

    /// SQLite database path
    pub db_path: PathBuf,

    pub bind_addr: String,
    pub port: u16,

    /// Attempts per agent call before falling back
    pub max_attempts: usize,

    /// Base backoff; attempt `n` (0-based) waits `base * (n + 1)`
    pub backoff_base: Duration,

    /// Optional resume used to tailor questions
    pub resume_path: PathBuf,

    /// Search rounds before the model must answer
    pub max_tool_rounds: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let groq_api_key = non_empty_var("GROQ_API_KEY");
        let tavily_api_key = non_empty_var("TAVILY_API_KEY");

        let groq_base_url = std::env::var("GROQ_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_GROQ_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let fast_model = std::env::var("PATHFINDER_FAST_MODEL")
            .unwrap_or_else(|_| DEFAULT_FAST_MODEL.to_string());

        let research_model = std::env::var("PATHFINDER_RESEARCH_MODEL")
            .unwrap_or_else(|_| DEFAULT_RESEARCH_MODEL.to_string());

        let db_path = std::env::var("PATHFINDER_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("pathfinder")
                    .join("pathfinder.db")
            });

        let bind_addr = std::env::var("PATHFINDER_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = match std::env::var("PATHFINDER_PORT") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("PATHFINDER_PORT is not a valid port: {}", v))?,
            Err(_) => 8000,
        };

        let max_attempts = std::env::var("PATHFINDER_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        let backoff_base = std::env::var("PATHFINDER_BACKOFF_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(2));

        let resume_path = std::env::var("PATHFINDER_RESUME_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/resume.txt"));

        let max_tool_rounds = std::env::var("PATHFINDER_MAX_TOOL_ROUNDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            groq_api_key,
            groq_base_url,
            tavily_api_key,
            fast_model,
            research_model,
            db_path,
            bind_addr,
            port,
            max_attempts,
            backoff_base,
            resume_path,
            max_tool_rounds,
        })
    }

    /// Retry policy shared by all agents
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.backoff_base)
    }

    /// Socket address string for the HTTP server
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Resume text, if the configured file exists and is not blank
    pub fn load_resume(&self) -> Option<String> {
        load_resume(&self.resume_path)
    }
}

/// Read a resume file. Missing or blank files are not an error.
pub fn load_resume(path: &Path) -> Option<String> {
    if !path.exists() {
        debug!("No resume at {}", path.display());
        return None;
    }

    match std::fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => None,
        Err(e) => {
            warn!("Failed to read resume {}: {}", path.display(), e);
            None
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
