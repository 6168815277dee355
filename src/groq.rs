//! Groq API Client
//!
//! OpenAI-compatible chat completions client. Agents whose profile enables
//! search get a `web_search` tool; the client answers tool calls through a
//! `WebSearch` backend for a bounded number of rounds, then asks for the
//! final answer with tools withheld.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::model::{InvocationError, ModelInvoker, ModelProfile, ModelRequest};
use crate::search::{format_hits, WebSearch};

const SEARCH_TOOL: &str = "web_search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Chat message in the OpenAI wire format
#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn system(content: &str) -> Self {
        Self::text("system", content)
    }

    fn user(content: &str) -> Self {
        Self::text("user", content)
    }

    fn text(role: &'static str, content: &str) -> Self {
        Self {
            role,
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    fn assistant(reply: &AssistantMessage) -> Self {
        Self {
            role: "assistant",
            content: reply.content.clone(),
            tool_calls: reply.tool_calls.clone(),
            tool_call_id: None,
        }
    }

    fn tool(call_id: &str, content: String) -> Self {
        Self {
            role: "tool",
            content: Some(content),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

/// API request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
}

/// API response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    tool_calls: Vec<ToolCall>,
}

/// Providers send `"tool_calls": null` as often as they omit it
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Groq API client
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    search: Option<Arc<dyn WebSearch>>,
    max_tool_rounds: usize,
}

impl GroqClient {
    pub fn new(api_key: Option<&str>, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.map(|s| s.to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
            search: None,
            max_tool_rounds: 5,
        }
    }

    /// Create from config, without a search backend
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(config.groq_api_key.as_deref(), &config.groq_base_url)
            .with_max_tool_rounds(config.max_tool_rounds)
    }

    /// Back the `web_search` tool with `search`
    pub fn with_search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Check if API key is configured
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(
        &self,
        profile: &ModelProfile,
        messages: &[ChatMessage],
        tools: Option<Vec<Value>>,
    ) -> Result<AssistantMessage, InvocationError> {
        let api_key = self.api_key.as_deref().ok_or(InvocationError::MissingApiKey)?;

        let request = ChatRequest {
            model: &profile.model,
            messages,
            temperature: profile.temperature,
            max_tokens: profile.max_tokens,
            tools,
        };

        debug!(
            "Calling Groq API: model={}, messages={}, tools={}",
            profile.model,
            messages.len(),
            request.tools.is_some()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(InvocationError::Status { status, body });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| InvocationError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| InvocationError::MalformedResponse("no choices".to_string()))
    }

    /// Answer one tool call. Failures go back to the model as text.
    async fn run_tool(&self, call: &ToolCall, max_results: usize) -> String {
        if call.function.name != SEARCH_TOOL {
            return format!("Error: unknown tool '{}'", call.function.name);
        }

        let Some(search) = &self.search else {
            return "Error: web search is unavailable".to_string();
        };

        let query = search_query(&call.function.arguments);
        match search.search(&query, max_results).await {
            Ok(hits) => {
                info!("web_search {:?}: {} results", query, hits.len());
                format_hits(&query, &hits)
            }
            Err(e) => {
                warn!("web_search {:?} failed: {}", query, e);
                format!("Error: search failed: {}", e)
            }
        }
    }
}

#[async_trait]
impl ModelInvoker for GroqClient {
    async fn invoke(&self, request: &ModelRequest) -> Result<String, InvocationError> {
        let mut messages = initial_messages(request);

        let search_results = match (request.profile.search_results, &self.search) {
            (Some(n), Some(_)) if self.max_tool_rounds > 0 => Some(n),
            _ => None,
        };

        if let Some(max_results) = search_results {
            for round in 0..self.max_tool_rounds {
                let reply = self
                    .complete(&request.profile, &messages, Some(vec![search_tool_definition()]))
                    .await?;

                if reply.tool_calls.is_empty() {
                    return final_text(reply);
                }

                debug!("Tool round {}: {} call(s)", round + 1, reply.tool_calls.len());
                messages.push(ChatMessage::assistant(&reply));
                for call in &reply.tool_calls {
                    let output = self.run_tool(call, max_results).await;
                    messages.push(ChatMessage::tool(&call.id, output));
                }
            }
            debug!("Tool rounds exhausted, requesting final answer");
        }

        let reply = self.complete(&request.profile, &messages, None).await?;
        final_text(reply)
    }
}

fn initial_messages(request: &ModelRequest) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(&request.system_prompt)];
    if let Some(context) = request.context.as_deref().filter(|c| !c.trim().is_empty()) {
        messages.push(ChatMessage::system(context));
    }
    messages.push(ChatMessage::user(&request.user_prompt));
    messages
}

fn final_text(reply: AssistantMessage) -> Result<String, InvocationError> {
    reply
        .content
        .filter(|text| !text.trim().is_empty())
        .ok_or(InvocationError::EmptyResponse)
}

/// Query from tool arguments; unparseable arguments are used verbatim
fn search_query(arguments: &str) -> String {
    serde_json::from_str::<Value>(arguments)
        .ok()
        .and_then(|v| v.get("query").and_then(|q| q.as_str()).map(str::to_string))
        .unwrap_or_else(|| arguments.trim().to_string())
}

fn search_tool_definition() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": SEARCH_TOOL,
            "description": "Search the web for current information such as salaries, job market trends and tutorial links.",
            "parameters": {
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    }
                },
                "required": ["query"]
            }
        }
    })
}
