//! Tavily web search tool.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{required_str, Tool, ToolCallContent, ToolSourceError, ToolSpec};

pub const TOOL_TAVILY_SEARCH: &str = "tavily_search_results_json";

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";
const DEFAULT_MAX_RESULTS: u32 = 2;

fn tavily_search_url() -> String {
    std::env::var("TAVILY_SEARCH_URL").unwrap_or_else(|_| TAVILY_SEARCH_URL.to_string())
}

pub struct TavilySearchTool {
    api_key: String,
    max_results: u32,
    client: reqwest::Client,
}

impl TavilySearchTool {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            max_results: DEFAULT_MAX_RESULTS,
            client: reqwest::Client::new(),
        }
    }

    /// `None` when `TAVILY_API_KEY` is not configured.
    pub fn from_settings(settings: &env_config::Settings) -> Option<Self> {
        settings.tavily_api_key.as_deref().map(Self::new)
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    fn request_body(&self, query: &str) -> Value {
        json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": self.max_results,
            "search_depth": "advanced",
            "include_answer": false,
            "include_raw_content": false,
            "include_images": false,
        })
    }
}

/// `[{url, content}, ...]` from a Tavily response.
fn format_results(value: &Value) -> String {
    let results: Vec<Value> = value
        .get("results")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .map(|r| {
                    json!({
                        "url": r.get("url").and_then(Value::as_str).unwrap_or(""),
                        "content": r.get("content").and_then(Value::as_str).unwrap_or(""),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Value::Array(results).to_string()
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn name(&self) -> &str {
        TOOL_TAVILY_SEARCH
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_TAVILY_SEARCH.to_string(),
            description: Some(
                "A search engine optimized for comprehensive, accurate, and trusted results. \
                 Useful for answering questions about current events. Input should be a search query."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "search query to look up" }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let query = required_str(&args, "query")?.trim();
        if query.is_empty() {
            return Err(ToolSourceError::InvalidInput("query must be non-empty".into()));
        }
        let res = self
            .client
            .post(tavily_search_url())
            .header("Content-Type", "application/json")
            .json(&self.request_body(query))
            .send()
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ToolSourceError::Transport(format!(
                "Tavily API error {}: {}",
                status, body
            )));
        }
        let out: Value = res
            .json()
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        Ok(ToolCallContent::text(format_results(&out)))
    }
}
