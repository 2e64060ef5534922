//! Web search tool backed by the Brave Search API.
//!
//! Outbound calls are serialized through a shared [`RateLimiter`], and
//! HTTP responses are classified into a fixed set of human-readable
//! outcomes so the model can react to failures instead of aborting.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use scour_core::{Error, PropertySchema, Tool, ToolDefinition, ToolOutput, ToolParameters};

use crate::limiter::RateLimiter;

pub const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Configuration for the Brave search client.
#[derive(Clone, Debug)]
pub struct BraveSearchConfig {
    /// Brave Search API subscription token.
    pub api_key: String,
    /// API endpoint URL (overridable for tests).
    pub endpoint: String,
    /// Language code sent with every query.
    pub search_lang: String,
    /// Result count used when the model doesn't ask for one (1-20).
    pub default_count: u32,
    /// Minimum interval between requests (free tier: 1s).
    pub min_interval: Duration,
}

impl BraveSearchConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: BRAVE_SEARCH_URL.to_string(),
            search_lang: "en".to_string(),
            default_count: 10,
            min_interval: Duration::from_secs(1),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_default_count(mut self, count: u32) -> Self {
        self.default_count = count;
        self
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }
}

// Brave API response shape: we only walk web.results[].{title,url,description}.

#[derive(Deserialize)]
struct BraveSearchResponse {
    web: Option<WebResults>,
}

#[derive(Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Deserialize)]
struct WebResult {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct WebSearchArgs {
    query: String,
    #[serde(default)]
    count: Option<u32>,
}

pub struct BraveSearchTool {
    config: BraveSearchConfig,
    client: Client,
    limiter: RateLimiter,
}

impl BraveSearchTool {
    /// Create the tool around a shared HTTP client (owned by the session's
    /// dependency bundle, so the connection pool is reused across calls).
    pub fn new(config: BraveSearchConfig, client: Client) -> Self {
        let limiter = RateLimiter::new(config.min_interval);
        Self {
            config,
            client,
            limiter,
        }
    }

    /// Issue one rate-limited search request and classify the response.
    async fn search(&self, query: &str, count: u32) -> Result<Vec<WebResult>, Error> {
        self.limiter.acquire().await;

        info!(query = %query, count = count, "Searching Brave");

        let count_param = count.to_string();
        let response = self
            .client
            .get(&self.config.endpoint)
            .header("X-Subscription-Token", &self.config.api_key)
            .header("Accept", "application/json")
            .query(&[
                ("q", query),
                ("count", count_param.as_str()),
                ("search_lang", self.config.search_lang.as_str()),
            ])
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();

        if status.as_u16() == 429 {
            warn!("Rate limit exceeded for Brave API");
            return Err(Error::rate_limit("Brave API returned 429"));
        }

        if status.as_u16() == 401 {
            warn!("Invalid Brave API key");
            return Err(Error::auth("Brave API returned 401"));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            warn!(status = status.as_u16(), "Brave API error");
            return Err(Error::api(status.as_u16(), snippet));
        }

        let data: BraveSearchResponse = response
            .json()
            .await
            .map_err(|e| Error::serialization(format!("Failed to parse search response: {}", e)))?;

        let results = data.web.map(|w| w.results).unwrap_or_default();
        debug!(results = results.len(), query = %query, "Search completed");
        Ok(results)
    }
}

#[async_trait]
impl Tool for BraveSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web using the Brave Search API. Returns result titles, URLs, and descriptions."
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description()).with_parameters(
            ToolParameters::new()
                .add_property(
                    "query",
                    PropertySchema::string("The search query (can be natural language)"),
                    true,
                )
                .add_property(
                    "count",
                    PropertySchema::integer("Maximum number of results to return (1-20, default 10)"),
                    false,
                ),
        )
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, Error> {
        let args: WebSearchArgs = serde_json::from_value(arguments)
            .map_err(|e| Error::tool("web_search", format!("Invalid arguments: {}", e)))?;

        if self.config.api_key.trim().is_empty() {
            return Ok(ToolOutput::error("Brave API key is required"));
        }

        if args.query.trim().is_empty() {
            return Ok(ToolOutput::error("Search query cannot be empty"));
        }

        let count = args.count.unwrap_or(self.config.default_count).clamp(1, 20);

        match self.search(&args.query, count).await {
            Ok(results) if results.is_empty() => Ok(ToolOutput::success(format!(
                "No search results found for query: {}",
                args.query
            ))),
            Ok(results) => Ok(ToolOutput::success(format_results(&args.query, &results))),
            Err(e) => Ok(ToolOutput::error(render_search_error(&e))),
        }
    }
}

/// Map transport failures onto the error classification table.
fn classify_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout("Search request timed out")
    } else {
        Error::network(err.to_string())
    }
}

/// Render a classified error as the human-readable string handed back to
/// the model (the agent loop prefixes it with "Error: ").
fn render_search_error(err: &Error) -> String {
    match err {
        Error::RateLimit(_) => "Rate limit exceeded. Please try again in a moment.".to_string(),
        Error::Auth(_) => "Invalid Brave API key. Please check your configuration.".to_string(),
        Error::Api { status, message } => format!("Brave API returned {}: {}", status, message),
        Error::Timeout(_) => "Search request timed out".to_string(),
        other => format!("Search failed: {}", other),
    }
}

/// Render results as a readable digest for the model.
fn format_results(query: &str, results: &[WebResult]) -> String {
    let mut text = format!("Search Results for '{}':\n\n", query);

    for (i, result) in results.iter().enumerate() {
        let title = result.title.as_deref().unwrap_or("No title");
        let url = result.url.as_deref().unwrap_or("No URL");
        let description = result.description.as_deref().unwrap_or("No description");

        text.push_str(&format!("{}. **{}**\n", i + 1, title));
        text.push_str(&format!("   URL: {}\n", url));
        text.push_str(&format!("   {}\n\n", description));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool_for(server: &MockServer, api_key: &str) -> BraveSearchTool {
        let config = BraveSearchConfig::new(api_key)
            .with_endpoint(format!("{}/res/v1/web/search", server.uri()))
            .with_min_interval(Duration::from_millis(0));
        BraveSearchTool::new(config, Client::new())
    }

    fn results_body(entries: &[(&str, &str, &str)]) -> serde_json::Value {
        let results: Vec<_> = entries
            .iter()
            .map(|(title, url, description)| {
                serde_json::json!({"title": title, "url": url, "description": description})
            })
            .collect();
        serde_json::json!({"web": {"results": results}})
    }

    #[test]
    fn test_format_results_digest() {
        let results = vec![
            WebResult {
                title: Some("Rust".to_string()),
                url: Some("https://rust-lang.org".to_string()),
                description: Some("A systems language".to_string()),
            },
            WebResult {
                title: None,
                url: None,
                description: None,
            },
        ];

        let text = format_results("rust", &results);
        assert!(text.starts_with("Search Results for 'rust':\n\n"));
        assert!(text.contains("1. **Rust**\n   URL: https://rust-lang.org\n   A systems language"));
        assert!(text.contains("2. **No title**\n   URL: No URL\n   No description"));
    }

    #[test]
    fn test_render_search_error_table() {
        assert_eq!(
            render_search_error(&Error::rate_limit("429")),
            "Rate limit exceeded. Please try again in a moment."
        );
        assert_eq!(
            render_search_error(&Error::auth("401")),
            "Invalid Brave API key. Please check your configuration."
        );
        assert_eq!(
            render_search_error(&Error::api(503, "unavailable")),
            "Brave API returned 503: unavailable"
        );
        assert_eq!(
            render_search_error(&Error::timeout("slow")),
            "Search request timed out"
        );
        assert!(render_search_error(&Error::network("refused")).starts_with("Search failed:"));
    }

    #[tokio::test]
    async fn test_blank_api_key_rejected_before_request() {
        let server = MockServer::start().await;
        let tool = tool_for(&server, "   ");

        let output = tool
            .execute(serde_json::json!({"query": "rust"}))
            .await
            .unwrap();
        assert!(output.is_error);
        assert_eq!(output.content, "Brave API key is required");
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let server = MockServer::start().await;
        let tool = tool_for(&server, "test-key");

        let output = tool
            .execute(serde_json::json!({"query": "   "}))
            .await
            .unwrap();
        assert!(output.is_error);
        assert_eq!(output.content, "Search query cannot be empty");
    }

    #[tokio::test]
    async fn test_successful_search_formats_digest() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/res/v1/web/search"))
            .and(query_param("q", "rust language"))
            .and(query_param("count", "10"))
            .and(query_param("search_lang", "en"))
            .and(header("X-Subscription-Token", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results_body(&[
                ("Rust", "https://rust-lang.org", "Empowering everyone"),
                ("Rust Book", "https://doc.rust-lang.org/book/", "Learn Rust"),
            ])))
            .mount(&server)
            .await;

        let tool = tool_for(&server, "test-key");
        let output = tool
            .execute(serde_json::json!({"query": "rust language"}))
            .await
            .unwrap();

        assert!(!output.is_error);
        assert!(output.content.contains("Search Results for 'rust language':"));
        assert!(output.content.contains("1. **Rust**"));
        assert!(output.content.contains("URL: https://doc.rust-lang.org/book/"));
    }

    #[tokio::test]
    async fn test_count_is_clamped_to_twenty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/res/v1/web/search"))
            .and(query_param("count", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results_body(&[(
                "T", "https://t", "d",
            )])))
            .mount(&server)
            .await;

        let tool = tool_for(&server, "test-key");
        let output = tool
            .execute(serde_json::json!({"query": "rust", "count": 50}))
            .await
            .unwrap();
        assert!(!output.is_error);
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/res/v1/web/search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let tool = tool_for(&server, "test-key");
        let output = tool
            .execute(serde_json::json!({"query": "rust"}))
            .await
            .unwrap();

        assert!(output.is_error);
        assert_eq!(
            output.content,
            "Rate limit exceeded. Please try again in a moment."
        );
    }

    #[tokio::test]
    async fn test_unauthorized_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/res/v1/web/search"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let tool = tool_for(&server, "bad-key");
        let output = tool
            .execute(serde_json::json!({"query": "rust"}))
            .await
            .unwrap();

        assert!(output.is_error);
        assert_eq!(
            output.content,
            "Invalid Brave API key. Please check your configuration."
        );
    }

    #[tokio::test]
    async fn test_generic_error_truncates_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/res/v1/web/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("x".repeat(500)))
            .mount(&server)
            .await;

        let tool = tool_for(&server, "test-key");
        let output = tool
            .execute(serde_json::json!({"query": "rust"}))
            .await
            .unwrap();

        assert!(output.is_error);
        assert!(output.content.starts_with("Brave API returned 503: "));
        // Body is truncated to 200 characters in the message.
        assert!(output.content.len() < 250);
    }

    #[tokio::test]
    async fn test_timed_out_request_classified() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/res/v1/web/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(results_body(&[("T", "https://t", "d")]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = BraveSearchConfig::new("test-key")
            .with_endpoint(format!("{}/res/v1/web/search", server.uri()))
            .with_min_interval(Duration::from_millis(0));
        let client = Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let tool = BraveSearchTool::new(config, client);

        let output = tool
            .execute(serde_json::json!({"query": "rust"}))
            .await
            .unwrap();

        assert!(output.is_error);
        assert_eq!(output.content, "Search request timed out");
    }

    #[tokio::test]
    async fn test_empty_results_is_not_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/res/v1/web/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"web": {"results": []}})),
            )
            .mount(&server)
            .await;

        let tool = tool_for(&server, "test-key");
        let output = tool
            .execute(serde_json::json!({"query": "xyzzy"}))
            .await
            .unwrap();

        assert!(!output.is_error);
        assert_eq!(output.content, "No search results found for query: xyzzy");
    }

    #[tokio::test]
    async fn test_missing_web_section_treated_as_no_results() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/res/v1/web/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let tool = tool_for(&server, "test-key");
        let output = tool
            .execute(serde_json::json!({"query": "xyzzy"}))
            .await
            .unwrap();

        assert!(!output.is_error);
        assert!(output.content.starts_with("No search results found"));
    }

    #[tokio::test]
    async fn test_requests_are_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/res/v1/web/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results_body(&[(
                "T", "https://t", "d",
            )])))
            .mount(&server)
            .await;

        let config = BraveSearchConfig::new("test-key")
            .with_endpoint(format!("{}/res/v1/web/search", server.uri()))
            .with_min_interval(Duration::from_millis(100));
        let tool = BraveSearchTool::new(config, Client::new());

        let start = std::time::Instant::now();
        tool.execute(serde_json::json!({"query": "a"})).await.unwrap();
        tool.execute(serde_json::json!({"query": "b"})).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
