//! Research agent: registers the web search tool and runs the model loop.

use std::sync::Arc;

use tracing::info;

use scour_core::{Agent, AgentConfig, Error, Message, Provider, ToolRegistry};
use scour_providers::OpenAIProvider;
use scour_tools::{BraveSearchConfig, BraveSearchTool};

use crate::dependencies::SearchDependencies;
use crate::settings::Settings;

const SYSTEM_PROMPT: &str = r#"You are a focused research assistant powered by Brave Search. Your primary goal is to help users conduct thorough web research and provide well-organized, accurate information.

Your capabilities:
1. **Web Search**: Use Brave Search to find current, relevant information on any topic
2. **Research Analysis**: Analyze search results for relevance, credibility, and key insights
3. **Information Synthesis**: Combine information from multiple sources into clear summaries

Research Guidelines:
- Use specific, targeted search queries to find the most relevant information
- Analyze search results critically for accuracy and credibility
- Provide clear, well-organized summaries with key findings
- Always include source information for reference and verification
- Focus on factual information and avoid speculation
- When information is unclear or conflicting, acknowledge uncertainty

Output Format:
- Provide research findings in a clear, structured format
- Use bullet points or numbered lists for key information
- Include relevant URLs for source verification
- Summarize key insights and conclusions at the end

Always strive to provide accurate, helpful, and actionable research information."#;

/// Maximum tool-call round trips before the run is abandoned.
const MAX_ITERATIONS: usize = 20;

/// Run a research query end to end: build dependencies and the provider,
/// run the model loop, tear down.
pub async fn run_research(
    settings: &Settings,
    query: &str,
    session_id: Option<String>,
    max_results: Option<u32>,
) -> Result<String, Error> {
    let deps = SearchDependencies::create(settings, session_id)?;

    let provider: Arc<dyn Provider> = Arc::new(
        OpenAIProvider::new(&settings.llm_api_key)
            .with_base_url(&settings.llm_base_url)
            .with_default_model(&settings.llm_model),
    );

    run_with_provider(provider, settings, deps, query, max_results).await
}

/// Blocking variant of [`run_research`] for callers without a runtime.
pub fn run_research_blocking(
    settings: &Settings,
    query: &str,
    session_id: Option<String>,
    max_results: Option<u32>,
) -> Result<String, Error> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Unknown(format!("Failed to start runtime: {}", e)))?;

    runtime.block_on(run_research(settings, query, session_id, max_results))
}

/// Run the loop against an explicit provider. Split out so tests can
/// substitute a provider without touching the network.
async fn run_with_provider(
    provider: Arc<dyn Provider>,
    settings: &Settings,
    deps: SearchDependencies,
    query: &str,
    max_results: Option<u32>,
) -> Result<String, Error> {
    info!(
        session_id = ?deps.session_id,
        query = %query,
        "Starting research"
    );

    let mut search_config = BraveSearchConfig::new(&deps.brave_api_key)
        .with_endpoint(&settings.brave_search_url);
    if let Some(count) = max_results {
        search_config = search_config.with_default_count(count.clamp(1, 20));
    }

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(BraveSearchTool::new(
        search_config,
        deps.http.clone(),
    )));

    let config = AgentConfig::new("researcher")
        .with_system_prompt(SYSTEM_PROMPT)
        .with_max_iterations(MAX_ITERATIONS);

    let answer = Agent::run_once(
        provider,
        Arc::new(registry),
        config,
        vec![Message::user(query)],
    )
    .await?;

    info!(session_id = ?deps.session_id, "Research completed");

    // Dropping the bundle closes the pooled HTTP connections.
    drop(deps);

    Ok(answer)
}
