//! External dependencies for a research session.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;

use scour_core::Error;

use crate::settings::Settings;

const USER_AGENT: &str = concat!("scour-research-agent/", env!("CARGO_PKG_VERSION"));

/// Everything the research agent needs from the outside world: a pooled
/// HTTP client and the Brave API key, created once per session.
///
/// The pooled connections are closed when the bundle is dropped at the
/// end of the run.
pub struct SearchDependencies {
    pub http: Client,
    pub brave_api_key: String,
    /// Optional session identifier for log correlation.
    pub session_id: Option<String>,
}

impl SearchDependencies {
    pub fn create(settings: &Settings, session_id: Option<String>) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            brave_api_key: settings.brave_api_key.clone(),
            session_id,
        })
    }
}
