//! scour-tools: Built-in tools for scour
//!
//! This crate provides the tools available to the research agent:
//! - Web search: rate-limited Brave Search API client

pub mod limiter;
pub mod search;

pub use limiter::RateLimiter;
pub use search::{BraveSearchConfig, BraveSearchTool, BRAVE_SEARCH_URL};
