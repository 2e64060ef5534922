//! scour-agent: Research agent wiring for scour
//!
//! This crate assembles the research assistant: environment-based
//! settings, the per-session dependency bundle, and the agent entry
//! points that run a query against the model loop.

pub mod dependencies;
pub mod researcher;
pub mod settings;

pub use dependencies::SearchDependencies;
pub use researcher::{run_research, run_research_blocking};
pub use settings::Settings;
