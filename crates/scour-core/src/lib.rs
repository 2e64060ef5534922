//! scour-core: Core types and traits for scour
//!
//! This crate provides the foundational types and traits used throughout
//! the scour research assistant.

pub mod agent;
pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use agent::{Agent, AgentConfig};
pub use error::Error;
pub use message::{Message, Role, ToolCall, Usage};
pub use provider::{CompletionRequest, CompletionResponse, FinishReason, Provider};
pub use tool::{PropertySchema, Tool, ToolDefinition, ToolOutput, ToolParameters, ToolRegistry};

pub type Result<T> = std::result::Result<T, Error>;
