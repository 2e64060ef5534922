//! scour-providers: LLM provider implementations for scour
//!
//! This crate provides implementations of the Provider trait for
//! OpenAI-compatible chat completion APIs.

pub mod openai;

pub use openai::OpenAIProvider;
