//! UatBot LLM collaborators
//!
//! Document analyzers and the scenario generator. Each accepts raw text (the
//! surrounding application handles file extraction) and returns structured
//! records; the execution engine consumes the generated scenarios as input
//! only and never depends on this crate's internals.
//!
//! The client speaks to any OpenAI-compatible chat-completions endpoint.
//! Model replies are requested as strict JSON but treated as hostile input:
//! markdown fences are stripped and the first JSON object/array is extracted
//! before parsing.
//!
//! # Configuration
//!
//! - `UATBOT_LLM_ENDPOINT`: chat-completions URL
//! - `UATBOT_LLM_MODEL`: model name
//! - `UATBOT_LLM_API_KEY`: bearer token, optional for local endpoints
//! - `UATBOT_LLM_MAX_TOKENS`: response token cap

pub mod client;
pub mod error;
pub mod extract;
pub mod types;

pub use client::{LlmClient, LlmConfig};
pub use error::{LlmError, LlmResult};
pub use types::{CodeAnalysis, DesignAnalysis, Insight, PrdAnalysis, ScenarioDraft};
