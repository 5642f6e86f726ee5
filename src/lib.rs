//! Persona-aware conversation manager for OpenAI-compatible chat endpoints.
//!
//! Provides a [`Session`] that owns a linear message history with:
//! - Selectable persona system prompts (plus a free-text "custom" slot)
//! - Token-budget enforcement by FIFO eviction of the oldest turns
//! - One blocking completion call per user turn via [`CompletionClient`]
//! - Optional best-effort history persistence via [`HistoryStore`]

pub mod history;
pub mod openai;
pub mod persona;
pub mod session;
pub mod tokens;

use async_trait::async_trait;

pub use history::{HistoryStore, JsonFileStore};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use persona::PersonaCatalog;
pub use session::{Session, SessionConfig, TurnOptions};
pub use tokens::{BpeCounter, TokenCounter};

/// A remote completion endpoint: full history in, one reply text out.
///
/// Implementations translate every transport, protocol, and response-shape
/// failure into [`SessionError::Completion`]; no collaborator error types
/// cross this boundary.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        opts: &CompletionOptions,
    ) -> Result<String, SessionError>;
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Generation parameters resolved for a single completion request.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown persona: {name} (available: {})", .available.join(", "))]
    UnknownPersona { name: String, available: Vec<String> },

    #[error("custom persona text is empty")]
    EmptyPersona,

    #[error("completion failed: {0}")]
    Completion(String),

    #[error("history persistence failed: {0}")]
    Persistence(String),
}
