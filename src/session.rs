//! Conversation session management.
//!
//! A [`Session`] owns the ordered message history, the active persona, and
//! the token-budget policy, and orchestrates one completion call per user
//! turn. Callers serialize turns per session; `submit_turn` takes
//! `&mut self`, so the borrow checker enforces that.

use tracing::{debug, warn};

use crate::history::HistoryStore;
use crate::persona::{PersonaCatalog, CUSTOM_PERSONA, DEFAULT_PERSONA};
use crate::tokens::{BpeCounter, TokenCounter};
use crate::{CompletionClient, CompletionOptions, Message, Role, SessionError};

pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TOKEN_BUDGET: usize = 4096;

/// Session-level generation defaults and the history token budget.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Model identifier; also selects the tokenization scheme.
    pub model: String,
    /// Sampling temperature, 0.0 to 1.0.
    pub temperature: f64,
    /// Ceiling on reply length, in tokens.
    pub max_tokens: u32,
    /// Ceiling on the total token count of the history.
    pub token_budget: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            token_budget: DEFAULT_TOKEN_BUDGET,
        }
    }
}

/// Per-turn overrides for the session's generation defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnOptions {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// A conversation session: message history, active persona, token budget.
pub struct Session {
    /// Ordered history; index 0 is always the system message.
    history: Vec<Message>,
    personas: PersonaCatalog,
    active_persona: String,
    config: SessionConfig,
    counter: Box<dyn TokenCounter>,
    store: Option<Box<dyn HistoryStore>>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let counter = Box::new(BpeCounter::for_model(&config.model));
        let mut session = Self {
            history: Vec::new(),
            personas: PersonaCatalog::new(),
            active_persona: DEFAULT_PERSONA.to_string(),
            config,
            counter,
            store: None,
        };
        session.sync_system_message();
        session
    }

    /// Replace the tokenization scheme (defaults to the model's BPE).
    pub fn with_token_counter(mut self, counter: Box<dyn TokenCounter>) -> Self {
        self.counter = counter;
        self
    }

    /// Attach a persistence collaborator and adopt any history it holds.
    ///
    /// A missing or unreadable saved history is not fatal; the session
    /// starts fresh and the failure is logged.
    pub fn with_store(mut self, store: Box<dyn HistoryStore>) -> Self {
        match store.load() {
            Ok(Some(history)) if !history.is_empty() => {
                self.history = history;
                // The saved system message may be stale relative to the
                // active persona.
                self.sync_system_message();
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "could not load saved history, starting fresh"),
        }
        self.store = Some(store);
        self
    }

    /// Switch to a persona from the catalog, rewriting the system message.
    ///
    /// An unknown name leaves the session untouched.
    pub fn set_persona(&mut self, name: &str) -> Result<(), SessionError> {
        if !self.personas.contains(name) {
            return Err(SessionError::UnknownPersona {
                name: name.to_string(),
                available: self.personas.names(),
            });
        }
        self.active_persona = name.to_string();
        self.sync_system_message();
        Ok(())
    }

    /// Install `text` as the `custom` persona and switch to it.
    pub fn set_custom_persona(&mut self, text: &str) -> Result<(), SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyPersona);
        }
        self.personas.set_custom(text);
        self.set_persona(CUSTOM_PERSONA)
    }

    /// Submit a user turn with the session's default generation parameters.
    pub async fn submit_turn(
        &mut self,
        client: &dyn CompletionClient,
        prompt: impl Into<String>,
    ) -> Result<String, SessionError> {
        self.submit_turn_with(client, prompt, TurnOptions::default())
            .await
    }

    /// Submit a user turn, get the assistant's reply.
    ///
    /// On completion failure the user message stays in the history,
    /// un-replied, so the caller can retry; no assistant message is
    /// fabricated.
    pub async fn submit_turn_with(
        &mut self,
        client: &dyn CompletionClient,
        prompt: impl Into<String>,
        opts: TurnOptions,
    ) -> Result<String, SessionError> {
        self.history.push(Message {
            role: Role::User,
            content: prompt.into(),
        });
        self.enforce_token_budget();

        let opts = CompletionOptions {
            model: self.config.model.clone(),
            temperature: opts.temperature.unwrap_or(self.config.temperature),
            max_tokens: opts.max_tokens.unwrap_or(self.config.max_tokens),
        };
        let reply = client.complete(&self.history, &opts).await?;

        self.history.push(Message {
            role: Role::Assistant,
            content: reply.clone(),
        });
        self.enforce_token_budget();
        self.persist();

        Ok(reply)
    }

    /// Discard all history except a fresh system message for the active
    /// persona. Persistence failures are logged, never surfaced.
    pub fn reset(&mut self) {
        self.history.clear();
        self.sync_system_message();
        self.persist();
    }

    /// Tokens in `text` under the session's tokenization scheme.
    pub fn token_count_of(&self, text: &str) -> usize {
        self.counter.count(text)
    }

    /// Total tokens across the whole history.
    pub fn total_tokens(&self) -> usize {
        self.history
            .iter()
            .map(|m| self.counter.count(&m.content))
            .sum()
    }

    /// Read-only view of the conversation history.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn active_persona(&self) -> &str {
        &self.active_persona
    }

    /// Valid persona names, in stable order.
    pub fn persona_names(&self) -> Vec<String> {
        self.personas.names()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Evict whole messages, oldest non-system first, until the history
    /// fits the budget. The system message at index 0 is never evicted;
    /// if it alone exceeds the budget, the over-budget state is accepted.
    fn enforce_token_budget(&mut self) {
        while self.total_tokens() > self.config.token_budget {
            if self.history.len() <= 1 {
                break;
            }
            let evicted = self.history.remove(1);
            debug!(role = ?evicted.role, "evicted oldest message to fit token budget");
        }
    }

    /// Rewrite (or insert) the system message at index 0 to the active
    /// persona's text.
    fn sync_system_message(&mut self) {
        let text = self
            .personas
            .get(&self.active_persona)
            .expect("active persona is always a catalog key")
            .to_string();
        match self.history.first_mut() {
            Some(first) if first.role == Role::System => first.content = text,
            _ => self.history.insert(
                0,
                Message {
                    role: Role::System,
                    content: text,
                },
            ),
        }
    }

    fn persist(&self) {
        let Some(store) = &self.store else { return };
        if let Err(e) = store.save(&self.history) {
            warn!(error = %e, "failed to persist conversation history");
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
