//! Persona catalog: named system-prompt presets.

use std::collections::BTreeMap;

/// Catalog key of the one mutable entry.
pub const CUSTOM_PERSONA: &str = "custom";

/// Persona selected when a session is created.
pub const DEFAULT_PERSONA: &str = "creative_assistant";

const BUILTIN_PERSONAS: &[(&str, &str)] = &[
    (
        "default_assistant",
        "You are a helpful, knowledgeable, and polite assistant. Your primary goal \
         is to assist users by providing accurate, concise, and contextually \
         appropriate responses to their questions or requests.",
    ),
    (
        "blogger",
        "You are a creative blogger specializing in engaging and informative content.",
    ),
    (
        "social_media_expert",
        "You are a social media expert, crafting catchy and shareable posts.",
    ),
    (
        "creative_assistant",
        "You are a creative assistant skilled in crafting engaging marketing content.",
    ),
    (
        "sassy_assistant",
        "You are a sassy assistant that is fed up with answering questions.",
    ),
    (
        "angry_assistant",
        "You are an angry assistant that likes yelling in all caps.",
    ),
    (
        "thoughtful_assistant",
        "You are a thoughtful assistant, always ready to dig deeper. You ask \
         clarifying questions to ensure understanding and approach problems with \
         a step-by-step methodology.",
    ),
    (CUSTOM_PERSONA, "Enter your custom system message here."),
];

/// Mapping from persona name to system-prompt text.
///
/// Built-in entries are seeded at construction and never change; only the
/// [`CUSTOM_PERSONA`] entry can be overwritten (and never removed).
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    entries: BTreeMap<String, String>,
}

impl PersonaCatalog {
    pub fn new() -> Self {
        let entries = BUILTIN_PERSONAS
            .iter()
            .map(|(name, text)| (name.to_string(), text.to_string()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Overwrite the `custom` entry. Built-in entries are not reachable here.
    pub fn set_custom(&mut self, text: impl Into<String>) {
        self.entries.insert(CUSTOM_PERSONA.to_string(), text.into());
    }

    /// Catalog keys in stable (sorted) order.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl Default for PersonaCatalog {
    fn default() -> Self {
        Self::new()
    }
}
