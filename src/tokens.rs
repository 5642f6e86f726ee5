//! Token counting for budget enforcement.

use tiktoken_rs::CoreBPE;
use tracing::debug;

/// A deterministic tokenization scheme.
///
/// The session counts history size through this trait so the scheme can be
/// swapped (fixed per-word counters in tests, alternative encoders for
/// models tiktoken does not know).
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// BPE counter tied to a model identifier, falling back to the generic
/// `cl100k_base` encoding when the model is unrecognized.
pub struct BpeCounter {
    bpe: CoreBPE,
}

impl BpeCounter {
    pub fn for_model(model: &str) -> Self {
        let bpe = match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => bpe,
            Err(_) => {
                debug!(model, "no model-specific encoding, using cl100k_base");
                tiktoken_rs::cl100k_base().expect("cl100k_base vocabulary")
            }
        };
        Self { bpe }
    }
}

impl TokenCounter for BpeCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}
