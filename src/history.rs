//! Optional conversation-history persistence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{Message, SessionError};

/// Persistence collaborator for conversation history.
///
/// Saves are whole-history overwrites; there is no append contract.
pub trait HistoryStore: Send + Sync {
    /// `Ok(None)` means no saved history exists yet.
    fn load(&self) -> Result<Option<Vec<Message>>, SessionError>;

    fn save(&self, history: &[Message]) -> Result<(), SessionError>;
}

/// Stores the history as a pretty-printed JSON array of `{role, content}`
/// objects, overwritten on each save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under `dir` with a per-conversation timestamped filename.
    pub fn timestamped_in(dir: impl AsRef<Path>) -> Self {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        Self::new(
            dir.as_ref()
                .join(format!("conversation_history_{stamp}.json")),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<Message>>, SessionError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::Persistence(e.to_string())),
        };
        let history =
            serde_json::from_str(&data).map_err(|e| SessionError::Persistence(e.to_string()))?;
        Ok(Some(history))
    }

    fn save(&self, history: &[Message]) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(history)
            .map_err(|e| SessionError::Persistence(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| SessionError::Persistence(e.to_string()))
    }
}
