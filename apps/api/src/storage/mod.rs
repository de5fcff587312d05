//! Durable local state: a small key/value store holding the current knob
//! lists and the saved configurations.
//!
//! Persistence is best-effort. Helpers in this module log failures and fall
//! back to defaults instead of returning errors to the caller.

use thiserror::Error;
use tracing::warn;

use crate::knobs::models::PersistedKnobs;

pub mod configurations;
pub mod file_store;

pub use file_store::{FileStore, MemoryStore};

/// Key holding `{cognitiveKnobs, llmKnobs}`.
pub const KNOBS_KEY: &str = "cognitive-knobs";
/// Key holding the ordered list of saved configurations.
pub const CONFIGS_KEY: &str = "cognitive-knobs-configs";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to persist file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed storage with whole-value reads and writes.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Reads the persisted knob state. Absent or unreadable data yields empty
/// lists, which callers replace with defaults.
pub fn load_knob_state(store: &dyn KeyValueStore) -> PersistedKnobs {
    let raw = match store.get(KNOBS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return PersistedKnobs::default(),
        Err(e) => {
            warn!("Failed to read knob state: {e}");
            return PersistedKnobs::default();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Stored knob state is corrupt, using defaults: {e}");
        PersistedKnobs::default()
    })
}

pub fn save_knob_state(store: &dyn KeyValueStore, state: &PersistedKnobs) -> Result<(), StorageError> {
    let raw = serde_json::to_string(state)?;
    store.set(KNOBS_KEY, &raw)
}
