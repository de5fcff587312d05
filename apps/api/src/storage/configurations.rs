//! Saved named configurations, stored as one ordered JSON list.

use std::sync::{Mutex, MutexGuard};

use tracing::{error, warn};

use super::{KeyValueStore, StorageError, CONFIGS_KEY};
use crate::knobs::models::KnobConfiguration;

/// Serializes read-modify-write cycles on the configuration list.
static CONFIGS_LOCK: Mutex<()> = Mutex::new(());

fn lock_configs() -> MutexGuard<'static, ()> {
    // The guarded data is `()`, so a poisoned lock carries no broken state.
    CONFIGS_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Appends a configuration. Write failures are logged, not returned.
pub fn save_configuration(store: &dyn KeyValueStore, config: &KnobConfiguration) {
    let _guard = lock_configs();
    let mut configs = load_all_configurations(store);
    configs.push(config.clone());

    if let Err(e) = write_all(store, &configs) {
        error!("Failed to save configuration {}: {e}", config.id);
    }
}

/// All saved configurations in insertion order. Absent or corrupt data is an empty list.
pub fn load_all_configurations(store: &dyn KeyValueStore) -> Vec<KnobConfiguration> {
    let raw = match store.get(CONFIGS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            error!("Failed to load configurations: {e}");
            return Vec::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Stored configurations are corrupt, ignoring them: {e}");
        Vec::new()
    })
}

pub fn load_configuration(store: &dyn KeyValueStore, id: &str) -> Option<KnobConfiguration> {
    load_all_configurations(store)
        .into_iter()
        .find(|c| c.id == id)
}

/// Removes every configuration with `id`. Returns whether anything was removed.
pub fn delete_configuration(store: &dyn KeyValueStore, id: &str) -> bool {
    let _guard = lock_configs();
    let configs = load_all_configurations(store);
    let before = configs.len();
    let remaining: Vec<_> = configs.into_iter().filter(|c| c.id != id).collect();

    if remaining.len() == before {
        return false;
    }

    if let Err(e) = write_all(store, &remaining) {
        error!("Failed to delete configuration {id}: {e}");
    }
    true
}

fn write_all(store: &dyn KeyValueStore, configs: &[KnobConfiguration]) -> Result<(), StorageError> {
    let raw = serde_json::to_string(configs)?;
    store.set(CONFIGS_KEY, &raw)
}
