use std::sync::Arc;

use tokio::sync::Mutex;

use crate::knobs::store::KnobStore;
use crate::llm_client::LlmClient;
use crate::storage::KeyValueStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Durable key/value storage behind knob state and saved configurations.
    pub storage: Arc<dyn KeyValueStore>,
    /// The single knob session. Callers are expected to serialize generation themselves.
    pub knobs: Arc<Mutex<KnobStore>>,
}

impl AppState {
    pub fn new(llm: LlmClient, storage: Arc<dyn KeyValueStore>) -> Self {
        let knobs = KnobStore::load(storage.clone());
        Self {
            llm,
            storage,
            knobs: Arc::new(Mutex::new(knobs)),
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State backed by in-memory storage, talking to a provider stub at `base_url`.
    pub fn for_tests(base_url: &str, api_key: Option<&str>) -> Self {
        let config = crate::config::Config::for_tests(base_url, api_key);
        let llm = LlmClient::new(&config).expect("test client");
        Self::new(llm, Arc::new(crate::storage::MemoryStore::default()))
    }
}
