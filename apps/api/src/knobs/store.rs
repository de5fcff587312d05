//! Session state for the knob editor.
//!
//! A plain struct with one logical owner. Every knob mutation writes the full
//! knob state back to storage; a failed write is logged and otherwise ignored.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::knobs::defaults::{default_cognitive_knobs, default_llm_knobs, DEFAULT_SYSTEM_PROMPT};
use crate::knobs::models::{
    CognitiveKnob, GenerationParameters, GenerationRequest, KnobConfiguration, LlmKnob,
    PersistedKnobs,
};
use crate::storage::{self, KeyValueStore};

pub struct KnobStore {
    cognitive_knobs: Vec<CognitiveKnob>,
    llm_knobs: Vec<LlmKnob>,
    system_prompt: String,
    source_text: String,
    response: String,
    is_generating: bool,
    error: String,
    storage: Arc<dyn KeyValueStore>,
}

/// Read-only view of the store, as served to clients.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KnobSnapshot {
    pub cognitive_knobs: Vec<CognitiveKnob>,
    pub llm_knobs: Vec<LlmKnob>,
    pub system_prompt: String,
    pub source_text: String,
    pub response: String,
    pub is_generating: bool,
    pub error: String,
    pub parameters: GenerationParameters,
}

impl KnobStore {
    /// Restores knob lists from storage, falling back to built-in defaults per list.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let persisted = storage::load_knob_state(storage.as_ref());

        Self {
            cognitive_knobs: persisted
                .cognitive_knobs
                .unwrap_or_else(default_cognitive_knobs),
            llm_knobs: persisted.llm_knobs.unwrap_or_else(default_llm_knobs),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            source_text: String::new(),
            response: String::new(),
            is_generating: false,
            error: String::new(),
            storage,
        }
    }

    pub fn cognitive_knobs(&self) -> &[CognitiveKnob] {
        &self.cognitive_knobs
    }

    pub fn llm_knobs(&self) -> &[LlmKnob] {
        &self.llm_knobs
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn set_system_prompt(&mut self, value: impl Into<String>) {
        self.system_prompt = value.into();
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn set_source_text(&mut self, value: impl Into<String>) {
        self.source_text = value.into();
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn set_response(&mut self, value: impl Into<String>) {
        self.response = value.into();
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    pub fn set_generating(&mut self, value: bool) {
        self.is_generating = value;
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn set_error(&mut self, value: impl Into<String>) {
        self.error = value.into();
    }

    /// Sampling parameters derived from the current LLM knobs.
    pub fn parameters(&self) -> GenerationParameters {
        GenerationParameters::from_knobs(&self.llm_knobs)
    }

    pub fn add_cognitive_knob(&mut self, mut knob: CognitiveKnob) {
        knob.value = clamp_cognitive(knob.value);
        self.cognitive_knobs.push(knob);
        self.persist();
    }

    pub fn remove_cognitive_knob(&mut self, id: &str) {
        self.cognitive_knobs.retain(|k| k.id != id);
        self.persist();
    }

    /// Returns false, without persisting, when no knob has `id`.
    pub fn update_cognitive_knob(&mut self, id: &str, value: f64) -> bool {
        let Some(knob) = self.cognitive_knobs.iter_mut().find(|k| k.id == id) else {
            return false;
        };
        knob.value = clamp_cognitive(value);
        self.persist();
        true
    }

    /// Returns false, without persisting, when no knob has `id`.
    pub fn update_llm_knob(&mut self, id: &str, value: f64) -> bool {
        let Some(knob) = self.llm_knobs.iter_mut().find(|k| k.id == id) else {
            return false;
        };
        knob.value = if knob.min <= knob.max {
            value.clamp(knob.min, knob.max)
        } else {
            value
        };
        self.persist();
        true
    }

    pub fn reset_cognitive_knobs(&mut self) {
        self.cognitive_knobs = default_cognitive_knobs();
        self.persist();
    }

    pub fn reset_llm_knobs(&mut self) {
        self.llm_knobs = default_llm_knobs();
        self.persist();
    }

    /// Replaces both knob lists and the system prompt with a saved configuration.
    pub fn apply_configuration(&mut self, config: &KnobConfiguration) {
        self.cognitive_knobs = config.cognitive_knobs.clone();
        self.llm_knobs = config.llm_knobs.clone();
        self.system_prompt = config.system_prompt.clone();
        self.persist();
    }

    pub fn generation_request(&self) -> GenerationRequest {
        GenerationRequest {
            source_text: self.source_text().to_string(),
            cognitive_knobs: self.cognitive_knobs.clone(),
            system_prompt: self.system_prompt.clone(),
            parameters: self.parameters(),
        }
    }

    pub fn snapshot(&self) -> KnobSnapshot {
        KnobSnapshot {
            cognitive_knobs: self.cognitive_knobs.clone(),
            llm_knobs: self.llm_knobs.clone(),
            system_prompt: self.system_prompt.clone(),
            source_text: self.source_text.clone(),
            response: self.response().to_string(),
            is_generating: self.is_generating(),
            error: self.error().to_string(),
            parameters: self.parameters(),
        }
    }

    fn persist(&self) {
        let state = PersistedKnobs {
            cognitive_knobs: Some(self.cognitive_knobs.clone()),
            llm_knobs: Some(self.llm_knobs.clone()),
        };

        match storage::save_knob_state(self.storage.as_ref(), &state) {
            Ok(()) => debug!(
                "Persisted {} cognitive / {} LLM knobs",
                self.cognitive_knobs.len(),
                self.llm_knobs.len()
            ),
            Err(e) => warn!("Failed to persist knob state: {e}"),
        }
    }
}

fn clamp_cognitive(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
