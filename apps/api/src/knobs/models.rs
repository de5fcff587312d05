use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::knobs::defaults::{
    DEFAULT_FREQUENCY_PENALTY, DEFAULT_MAX_TOKENS, DEFAULT_PRESENCE_PENALTY, DEFAULT_SYSTEM_PROMPT,
    DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
};

/// Freeform user-defined cognitive dimension on a 0-100 scale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveKnob {
    pub id: String,
    pub name: String,
    pub description: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_label: Option<String>,
}

/// Sampling parameter an `LlmKnob` drives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LlmParameter {
    Temperature,
    MaxTokens,
    TopP,
    FrequencyPenalty,
    PresencePenalty,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmKnob {
    pub id: String,
    pub name: String,
    pub description: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub parameter: LlmParameter,
}

/// Sampling fields forwarded to the provider. Absent fields fall back to defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationParameters {
    pub temperature: f64,
    #[serde(deserialize_with = "max_tokens_from_number")]
    pub max_tokens: u32,
    pub top_p: f64,
    #[serde(deserialize_with = "penalty_or_zero")]
    pub frequency_penalty: f64,
    #[serde(deserialize_with = "penalty_or_zero")]
    pub presence_penalty: f64,
}

/// Token counts arrive as knob floats (`1000.0`) as often as integers.
fn max_tokens_from_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?
        .map(round_tokens)
        .unwrap_or(DEFAULT_MAX_TOKENS))
}

/// Null penalties mean "no penalty".
fn penalty_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn round_tokens(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
            frequency_penalty: DEFAULT_FREQUENCY_PENALTY,
            presence_penalty: DEFAULT_PRESENCE_PENALTY,
        }
    }
}

impl GenerationParameters {
    /// Derives parameters from LLM knobs. The first knob for a parameter wins;
    /// parameters without a knob keep their default.
    pub fn from_knobs(knobs: &[LlmKnob]) -> Self {
        let lookup = |parameter: LlmParameter| {
            knobs
                .iter()
                .find(|k| k.parameter == parameter)
                .map(|k| k.value)
        };
        let defaults = Self::default();

        Self {
            temperature: lookup(LlmParameter::Temperature).unwrap_or(defaults.temperature),
            max_tokens: lookup(LlmParameter::MaxTokens)
                .map(round_tokens)
                .unwrap_or(defaults.max_tokens),
            top_p: lookup(LlmParameter::TopP).unwrap_or(defaults.top_p),
            frequency_penalty: lookup(LlmParameter::FrequencyPenalty)
                .unwrap_or(defaults.frequency_penalty),
            presence_penalty: lookup(LlmParameter::PresencePenalty)
                .unwrap_or(defaults.presence_penalty),
        }
    }
}

/// Everything needed to build one provider call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationRequest {
    pub source_text: String,
    pub cognitive_knobs: Vec<CognitiveKnob>,
    pub system_prompt: String,
    pub parameters: GenerationParameters,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            source_text: String::new(),
            cognitive_knobs: Vec::new(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            parameters: GenerationParameters::default(),
        }
    }
}

/// A saved, named snapshot of knob settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KnobConfiguration {
    pub id: String,
    pub name: String,
    pub cognitive_knobs: Vec<CognitiveKnob>,
    pub llm_knobs: Vec<LlmKnob>,
    pub system_prompt: String,
    pub created_at: DateTime<Utc>,
}

/// Durable knob state. Either list may be missing from older or damaged data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedKnobs {
    #[serde(default)]
    pub cognitive_knobs: Option<Vec<CognitiveKnob>>,
    #[serde(default)]
    pub llm_knobs: Option<Vec<LlmKnob>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExampleText {
    pub id: &'static str,
    pub title: &'static str,
    pub text: &'static str,
}
