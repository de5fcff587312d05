//! Built-in knob sets, system prompt and sample texts.

use crate::knobs::models::{CognitiveKnob, ExampleText, LlmKnob, LlmParameter};

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TOP_P: f64 = 0.9;
pub const DEFAULT_FREQUENCY_PENALTY: f64 = 0.0;
pub const DEFAULT_PRESENCE_PENALTY: f64 = 0.0;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that transforms text according to specified cognitive parameters.";

pub fn default_cognitive_knobs() -> Vec<CognitiveKnob> {
    vec![
        CognitiveKnob {
            id: "abstraction".to_string(),
            name: "Abstraction".to_string(),
            description: "Move from concrete examples to theoretical frameworks".to_string(),
            value: 50.0,
            low_label: Some("Concrete".to_string()),
            high_label: Some("Abstract".to_string()),
        },
        CognitiveKnob {
            id: "ridiculousness".to_string(),
            name: "Ridiculousness".to_string(),
            description: "Adjust the level of absurdity and implausibility in the content"
                .to_string(),
            value: 50.0,
            low_label: None,
            high_label: None,
        },
        CognitiveKnob {
            id: "accessibility".to_string(),
            name: "Accessibility".to_string(),
            description: "Adjust language complexity for different audiences".to_string(),
            value: 50.0,
            low_label: Some("Expert".to_string()),
            high_label: Some("General".to_string()),
        },
    ]
}

/// Penalties have no default knob and derive their defaults instead.
pub fn default_llm_knobs() -> Vec<LlmKnob> {
    vec![
        LlmKnob {
            id: "temp".to_string(),
            name: "Temperature".to_string(),
            description: "Controls randomness: 0 = focused & deterministic, 2 = creative & diverse"
                .to_string(),
            value: DEFAULT_TEMPERATURE,
            min: 0.0,
            max: 2.0,
            step: 0.1,
            parameter: LlmParameter::Temperature,
        },
        LlmKnob {
            id: "tokens".to_string(),
            name: "Max Tokens".to_string(),
            description: "Maximum response length (higher = longer responses)".to_string(),
            value: DEFAULT_MAX_TOKENS as f64,
            min: 50.0,
            max: 4000.0,
            step: 50.0,
            parameter: LlmParameter::MaxTokens,
        },
        LlmKnob {
            id: "topp".to_string(),
            name: "Top P".to_string(),
            description: "Nucleus sampling: lower = focused, higher = diverse token choices"
                .to_string(),
            value: DEFAULT_TOP_P,
            min: 0.0,
            max: 1.0,
            step: 0.05,
            parameter: LlmParameter::TopP,
        },
    ]
}

pub const EXAMPLE_TEXTS: &[ExampleText] = &[
    ExampleText {
        id: "shakespeare",
        title: "Shakespeare - Sonnet 18",
        text: "Shall I compare thee to a summer's day? Thou art more lovely and more temperate. \
               Rough winds do shake the darling buds of May, and summer's lease hath all too short a date. \
               Sometime too hot the eye of heaven shines, and often is his gold complexion dimmed; \
               and every fair from fair sometime declines, by chance or nature's changing course untrimmed. \
               But thy eternal summer shall not fade, nor lose possession of that fair thou ow'st, \
               nor shall death brag thou wander'st in his shade, when in eternal lines to time thou grow'st. \
               So long as men can breathe or eyes can see, so long lives this, and this gives life to thee.",
    },
    ExampleText {
        id: "plato",
        title: "Plato - The Allegory of the Cave",
        text: "Imagine human beings living in an underground den, which has a mouth open towards the light. \
               Here they have been from their childhood, and have their legs and necks chained so that they \
               cannot move, and can only see before them. Above and behind them a fire is blazing at a distance, \
               and between the fire and the prisoners there is a raised way. They see only their own shadows, \
               or the shadows of one another, which the fire throws on the opposite wall of the cave.",
    },
    ExampleText {
        id: "darwin",
        title: "Charles Darwin - On Natural Selection",
        text: "As many more individuals of each species are born than can possibly survive; and as, \
               consequently, there is a frequently recurring struggle for existence, it follows that any being, \
               if it vary however slightly in any manner profitable to itself, under the complex and sometimes \
               varying conditions of life, will have a better chance of surviving, and thus be naturally selected. \
               From the strong principle of inheritance, any selected variety will tend to propagate its new \
               and modified form.",
    },
    ExampleText {
        id: "turing",
        title: "Alan Turing - Computing Machinery",
        text: "I propose to consider the question, \"Can machines think?\" This should begin with definitions \
               of the meaning of the terms \"machine\" and \"think.\" The definitions might be framed so as to \
               reflect so far as possible the normal use of the words, but this attitude is dangerous.",
    },
    ExampleText {
        id: "lovelace",
        title: "Ada Lovelace - Notes on the Analytical Engine",
        text: "The Analytical Engine has no pretensions whatever to originate anything. It can do whatever \
               we know how to order it to perform. It can follow analysis; but it has no power of anticipating \
               any analytical relations or truths. Its province is to assist us in making available what we \
               are already acquainted with.",
    },
    ExampleText {
        id: "frost",
        title: "Robert Frost - The Road Not Taken",
        text: "Two roads diverged in a yellow wood, and sorry I could not travel both and be one traveler, \
               long I stood and looked down one as far as I could to where it bent in the undergrowth. \
               Then took the other, as just as fair, and having perhaps the better claim, because it was \
               grassy and wanted wear; though as for that the passing there had worn them really about the same.",
    },
];
