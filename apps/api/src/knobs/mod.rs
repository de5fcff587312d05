// Knob state: data model, built-in defaults, prompt construction,
// the persisted session store and its HTTP handlers.

pub mod defaults;
pub mod handlers;
pub mod models;
pub mod prompt;
pub mod store;
