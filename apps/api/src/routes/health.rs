use axum::Json;
use serde_json::{json, Value};

use crate::llm_client;

/// GET /health
/// Returns a simple status object with service version and the pinned model.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cognitive-knobs-api",
        "model": llm_client::MODEL,
        "provider": llm_client::PROVIDER
    }))
}
