pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::generation::handlers as generation;
use crate::knobs::handlers as knobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless proxy
        .route("/api/generate", post(generation::handle_generate))
        .route("/api/examples", get(knobs::handle_list_examples))
        // Knob session
        .route("/api/knobs", get(knobs::handle_get_knobs))
        .route("/api/knobs/cognitive", post(knobs::handle_add_cognitive_knob))
        .route(
            "/api/knobs/cognitive/reset",
            post(knobs::handle_reset_cognitive_knobs),
        )
        .route(
            "/api/knobs/cognitive/:id",
            patch(knobs::handle_update_cognitive_knob).delete(knobs::handle_remove_cognitive_knob),
        )
        .route("/api/knobs/llm/reset", post(knobs::handle_reset_llm_knobs))
        .route("/api/knobs/llm/:id", patch(knobs::handle_update_llm_knob))
        .route(
            "/api/knobs/system-prompt",
            put(knobs::handle_set_system_prompt),
        )
        .route("/api/knobs/source-text", put(knobs::handle_set_source_text))
        .route(
            "/api/session/generate",
            post(generation::handle_session_generate),
        )
        // Saved configurations
        .route(
            "/api/configurations",
            get(knobs::handle_list_configurations).post(knobs::handle_save_configuration),
        )
        .route(
            "/api/configurations/:id",
            get(knobs::handle_get_configuration).delete(knobs::handle_delete_configuration),
        )
        .route(
            "/api/configurations/:id/apply",
            post(knobs::handle_apply_configuration),
        )
        .with_state(state)
}
