//! Axum route handlers for the Generation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::errors::AppError;
use crate::generation::proxy::generate;
use crate::knobs::models::GenerationRequest;
use crate::llm_client::Completion;
use crate::state::AppState;

/// POST /api/generate
///
/// Stateless proxy: builds the prompt from the body and relays the provider's JSON verbatim.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let completion = generate(&state.llm, &request).await?;
    Ok(relay(completion))
}

/// POST /api/session/generate
///
/// Generates from the session's current knobs and source text, recording the
/// outcome in the session. The busy flag is advisory only.
pub async fn handle_session_generate(State(state): State<AppState>) -> Result<Response, AppError> {
    let request = {
        let mut knobs = state.knobs.lock().await;
        if knobs.is_generating() {
            warn!("Session generation started while another is in flight");
        }
        knobs.set_generating(true);
        knobs.set_error("");
        knobs.generation_request()
    };

    let result = generate(&state.llm, &request).await;

    let mut knobs = state.knobs.lock().await;
    knobs.set_generating(false);
    match result {
        Ok(completion) => {
            knobs.set_response(completion.content().unwrap_or_default());
            Ok(relay(completion))
        }
        Err(e) => {
            knobs.set_error(session_error_message(&e));
            Err(e)
        }
    }
}

fn relay(completion: Completion) -> Response {
    ([(CONTENT_TYPE, "application/json")], completion.body).into_response()
}

fn session_error_message(err: &AppError) -> String {
    match err {
        AppError::Validation(msg) | AppError::InvalidCredential(msg) | AppError::NotFound(msg) => {
            msg.clone()
        }
        AppError::RateLimited => "Rate limit exceeded. Please try again later.".to_string(),
        AppError::Upstream { body, .. } => format!("API request failed: {body}"),
        AppError::Internal(_) => crate::errors::INTERNAL_MESSAGE.to_string(),
    }
}
