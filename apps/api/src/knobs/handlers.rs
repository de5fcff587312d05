//! Axum route handlers for the knob session, saved configurations and example texts.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::knobs::defaults::EXAMPLE_TEXTS;
use crate::knobs::models::{CognitiveKnob, ExampleText, KnobConfiguration};
use crate::knobs::store::{KnobSnapshot, KnobStore};
use crate::state::AppState;
use crate::storage::configurations::{
    delete_configuration, load_all_configurations, load_configuration, save_configuration,
};
use crate::storage::KeyValueStore;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// A new cognitive knob. The id is generated when omitted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCognitiveKnob {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_knob_value")]
    pub value: f64,
    pub low_label: Option<String>,
    pub high_label: Option<String>,
}

fn default_knob_value() -> f64 {
    50.0
}

#[derive(Debug, Deserialize)]
pub struct KnobValueUpdate {
    pub value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemPromptUpdate {
    pub system_prompt: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceTextUpdate {
    pub source_text: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveConfigurationRequest {
    pub name: String,
}

fn finite(value: f64) -> Result<f64, AppError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AppError::Validation("value must be a finite number".to_string()))
    }
}

/// Runs `f` against the knob session on the blocking pool. Knob mutations
/// write through to storage, so they must not run on a runtime worker.
async fn with_knobs<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&mut KnobStore) -> T + Send + 'static,
    T: Send + 'static,
{
    let knobs = state.knobs.clone();
    tokio::task::spawn_blocking(move || {
        let mut guard = knobs.blocking_lock();
        f(&mut *guard)
    })
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

/// Runs a synchronous storage call on the blocking pool.
async fn with_storage<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&dyn KeyValueStore) -> T + Send + 'static,
    T: Send + 'static,
{
    let storage = state.storage.clone();
    tokio::task::spawn_blocking(move || f(storage.as_ref()))
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

// ────────────────────────────────────────────────────────────────────────────
// Knob session
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/knobs
pub async fn handle_get_knobs(State(state): State<AppState>) -> Json<KnobSnapshot> {
    Json(state.knobs.lock().await.snapshot())
}

/// POST /api/knobs/cognitive
pub async fn handle_add_cognitive_knob(
    State(state): State<AppState>,
    payload: Result<Json<NewCognitiveKnob>, JsonRejection>,
) -> Result<(StatusCode, Json<KnobSnapshot>), AppError> {
    let Json(new) = payload?;
    if new.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let knob = CognitiveKnob {
        id: new
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        name: new.name,
        description: new.description,
        value: finite(new.value)?,
        low_label: new.low_label,
        high_label: new.high_label,
    };

    let snapshot = with_knobs(&state, move |knobs| {
        knobs.add_cognitive_knob(knob);
        knobs.snapshot()
    })
    .await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// PATCH /api/knobs/cognitive/:id
pub async fn handle_update_cognitive_knob(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<KnobValueUpdate>, JsonRejection>,
) -> Result<Json<KnobSnapshot>, AppError> {
    let Json(update) = payload?;
    let value = finite(update.value)?;

    let updated = {
        let id = id.clone();
        with_knobs(&state, move |knobs| {
            knobs
                .update_cognitive_knob(&id, value)
                .then(|| knobs.snapshot())
        })
        .await?
    };
    updated
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Cognitive knob {id} not found")))
}

/// DELETE /api/knobs/cognitive/:id
pub async fn handle_remove_cognitive_knob(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<KnobSnapshot>, AppError> {
    let snapshot = with_knobs(&state, move |knobs| {
        knobs.remove_cognitive_knob(&id);
        knobs.snapshot()
    })
    .await?;
    Ok(Json(snapshot))
}

/// POST /api/knobs/cognitive/reset
pub async fn handle_reset_cognitive_knobs(
    State(state): State<AppState>,
) -> Result<Json<KnobSnapshot>, AppError> {
    let snapshot = with_knobs(&state, |knobs| {
        knobs.reset_cognitive_knobs();
        knobs.snapshot()
    })
    .await?;
    Ok(Json(snapshot))
}

/// PATCH /api/knobs/llm/:id
pub async fn handle_update_llm_knob(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<KnobValueUpdate>, JsonRejection>,
) -> Result<Json<KnobSnapshot>, AppError> {
    let Json(update) = payload?;
    let value = finite(update.value)?;

    let updated = {
        let id = id.clone();
        with_knobs(&state, move |knobs| {
            knobs.update_llm_knob(&id, value).then(|| knobs.snapshot())
        })
        .await?
    };
    updated
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("LLM knob {id} not found")))
}

/// POST /api/knobs/llm/reset
pub async fn handle_reset_llm_knobs(
    State(state): State<AppState>,
) -> Result<Json<KnobSnapshot>, AppError> {
    let snapshot = with_knobs(&state, |knobs| {
        knobs.reset_llm_knobs();
        knobs.snapshot()
    })
    .await?;
    Ok(Json(snapshot))
}

/// PUT /api/knobs/system-prompt
pub async fn handle_set_system_prompt(
    State(state): State<AppState>,
    payload: Result<Json<SystemPromptUpdate>, JsonRejection>,
) -> Result<Json<KnobSnapshot>, AppError> {
    let Json(update) = payload?;
    let mut knobs = state.knobs.lock().await;
    knobs.set_system_prompt(update.system_prompt);
    Ok(Json(knobs.snapshot()))
}

/// PUT /api/knobs/source-text
pub async fn handle_set_source_text(
    State(state): State<AppState>,
    payload: Result<Json<SourceTextUpdate>, JsonRejection>,
) -> Result<Json<KnobSnapshot>, AppError> {
    let Json(update) = payload?;
    let mut knobs = state.knobs.lock().await;
    knobs.set_source_text(update.source_text);
    Ok(Json(knobs.snapshot()))
}

// ────────────────────────────────────────────────────────────────────────────
// Saved configurations
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/configurations
pub async fn handle_list_configurations(
    State(state): State<AppState>,
) -> Result<Json<Vec<KnobConfiguration>>, AppError> {
    with_storage(&state, load_all_configurations).await.map(Json)
}

/// POST /api/configurations
///
/// Saves the session's current knobs and system prompt under a new id.
pub async fn handle_save_configuration(
    State(state): State<AppState>,
    payload: Result<Json<SaveConfigurationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<KnobConfiguration>), AppError> {
    let Json(request) = payload?;
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let config = {
        let knobs = state.knobs.lock().await;
        KnobConfiguration {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            cognitive_knobs: knobs.cognitive_knobs().to_vec(),
            llm_knobs: knobs.llm_knobs().to_vec(),
            system_prompt: knobs.system_prompt().to_string(),
            created_at: Utc::now(),
        }
    };

    let saved = config.clone();
    with_storage(&state, move |store| save_configuration(store, &saved)).await?;
    Ok((StatusCode::CREATED, Json(config)))
}

/// GET /api/configurations/:id
pub async fn handle_get_configuration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<KnobConfiguration>, AppError> {
    let lookup = id.clone();
    with_storage(&state, move |store| load_configuration(store, &lookup))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Configuration {id} not found")))
}

/// DELETE /api/configurations/:id
pub async fn handle_delete_configuration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let target = id.clone();
    if with_storage(&state, move |store| delete_configuration(store, &target)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Configuration {id} not found")))
    }
}

/// POST /api/configurations/:id/apply
pub async fn handle_apply_configuration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<KnobSnapshot>, AppError> {
    let lookup = id.clone();
    let config = with_storage(&state, move |store| load_configuration(store, &lookup))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Configuration {id} not found")))?;

    let snapshot = with_knobs(&state, move |knobs| {
        knobs.apply_configuration(&config);
        knobs.snapshot()
    })
    .await?;
    Ok(Json(snapshot))
}

/// GET /api/examples
pub async fn handle_list_examples() -> Json<&'static [ExampleText]> {
    Json(EXAMPLE_TEXTS)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::state::AppState;
    use crate::storage::load_knob_state;

    fn state() -> AppState {
        AppState::for_tests("http://127.0.0.1:9", None)
    }

    async fn call(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_get_knobs_includes_derived_parameters() {
        let (status, json) = call(&state(), "GET", "/api/knobs", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["cognitiveKnobs"].as_array().unwrap().len(), 3);
        assert_eq!(json["parameters"]["max_tokens"], 1000);
        assert_eq!(json["parameters"]["presence_penalty"], 0.0);
        assert_eq!(json["isGenerating"], false);
    }

    #[tokio::test]
    async fn test_add_update_remove_cognitive_knob() {
        let state = state();

        let (status, json) = call(
            &state,
            "POST",
            "/api/knobs/cognitive",
            Some(json!({ "id": "whimsy", "name": "Whimsy", "description": "Playfulness", "value": 65 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["cognitiveKnobs"][3]["id"], "whimsy");

        let (status, json) = call(
            &state,
            "PATCH",
            "/api/knobs/cognitive/whimsy",
            Some(json!({ "value": 12 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["cognitiveKnobs"][3]["value"], 12.0);

        let (status, json) = call(&state, "DELETE", "/api/knobs/cognitive/whimsy", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["cognitiveKnobs"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_add_knob_generates_id() {
        let (status, json) = call(
            &state(),
            "POST",
            "/api/knobs/cognitive",
            Some(json!({ "name": "Formality" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let added = &json["cognitiveKnobs"][3];
        assert!(!added["id"].as_str().unwrap().is_empty());
        assert_eq!(added["value"], 50.0);
    }

    #[tokio::test]
    async fn test_update_unknown_knob_is_404() {
        let state = state();
        let (status, _) = call(&state, "PATCH", "/api/knobs/cognitive/nope", Some(json!({ "value": 1 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&state, "PATCH", "/api/knobs/llm/nope", Some(json!({ "value": 1 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_llm_knob_update_changes_parameters() {
        let state = state();
        let (status, json) = call(&state, "PATCH", "/api/knobs/llm/temp", Some(json!({ "value": 1.4 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["parameters"]["temperature"], 1.4);

        let (_, json) = call(&state, "POST", "/api/knobs/llm/reset", None).await;
        assert_eq!(json["parameters"]["temperature"], 0.7);
    }

    #[tokio::test]
    async fn test_save_list_apply_delete_configuration() {
        let state = state();
        call(
            &state,
            "PUT",
            "/api/knobs/system-prompt",
            Some(json!({ "systemPrompt": "Be terse." })),
        )
        .await;

        let (status, saved) = call(
            &state,
            "POST",
            "/api/configurations",
            Some(json!({ "name": "Terse" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = saved["id"].as_str().unwrap().to_string();

        let (_, list) = call(&state, "GET", "/api/configurations", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, loaded) = call(&state, "GET", &format!("/api/configurations/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(loaded, saved);

        call(
            &state,
            "PUT",
            "/api/knobs/system-prompt",
            Some(json!({ "systemPrompt": "Be verbose." })),
        )
        .await;
        let (status, snapshot) = call(
            &state,
            "POST",
            &format!("/api/configurations/{id}/apply"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["systemPrompt"], "Be terse.");

        let (status, _) = call(&state, "DELETE", &format!("/api/configurations/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&state, "GET", &format!("/api/configurations/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_knob_edits_write_through_to_storage() {
        let state = state();
        let (status, _) = call(&state, "PATCH", "/api/knobs/llm/temp", Some(json!({ "value": 1.1 }))).await;
        assert_eq!(status, StatusCode::OK);

        let persisted = load_knob_state(state.storage.as_ref());
        let llm_knobs = persisted.llm_knobs.unwrap();
        let temp = llm_knobs.iter().find(|k| k.id == "temp").unwrap();
        assert_eq!(temp.value, 1.1);

        let (status, _) = call(&state, "DELETE", "/api/knobs/cognitive/abstraction", None).await;
        assert_eq!(status, StatusCode::OK);
        let persisted = load_knob_state(state.storage.as_ref());
        assert!(persisted
            .cognitive_knobs
            .unwrap()
            .iter()
            .all(|k| k.id != "abstraction"));
    }

    #[tokio::test]
    async fn test_blank_configuration_name_is_rejected() {
        let (status, _) = call(
            &state(),
            "POST",
            "/api/configurations",
            Some(json!({ "name": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_examples_listed() {
        let (status, json) = call(&state(), "GET", "/api/examples", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["id"] == "shakespeare"));
    }
}
