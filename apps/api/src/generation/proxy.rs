//! Request construction and forwarding for one generation call.

use tracing::{debug, info};

use crate::errors::AppError;
use crate::knobs::models::GenerationRequest;
use crate::knobs::prompt::build_prompt;
use crate::llm_client::{Completion, LlmClient, MODEL};

/// Validates the request, builds the prompt and forwards it to the provider.
/// Stateless: nothing is recorded between calls.
pub async fn generate(llm: &LlmClient, request: &GenerationRequest) -> Result<Completion, AppError> {
    if request.source_text.trim().is_empty() {
        return Err(AppError::Validation("Source text is required".to_string()));
    }

    let prompt = build_prompt(
        &request.source_text,
        &request.cognitive_knobs,
        &request.system_prompt,
    );

    let knob_summary = request
        .cognitive_knobs
        .iter()
        .map(|k| format!("{}={}", k.name, k.value))
        .collect::<Vec<_>>()
        .join(", ");
    let params = &request.parameters;
    info!(
        model = MODEL,
        knobs = %knob_summary,
        temperature = params.temperature,
        max_tokens = params.max_tokens,
        top_p = params.top_p,
        "Forwarding generation request"
    );
    debug!("Full prompt:\n---START---\n{prompt}\n---END---");

    Ok(llm.complete(&prompt, params).await?)
}
