/// LLM Client — the single point of entry for all OpenRouter calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider directly.
///
/// Model and provider routing are hardcoded: every call goes to GLM 4.6 on
/// Cerebras with fallbacks disabled, so a failed route surfaces as an error
/// instead of silently landing on another backend.
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;
use crate::knobs::models::GenerationParameters;

/// The model used for every generation call.
pub const MODEL: &str = "z-ai/glm-4.6";
/// The only inference backend OpenRouter may route to.
pub const PROVIDER: &str = "cerebras";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OpenRouter API key is not configured")]
    MissingApiKey,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    provider: ProviderRouting<'a>,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
    frequency_penalty: f64,
    presence_penalty: f64,
    reasoning: ReasoningOptions,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ProviderRouting<'a> {
    only: [&'a str; 1],
    allow_fallbacks: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ReasoningOptions {
    enabled: bool,
}

impl<'a> ChatCompletionRequest<'a> {
    fn new(prompt: &'a str, parameters: &GenerationParameters) -> Self {
        Self {
            model: MODEL,
            provider: ProviderRouting {
                only: [PROVIDER],
                allow_fallbacks: false,
            },
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: parameters.temperature,
            max_tokens: parameters.max_tokens,
            top_p: parameters.top_p,
            frequency_penalty: parameters.frequency_penalty,
            presence_penalty: parameters.presence_penalty,
            // GLM 4.6 cannot emit partial reasoning; with it on, content comes back empty.
            reasoning: ReasoningOptions { enabled: false },
            stream: false,
        }
    }
}

/// A successful provider response: the exact body plus its parsed form.
#[derive(Debug, Clone)]
pub struct Completion {
    pub body: String,
    pub json: Value,
}

impl Completion {
    /// Text of the first choice, if any.
    pub fn content(&self) -> Option<&str> {
        self.json["choices"][0]["message"]["content"].as_str()
    }
}

/// Wraps the OpenRouter chat-completions endpoint. One request per call, no retries.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    completions_url: String,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Ok(v) = HeaderValue::from_str(&config.openrouter_referer) {
            headers.insert("HTTP-Referer", v);
        }
        if let Ok(v) = HeaderValue::from_str(&config.openrouter_app_title) {
            headers.insert("X-Title", v);
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.openrouter_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_key: config.openrouter_api_key.clone(),
            completions_url: format!(
                "{}/chat/completions",
                config.openrouter_base_url.trim_end_matches('/')
            ),
        })
    }

    /// Sends `prompt` as a single user message and returns the provider's body untouched.
    pub async fn complete(
        &self,
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<Completion, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let request_body = ChatCompletionRequest::new(prompt, parameters);

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("OpenRouter API error: {} {}", status.as_u16(), body);

            return Err(match status.as_u16() {
                429 => LlmError::RateLimited,
                401 => LlmError::InvalidApiKey,
                code => LlmError::Api { status: code, body },
            });
        }

        let body = response.text().await?;
        let json: Value = serde_json::from_str(&body)?;
        let completion = Completion { body, json };

        log_summary(&completion);
        Ok(completion)
    }
}

fn log_summary(completion: &Completion) {
    let json = &completion.json;
    let choices = json["choices"].as_array().map(Vec::len).unwrap_or(0);
    let content_len = completion.content().map(str::len).unwrap_or(0);

    info!(
        model = json["model"].as_str().unwrap_or("unknown"),
        choices,
        content_len,
        usage = %json["usage"],
        "OpenRouter response received"
    );
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn params() -> GenerationParameters {
        GenerationParameters {
            temperature: 1.1,
            max_tokens: 256,
            top_p: 0.5,
            frequency_penalty: 0.25,
            presence_penalty: 0.75,
        }
    }

    async fn client_for(server: &MockServer) -> LlmClient {
        LlmClient::new(&Config::for_tests(&server.uri(), Some("sk-test"))).unwrap()
    }

    #[test]
    fn test_request_body_pins_model_and_provider() {
        let body = serde_json::to_value(ChatCompletionRequest::new("hello", &params())).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "z-ai/glm-4.6",
                "provider": { "only": ["cerebras"], "allow_fallbacks": false },
                "messages": [{ "role": "user", "content": "hello" }],
                "temperature": 1.1,
                "max_tokens": 256,
                "top_p": 0.5,
                "frequency_penalty": 0.25,
                "presence_penalty": 0.75,
                "reasoning": { "enabled": false },
                "stream": false
            })
        );
    }

    #[test]
    fn test_completion_content() {
        let completion = Completion {
            body: String::new(),
            json: json!({ "choices": [{ "message": { "role": "assistant", "content": "done" } }] }),
        };
        assert_eq!(completion.content(), Some("done"));

        let empty = Completion {
            body: String::new(),
            json: json!({ "choices": [] }),
        };
        assert_eq!(empty.content(), None);
    }

    #[tokio::test]
    async fn test_complete_sends_auth_and_returns_raw_body() {
        let server = MockServer::start().await;
        let raw = r#"{"id":"gen-1","model":"z-ai/glm-4.6","choices":[{"message":{"role":"assistant","content":"hi"},"finish_reason":"stop"}]}"#;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("x-title", "Cognitive Knobs"))
            .and(body_partial_json(json!({
                "provider": { "only": ["cerebras"], "allow_fallbacks": false },
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(raw, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let completion = client_for(&server).await.complete("hi", &params()).await.unwrap();
        assert_eq!(completion.body, raw);
        assert_eq!(completion.content(), Some("hi"));
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = LlmClient::new(&Config::for_tests(&server.uri(), None)).unwrap();
        let err = client.complete("hi", &params()).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_status_codes_are_classified() {
        let cases: [(u16, fn(&LlmError) -> bool); 3] = [
            (429, |e| matches!(e, LlmError::RateLimited)),
            (401, |e| matches!(e, LlmError::InvalidApiKey)),
            (
                502,
                |e| matches!(e, LlmError::Api { status: 502, body } if body == "bad gateway"),
            ),
        ];

        for (status, check) in cases {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/chat/completions"))
                .respond_with(ResponseTemplate::new(status).set_body_string("bad gateway"))
                .mount(&server)
                .await;

            let err = client_for(&server).await.complete("hi", &params()).await.unwrap_err();
            assert!(check(&err), "unexpected error for {status}: {err:?}");
        }
    }

    #[tokio::test]
    async fn test_non_json_success_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.complete("hi", &params()).await.unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }
}
