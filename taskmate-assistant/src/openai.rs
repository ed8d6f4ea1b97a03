/// OpenAI-compatible chat completion provider
///
/// Posts to `{base_url}/chat/completions`. A forced function is sent as a
/// single tool with `tool_choice` naming it; both the `tool_calls` and the
/// legacy `function_call` answer shapes are accepted, so any compatible
/// server works.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::provider::{
    Completion, CompletionProvider, CompletionRequest, FunctionCall, ProviderError, ProviderResult,
};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Connection settings for [`OpenAiProvider`]
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Provider backed by the chat completions HTTP API
pub struct OpenAiProvider {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "messages": request.messages,
        });

        if let Some(function) = &request.function {
            body["tools"] = json!([{ "type": "function", "function": function }]);
            body["tool_choice"] = json!({
                "type": "function",
                "function": { "name": function.name },
            });
        }
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        body
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,

    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,

    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl From<ResponseMessage> for Completion {
    fn from(message: ResponseMessage) -> Self {
        let function_call = message
            .tool_calls
            .and_then(|calls| calls.into_iter().next())
            .map(|call| call.function)
            .or(message.function_call);

        Completion {
            content: message.content,
            function_call,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> ProviderResult<Completion> {
        tracing::debug!(
            model = %self.config.model,
            function = ?request.function.as_ref().map(|f| f.name.as_str()),
            "Requesting completion"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.body(&request))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            tracing::warn!(status = status.as_u16(), %message, "Completion request failed");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.into())
            .ok_or_else(|| ProviderError::InvalidResponse("response has no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FunctionSpec, PromptMessage};
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Upstream {
        status: StatusCode,
        reply: Value,
        seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    async fn chat_completions(
        State(upstream): State<Upstream>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        upstream.seen.lock().unwrap().push((auth, body));
        (upstream.status, Json(upstream.reply.clone()))
    }

    /// Serves a fake completions endpoint and returns its base URL
    async fn serve(upstream: Upstream) -> String {
        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(upstream);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1/", addr)
    }

    fn system_and_user(system: &str, user: &str) -> Vec<PromptMessage> {
        vec![PromptMessage::system(system), PromptMessage::user(user)]
    }

    fn provider(base_url: String) -> OpenAiProvider {
        OpenAiProvider::new(OpenAiConfig {
            api_key: "sk-test".to_string(),
            model: "test-model".to_string(),
            base_url,
        })
    }

    #[test]
    fn test_config_defaults() {
        let config = OpenAiConfig::new("k");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
    }

    #[tokio::test]
    async fn test_forced_tool_call_round_trip() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let base = serve(Upstream {
            status: StatusCode::OK,
            reply: json!({
                "choices": [{
                    "message": {
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": { "name": "create_task", "arguments": "{\"title\":\"A\"}" }
                        }]
                    }
                }]
            }),
            seen: seen.clone(),
        })
        .await;

        let request = CompletionRequest::new(system_and_user("sys", "make a task"))
            .with_function(FunctionSpec {
                name: "create_task".to_string(),
                description: "Create a task".to_string(),
                parameters: json!({ "type": "object" }),
            })
            .with_max_tokens(50);

        let completion = provider(base).complete(request).await.unwrap();
        let call = completion.function_call.unwrap();
        assert_eq!(call.name, "create_task");
        assert_eq!(call.arguments, "{\"title\":\"A\"}");

        let seen = seen.lock().unwrap();
        let (auth, body) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "make a task");
        assert_eq!(body["tools"][0]["function"]["name"], "create_task");
        assert_eq!(body["tool_choice"]["function"]["name"], "create_task");
        assert_eq!(body["max_tokens"], 50);
    }

    #[tokio::test]
    async fn test_legacy_function_call_and_plain_text() {
        let base = serve(Upstream {
            status: StatusCode::OK,
            reply: json!({
                "choices": [{
                    "message": {
                        "content": "summary",
                        "function_call": { "name": "generate_tasks", "arguments": "{}" }
                    }
                }]
            }),
            seen: Arc::new(Mutex::new(Vec::new())),
        })
        .await;

        let completion = provider(base)
            .complete(CompletionRequest::new(system_and_user("s", "u")))
            .await
            .unwrap();
        assert_eq!(completion.content.as_deref(), Some("summary"));
        assert_eq!(completion.function_call.unwrap().name, "generate_tasks");
    }

    #[tokio::test]
    async fn test_error_status_is_typed() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let base = serve(Upstream {
            status: StatusCode::UNAUTHORIZED,
            reply: json!({ "error": { "message": "Incorrect API key" } }),
            seen: seen.clone(),
        })
        .await;

        let err = provider(base)
            .complete(CompletionRequest::new(system_and_user("s", "u")))
            .await
            .unwrap_err();

        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(seen.lock().unwrap()[0].1.get("tools").is_none());
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid() {
        let base = serve(Upstream {
            status: StatusCode::OK,
            reply: json!({ "choices": [] }),
            seen: Arc::new(Mutex::new(Vec::new())),
        })
        .await;

        let err = provider(base)
            .complete(CompletionRequest::new(system_and_user("s", "u")))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
