/// Completion provider abstraction
///
/// The assistant talks to a language model through the [`CompletionProvider`]
/// trait so the HTTP-backed provider can be swapped for a scripted one in
/// tests and demos.
///
/// A request is a list of prompt messages plus, optionally, a single
/// function the model is forced to call. Providers return either plain text
/// content, a function call whose `arguments` is a JSON string, or both.
///
/// # Example
///
/// ```no_run
/// use taskmate_assistant::provider::{CompletionProvider, CompletionRequest, PromptMessage};
///
/// # async fn example(provider: &dyn CompletionProvider) -> Result<(), Box<dyn std::error::Error>> {
/// let request = CompletionRequest::new(vec![
///     PromptMessage::system("You are terse."),
///     PromptMessage::user("Say hi"),
/// ]);
///
/// let completion = provider.complete(request).await?;
/// println!("{}", completion.content.unwrap_or_default());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised by a completion provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure (connect, TLS, timeout)
    #[error("Provider request failed: {0}")]
    Http(String),

    /// The provider answered with a non-success status
    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider answered with a body we could not interpret
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// A scripted provider ran out of responses
    #[error("No scripted response left")]
    Exhausted,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Http(err.to_string())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Author of a prompt message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One message of the prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// A function the model can be made to call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,

    /// JSON Schema of the arguments object
    pub parameters: Value,
}

/// A single completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,

    /// When set, the model must answer by calling this function
    pub function: Option<FunctionSpec>,

    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<PromptMessage>) -> Self {
        Self {
            messages,
            function: None,
            max_tokens: None,
        }
    }

    /// Forces the model to call `function`
    pub fn with_function(mut self, function: FunctionSpec) -> Self {
        self.function = Some(function);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A function call produced by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,

    /// Raw JSON text, not yet validated
    pub arguments: String,
}

/// What the model answered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub content: Option<String>,
    pub function_call: Option<FunctionCall>,
}

impl Completion {
    /// A text-only answer
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            function_call: None,
        }
    }

    /// A function-call answer with the given JSON arguments
    pub fn call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            content: None,
            function_call: Some(FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            }),
        }
    }
}

/// Core provider trait
///
/// Implementations must be cheap to share; the assistant holds them behind
/// an `Arc`.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the provider name, used for logging
    fn name(&self) -> &str;

    /// Runs one completion
    async fn complete(&self, request: CompletionRequest) -> ProviderResult<Completion>;
}
