/// Task assistant operations
///
/// [`TaskAssistant`] wraps a [`CompletionProvider`] with the three
/// operations the chat needs:
///
/// - `generate_suggestions`: zero or more draft tasks from a free-form prompt
/// - `draft_from_command`: at most one draft task from a command
/// - `summarize`: a short plain-text summary
///
/// The assistant is stateless. Model output is never trusted as-is: drafts
/// are normalized before they reach the caller (see [`DraftTask`]).

use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};
use taskmate_shared::models::{CreateTask, TaskStatus};
use thiserror::Error;

use crate::provider::{
    Completion, CompletionProvider, CompletionRequest, FunctionSpec, PromptMessage, ProviderError,
};

const SUGGEST_PROMPT: &str =
    "You are a helpful task management assistant. Generate task suggestions based on user input.";
const COMMAND_PROMPT: &str = "You are a helpful task management assistant. \
     Convert natural language commands into structured task data.";
const SUMMARY_PROMPT: &str =
    "You are a helpful assistant that summarizes task descriptions concisely.";

const GENERATE_TASKS: &str = "generate_tasks";
const CREATE_TASK: &str = "create_task";
const SUMMARY_MAX_TOKENS: u32 = 100;

/// Assistant errors
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The model answered without calling the forced function
    #[error("Model did not call {0}")]
    MissingFunctionCall(&'static str),

    /// The function arguments were not the expected JSON shape
    #[error("Malformed function arguments: {0}")]
    MalformedArguments(String),

    /// Committing a draft failed
    #[error("Could not save task: {0}")]
    TaskSink(String),
}

pub type AssistantResult<T> = Result<T, AssistantError>;

/// A task proposed by the model, already normalized
///
/// - `title` is trimmed and never blank
/// - `description` is trimmed, blank becomes `None`
/// - `due_date` is a calendar date, unparseable values are dropped
/// - `user_id` comes from the session, never from the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub user_id: String,
}

impl DraftTask {
    /// The create payload for this draft
    pub fn to_create_task(&self) -> CreateTask {
        CreateTask {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            status: Some(self.status),
            user_id: self.user_id.clone(),
        }
    }
}

/// Draft as the model returns it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDraft {
    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    due_date: Option<String>,

    #[serde(default)]
    status: Option<String>,
}

impl RawDraft {
    fn normalize(self, user_id: &str) -> Option<DraftTask> {
        let title = self.title?.trim().to_string();
        if title.is_empty() {
            return None;
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Some(DraftTask {
            title,
            description,
            due_date: self.due_date.as_deref().and_then(parse_due_date),
            status: self
                .status
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            user_id: user_id.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct Suggestions {
    tasks: Vec<RawDraft>,
}

/// Parses `YYYY-MM-DD` or an RFC 3339 timestamp into a calendar date
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
}

fn task_properties() -> Value {
    json!({
        "title": { "type": "string" },
        "description": { "type": "string" },
        "dueDate": { "type": "string", "format": "date" },
        "status": {
            "type": "string",
            "enum": ["PENDING", "IN_PROGRESS", "COMPLETED"],
            "default": "PENDING"
        }
    })
}

fn generate_tasks_function() -> FunctionSpec {
    FunctionSpec {
        name: GENERATE_TASKS.to_string(),
        description: "Propose tasks for the user".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "tasks": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": task_properties(),
                        "required": ["title"]
                    }
                }
            },
            "required": ["tasks"]
        }),
    }
}

fn create_task_function() -> FunctionSpec {
    FunctionSpec {
        name: CREATE_TASK.to_string(),
        description: "Create a single task from the user's command".to_string(),
        parameters: json!({
            "type": "object",
            "properties": task_properties(),
            "required": ["title"]
        }),
    }
}

/// Arguments of the forced call, if the model made it
fn function_arguments(completion: Completion, expected: &str) -> Option<String> {
    match completion.function_call {
        Some(call) if call.name == expected => Some(call.arguments),
        Some(call) => {
            tracing::warn!(expected, actual = %call.name, "Model called an unexpected function");
            None
        }
        None => None,
    }
}

/// Stateless assistant over a completion provider
#[derive(Clone)]
pub struct TaskAssistant {
    provider: Arc<dyn CompletionProvider>,
}

impl TaskAssistant {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Generates suggested tasks for `user_id`
    ///
    /// An empty prompt yields no suggestions without calling the provider.
    pub async fn generate_suggestions(
        &self,
        prompt: &str,
        user_id: &str,
    ) -> AssistantResult<Vec<DraftTask>> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(Vec::new());
        }

        let request = CompletionRequest::new(vec![
            PromptMessage::system(SUGGEST_PROMPT),
            PromptMessage::user(prompt),
        ])
        .with_function(generate_tasks_function());

        let completion = self.provider.complete(request).await?;
        let arguments = function_arguments(completion, GENERATE_TASKS)
            .ok_or(AssistantError::MissingFunctionCall(GENERATE_TASKS))?;

        let suggestions: Suggestions = serde_json::from_str(&arguments)
            .map_err(|e| AssistantError::MalformedArguments(e.to_string()))?;

        let drafts: Vec<DraftTask> = suggestions
            .tasks
            .into_iter()
            .filter_map(|raw| raw.normalize(user_id))
            .collect();

        tracing::debug!(provider = self.provider.name(), count = drafts.len(), "Generated suggestions");
        Ok(drafts)
    }

    /// Turns a command into a single draft task for `user_id`
    ///
    /// Returns `None` when the model declines to call the function or
    /// proposes a task without a title.
    pub async fn draft_from_command(
        &self,
        command: &str,
        user_id: &str,
    ) -> AssistantResult<Option<DraftTask>> {
        let command = command.trim();
        if command.is_empty() {
            return Ok(None);
        }

        let request = CompletionRequest::new(vec![
            PromptMessage::system(COMMAND_PROMPT),
            PromptMessage::user(command),
        ])
        .with_function(create_task_function());

        let completion = self.provider.complete(request).await?;
        let Some(arguments) = function_arguments(completion, CREATE_TASK) else {
            return Ok(None);
        };

        let raw: RawDraft = serde_json::from_str(&arguments)
            .map_err(|e| AssistantError::MalformedArguments(e.to_string()))?;

        Ok(raw.normalize(user_id))
    }

    /// Summarizes `text`; an empty answer yields an empty string
    pub async fn summarize(&self, text: &str) -> AssistantResult<String> {
        let request = CompletionRequest::new(vec![
            PromptMessage::system(SUMMARY_PROMPT),
            PromptMessage::user(format!(
                "Please summarize this task description in a concise way: {}",
                text.trim()
            )),
        ])
        .with_max_tokens(SUMMARY_MAX_TOKENS);

        let completion = self.provider.complete(request).await?;
        Ok(completion
            .content
            .map(|c| c.trim().to_string())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedProvider;

    fn assistant(provider: &ScriptedProvider) -> TaskAssistant {
        TaskAssistant::new(Arc::new(provider.clone()))
    }

    #[test]
    fn test_parse_due_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 31);
        assert_eq!(parse_due_date("2025-03-31"), expected);
        assert_eq!(parse_due_date(" 2025-03-31 "), expected);
        assert_eq!(parse_due_date("2025-03-31T09:30:00Z"), expected);
        assert_eq!(parse_due_date("2025-03-31T23:30:00-02:00"), expected);
        assert_eq!(parse_due_date("next friday"), None);
        assert_eq!(parse_due_date(""), None);
    }

    #[tokio::test]
    async fn test_suggestions_are_normalized() {
        let provider = ScriptedProvider::new().then(Completion::call(
            GENERATE_TASKS,
            r#"{"tasks":[
                {"title":"  Plan retro ","description":"  ","dueDate":"2025-02-01T10:00:00Z","status":"in progress","userId":"model-made-this-up"},
                {"title":"   "},
                {"title":"Book room","dueDate":"soon","status":"SOMEDAY"}
            ]}"#,
        ));

        let drafts = assistant(&provider)
            .generate_suggestions("Improve team communication", "u1")
            .await
            .unwrap();

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].title, "Plan retro");
        assert_eq!(drafts[0].description, None);
        assert_eq!(drafts[0].due_date, NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(drafts[0].status, TaskStatus::InProgress);
        assert_eq!(drafts[0].user_id, "u1");
        assert_eq!(drafts[1].due_date, None);
        assert_eq!(drafts[1].status, TaskStatus::Pending);

        let request = &provider.requests()[0];
        assert_eq!(request.function.as_ref().unwrap().name, GENERATE_TASKS);
        assert_eq!(request.messages[0].content, SUGGEST_PROMPT);
        assert_eq!(request.messages[1].content, "Improve team communication");
    }

    #[tokio::test]
    async fn test_empty_prompt_skips_provider() {
        let provider = ScriptedProvider::new();
        let drafts = assistant(&provider)
            .generate_suggestions("   ", "u1")
            .await
            .unwrap();

        assert!(drafts.is_empty());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_suggestions_without_call_is_error() {
        let provider = ScriptedProvider::new().then(Completion::text("Here are some ideas"));
        let err = assistant(&provider)
            .generate_suggestions("ideas", "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::MissingFunctionCall(GENERATE_TASKS)));
    }

    #[tokio::test]
    async fn test_suggestions_malformed_arguments() {
        let provider = ScriptedProvider::new()
            .then(Completion::call(GENERATE_TASKS, "{not json"))
            .then(Completion::call(GENERATE_TASKS, r#"{"tasks":"nope"}"#));
        let assistant = assistant(&provider);

        for _ in 0..2 {
            let err = assistant.generate_suggestions("ideas", "u1").await.unwrap_err();
            assert!(matches!(err, AssistantError::MalformedArguments(_)));
        }
    }

    #[tokio::test]
    async fn test_draft_from_command() {
        let provider = ScriptedProvider::new().then(Completion::call(
            CREATE_TASK,
            r#"{"title":"Review the project proposal","dueDate":"2025-06-20"}"#,
        ));

        let draft = assistant(&provider)
            .draft_from_command("Create a task to review the project proposal by Friday", "u7")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(draft.title, "Review the project proposal");
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2025, 6, 20));
        assert_eq!(draft.status, TaskStatus::Pending);

        let create = draft.to_create_task();
        assert_eq!(create.user_id, "u7");
        assert_eq!(create.status, Some(TaskStatus::Pending));
        assert_eq!(
            provider.requests()[0].function.as_ref().unwrap().name,
            CREATE_TASK
        );
    }

    #[tokio::test]
    async fn test_draft_missing_call_or_title_is_none() {
        let provider = ScriptedProvider::new()
            .then(Completion::text("I can't do that"))
            .then(Completion::call(CREATE_TASK, r#"{"description":"no title"}"#))
            .then(Completion::call("something_else", r#"{"title":"x"}"#));
        let assistant = assistant(&provider);

        for _ in 0..3 {
            assert_eq!(assistant.draft_from_command("do it", "u1").await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_draft_malformed_is_error() {
        let provider =
            ScriptedProvider::new().then(Completion::call(CREATE_TASK, r#"{"title": 5}"#));
        let err = assistant(&provider)
            .draft_from_command("add a task", "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::MalformedArguments(_)));
    }

    #[tokio::test]
    async fn test_summarize() {
        let provider = ScriptedProvider::new()
            .then(Completion::text("  Ship the Q3 report.  "))
            .then(Completion::default());
        let assistant = assistant(&provider);

        assert_eq!(
            assistant.summarize("A long description").await.unwrap(),
            "Ship the Q3 report."
        );
        assert_eq!(assistant.summarize("Another").await.unwrap(), "");

        let request = &provider.requests()[0];
        assert_eq!(request.max_tokens, Some(100));
        assert!(request.function.is_none());
        assert_eq!(
            request.messages[1].content,
            "Please summarize this task description in a concise way: A long description"
        );
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = ScriptedProvider::new().then_fail("connection reset");
        let err = assistant(&provider).summarize("x").await.unwrap_err();
        assert!(matches!(err, AssistantError::Provider(ProviderError::Http(_))));
    }
}
