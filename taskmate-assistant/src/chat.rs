/// Conversational task assistant
///
/// A [`ChatSession`] turns chat messages into assistant calls and keeps the
/// one piece of conversational state there is: a draft task waiting for the
/// user's yes or no.
///
/// ```text
///              create intent, draft found
///   Idle ─────────────────────────────────▶ AwaitingConfirmation(draft)
///    ▲                                            │    │
///    │        "yes": draft saved via TaskSink     │    │ anything else:
///    └────────────────────────────────────────────┘    │ re-prompt, stay
///    ▲        "no": draft discarded                    │
///    └─────────────────────────────────────────────────┘
/// ```
///
/// Provider or sink failures produce an apology and leave the state as it
/// was.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use taskmate_shared::models::{CreateTask, Task};

use crate::intent::{Confirmation, Intent, IntentDetector};
use crate::service::{AssistantResult, DraftTask, TaskAssistant};

pub const GREETING: &str = "Hello! I'm your AI task assistant. I can help you:\n\
     - create new tasks from natural language\n\
     - generate task suggestions\n\
     - summarize task descriptions\n\
     How can I help you today?";

pub const APOLOGY: &str =
    "I apologize, but I encountered an error processing your request. Please try again.";

/// Where confirmed drafts are saved
#[async_trait]
pub trait TaskSink: Send + Sync {
    async fn create_task(&self, task: CreateTask) -> AssistantResult<Task>;
}

/// Confirmation slot of a chat session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfirmationState {
    #[default]
    Idle,
    AwaitingConfirmation(DraftTask),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            speaker,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// One user's conversation with the assistant
pub struct ChatSession {
    assistant: TaskAssistant,
    detector: Box<dyn IntentDetector>,
    sink: Box<dyn TaskSink>,
    user_id: String,
    state: ConfirmationState,
    transcript: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(
        assistant: TaskAssistant,
        detector: Box<dyn IntentDetector>,
        sink: Box<dyn TaskSink>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            assistant,
            detector,
            sink,
            user_id: user_id.into(),
            state: ConfirmationState::Idle,
            transcript: vec![ChatMessage::new(Speaker::Assistant, GREETING)],
        }
    }

    pub fn state(&self) -> &ConfirmationState {
        &self.state
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Handles one user message and returns the assistant's reply
    ///
    /// Blank messages are ignored and return `None`.
    pub async fn send(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.transcript.push(ChatMessage::new(Speaker::User, text));

        let reply = match std::mem::take(&mut self.state) {
            ConfirmationState::AwaitingConfirmation(draft) => self.answer(draft, text).await,
            ConfirmationState::Idle => match self.respond(text).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(error = %e, "Assistant request failed");
                    APOLOGY.to_string()
                }
            },
        };

        self.transcript
            .push(ChatMessage::new(Speaker::Assistant, reply.clone()));
        Some(reply)
    }

    /// Resolves a pending draft; the state has already been taken
    async fn answer(&mut self, draft: DraftTask, text: &str) -> String {
        match self.detector.confirmation(text) {
            Some(Confirmation::Yes) => match self.sink.create_task(draft.to_create_task()).await {
                Ok(task) => {
                    tracing::info!(task_id = %task.id, "Created task from chat");
                    format!("Done! I've created the task \"{}\".", task.title)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Saving drafted task failed");
                    self.state = ConfirmationState::AwaitingConfirmation(draft);
                    APOLOGY.to_string()
                }
            },
            Some(Confirmation::No) => {
                format!("Okay, I won't create \"{}\".", draft.title)
            }
            None => {
                let reply = format!(
                    "Please answer yes to create \"{}\" or no to discard it.",
                    draft.title
                );
                self.state = ConfirmationState::AwaitingConfirmation(draft);
                reply
            }
        }
    }

    async fn respond(&mut self, text: &str) -> AssistantResult<String> {
        match self.detector.detect(text) {
            Some(Intent::Create) => {
                match self.assistant.draft_from_command(text, &self.user_id).await? {
                    Some(draft) => Ok(self.propose(draft)),
                    None => Ok("I couldn't turn that into a task. Try something like \
                         \"Create a task to review the proposal by Friday\"."
                        .to_string()),
                }
            }
            Some(Intent::Summarize) => self.summary(text).await,
            Some(Intent::Suggest) => {
                let suggestions = self
                    .assistant
                    .generate_suggestions(text, &self.user_id)
                    .await?;
                Ok(render_suggestions(&suggestions)
                    .unwrap_or_else(|| "I couldn't come up with any suggestions for that.".to_string()))
            }
            None => {
                if let Some(draft) = self.assistant.draft_from_command(text, &self.user_id).await? {
                    return Ok(self.propose(draft));
                }

                let suggestions = self
                    .assistant
                    .generate_suggestions(text, &self.user_id)
                    .await?;
                if let Some(list) = render_suggestions(&suggestions) {
                    return Ok(list);
                }

                self.summary(text).await
            }
        }
    }

    fn propose(&mut self, draft: DraftTask) -> String {
        let reply = format!(
            "I can create this task for you:\n\n{}\n\nShall I create it? (yes/no)",
            render_draft(&draft)
        );
        self.state = ConfirmationState::AwaitingConfirmation(draft);
        reply
    }

    async fn summary(&self, text: &str) -> AssistantResult<String> {
        let summary = self.assistant.summarize(text).await?;
        if summary.is_empty() {
            Ok("I couldn't summarize that.".to_string())
        } else {
            Ok(format!("Here's a concise summary:\n\n{}", summary))
        }
    }
}

fn render_draft(draft: &DraftTask) -> String {
    let mut lines = vec![format!("Title: {}", draft.title)];
    if let Some(description) = &draft.description {
        lines.push(format!("Description: {}", description));
    }
    if let Some(due) = draft.due_date {
        lines.push(format!("Due: {}", due));
    }
    lines.push(format!("Status: {}", draft.status));
    lines.join("\n")
}

fn render_suggestions(drafts: &[DraftTask]) -> Option<String> {
    if drafts.is_empty() {
        return None;
    }

    let items: Vec<String> = drafts
        .iter()
        .map(|d| match d.due_date {
            Some(due) => format!("- {} (Due: {})", d.title, due),
            None => format!("- {}", d.title),
        })
        .collect();

    Some(format!("Here are some task suggestions:\n\n{}", items.join("\n")))
}
