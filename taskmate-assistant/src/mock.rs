/// Scripted completion provider for tests and demos
///
/// Returns queued completions in order and records every request it
/// receives, so callers can assert on prompts and forced functions without
/// a network.
///
/// # Example
///
/// ```no_run
/// use taskmate_assistant::mock::ScriptedProvider;
/// use taskmate_assistant::provider::Completion;
///
/// let provider = ScriptedProvider::new()
///     .then(Completion::text("A short summary"))
///     .then(Completion::call("create_task", r#"{"title":"Review"}"#));
/// assert_eq!(provider.remaining(), 2);
/// ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::provider::{Completion, CompletionProvider, CompletionRequest, ProviderError, ProviderResult};

enum Scripted {
    Reply(Completion),
    Fail(String),
}

#[derive(Default)]
struct Script {
    queue: VecDeque<Scripted>,
    requests: Vec<CompletionRequest>,
}

/// Provider that replays a fixed script
///
/// Clones share the same script, so a test can keep a handle after giving
/// one to the assistant.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    script: Arc<Mutex<Script>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a completion
    pub fn then(self, completion: Completion) -> Self {
        self.lock().queue.push_back(Scripted::Reply(completion));
        self
    }

    /// Queues a provider failure
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.lock().queue.push_back(Scripted::Fail(message.into()));
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.lock().requests.clone()
    }

    /// Queued completions not yet consumed
    pub fn remaining(&self) -> usize {
        self.lock().queue.len()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        // A poisoned script only means an earlier test thread panicked.
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> ProviderResult<Completion> {
        let mut script = self.lock();
        script.requests.push(request);

        match script.queue.pop_front() {
            Some(Scripted::Reply(completion)) => Ok(completion),
            Some(Scripted::Fail(message)) => Err(ProviderError::Http(message)),
            None => Err(ProviderError::Exhausted),
        }
    }
}
