//! # TaskMate Assistant
//!
//! Client-side half of TaskMate: a typed REST client and an AI chat
//! assistant that drafts, suggests and summarizes tasks.
//!
//! ## Modules
//!
//! - `provider`: completion provider trait and request/response types
//! - `openai`: OpenAI-compatible HTTP provider
//! - `mock`: scripted provider for tests
//! - `service`: suggestion, drafting and summary operations
//! - `intent`: intent and yes/no detection
//! - `chat`: conversational session with draft confirmation
//! - `client`: REST client and session-scoped task sink
//! - `config`: chat binary configuration
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskmate_assistant::chat::ChatSession;
//! use taskmate_assistant::client::{ApiClient, SessionTaskSink};
//! use taskmate_assistant::intent::KeywordIntentDetector;
//! use taskmate_assistant::openai::{OpenAiConfig, OpenAiProvider};
//! use taskmate_assistant::service::TaskAssistant;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ApiClient::new("http://localhost:5000");
//! let session = client.login("ada@example.com", "password123").await?;
//!
//! let assistant = TaskAssistant::new(Arc::new(OpenAiProvider::new(OpenAiConfig::new("sk-..."))));
//! let mut chat = ChatSession::new(
//!     assistant,
//!     Box::new(KeywordIntentDetector::new()?),
//!     Box::new(SessionTaskSink::new(client, session.clone())),
//!     session.user.id.to_string(),
//! );
//!
//! if let Some(reply) = chat.send("Create a task to review the proposal by Friday").await {
//!     println!("{}", reply);
//! }
//! # Ok(())
//! # }
//! ```

pub mod chat;
pub mod client;
pub mod config;
pub mod intent;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod service;
