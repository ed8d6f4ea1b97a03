//! # TaskMate Chat
//!
//! Interactive task assistant on stdin/stdout. Logs in to the API with the
//! configured account and saves confirmed drafts as that user.
//!
//! ## Usage
//!
//! ```bash
//! TASKMATE_EMAIL=ada@example.com TASKMATE_PASSWORD=... OPENAI_API_KEY=sk-... \
//!     cargo run -p taskmate-assistant --bin taskmate-chat
//! ```

use std::sync::Arc;

use taskmate_assistant::chat::{ChatSession, GREETING};
use taskmate_assistant::client::{ApiClient, SessionTaskSink};
use taskmate_assistant::config::ChatConfig;
use taskmate_assistant::intent::KeywordIntentDetector;
use taskmate_assistant::openai::OpenAiProvider;
use taskmate_assistant::service::TaskAssistant;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with the conversation.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskmate_assistant=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ChatConfig::from_env()?;

    let client = ApiClient::new(&config.api_url);
    let session = client.login(&config.email, &config.password).await?;
    tracing::info!(user = %session.user.email, api = %config.api_url, "Logged in");

    let assistant = TaskAssistant::new(Arc::new(OpenAiProvider::new(config.openai)));
    let mut chat = ChatSession::new(
        assistant,
        Box::new(KeywordIntentDetector::new()?),
        Box::new(SessionTaskSink::new(client, session.clone())),
        session.user.id.to_string(),
    );

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(format!("{}\n\n> ", GREETING).as_bytes())
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }

        if let Some(reply) = chat.send(&line).await {
            stdout.write_all(format!("\n{}\n", reply).as_bytes()).await?;
        }
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;
    }

    Ok(())
}
