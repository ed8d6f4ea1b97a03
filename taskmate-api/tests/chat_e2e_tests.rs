//! End-to-end tests: the router served on a real socket, driven by the
//! assistant crate's `ApiClient` and `ChatSession` with a scripted provider

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::TestContext;
use taskmate_assistant::chat::{ChatSession, ConfirmationState};
use taskmate_assistant::client::{ApiClient, ClientError, NewUser, Session, SessionTaskSink};
use taskmate_assistant::intent::KeywordIntentDetector;
use taskmate_assistant::mock::ScriptedProvider;
use taskmate_assistant::provider::Completion;
use taskmate_assistant::service::TaskAssistant;
use taskmate_shared::models::{CreateTask, Role, TaskStatus, UpdateTask, UpdateUser};

/// Serves the context's router on an ephemeral port and returns a client
async fn serve(ctx: &TestContext) -> ApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = ctx.app.clone();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ApiClient::new(format!("http://{}", addr))
}

fn chat(client: &ApiClient, session: &Session, provider: &ScriptedProvider) -> ChatSession {
    ChatSession::new(
        TaskAssistant::new(Arc::new(provider.clone())),
        Box::new(KeywordIntentDetector::new().unwrap()),
        Box::new(SessionTaskSink::new(client.clone(), session.clone())),
        session.user.id.to_string(),
    )
}

fn proposal() -> Completion {
    Completion::call(
        "create_task",
        r#"{"title":"Review the project proposal","description":"Check the budget section","dueDate":"2025-06-20"}"#,
    )
}

#[tokio::test]
async fn test_chat_yes_creates_one_task() {
    let ctx = TestContext::new();
    let client = serve(&ctx).await;
    let session = client
        .register("Ada", "ada@example.com", "password123")
        .await
        .unwrap();
    let user_id = session.user.id.to_string();

    let provider = ScriptedProvider::new().then(proposal());
    let mut chat = chat(&client, &session, &provider);

    let reply = chat
        .send("Create a task to review the project proposal by Friday")
        .await
        .unwrap();
    assert!(reply.contains("Review the project proposal"));
    assert!(client.list_tasks(&session, None).await.unwrap().is_empty());

    chat.send("yes").await.unwrap();
    assert_eq!(chat.state(), &ConfirmationState::Idle);

    let tasks = client.list_tasks(&session, Some(&user_id)).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Review the project proposal");
    assert_eq!(tasks[0].description.as_deref(), Some("Check the budget section"));
    assert_eq!(tasks[0].due_date, NaiveDate::from_ymd_opt(2025, 6, 20));
    assert_eq!(tasks[0].status, TaskStatus::Pending);
    assert_eq!(tasks[0].user_id, user_id);

    // A second "yes" has nothing pending and must not create another task.
    let provider_calls = provider.requests().len();
    chat.send("yes").await;
    assert!(provider.requests().len() > provider_calls);
    assert_eq!(client.list_tasks(&session, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_chat_no_creates_nothing() {
    let ctx = TestContext::new();
    let client = serve(&ctx).await;
    let session = client
        .register("Ada", "ada@example.com", "password123")
        .await
        .unwrap();

    let provider = ScriptedProvider::new().then(proposal());
    let mut chat = chat(&client, &session, &provider);

    chat.send("add a task to review the project proposal").await;
    chat.send("no").await;
    assert_eq!(chat.state(), &ConfirmationState::Idle);

    assert!(client.list_tasks(&session, None).await.unwrap().is_empty());

    let err = client
        .list_user_tasks(&session, &session.user.id.to_string())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_client_task_lifecycle() {
    let ctx = TestContext::new();
    let client = serve(&ctx).await;
    let session = client
        .register("Ada", "ada@example.com", "password123")
        .await
        .unwrap();

    let me = client.me(&session).await.unwrap();
    assert_eq!(me, session.user);

    let task = client
        .create_task(
            &session,
            &CreateTask {
                title: "Write report".to_string(),
                description: Some("Q3".to_string()),
                due_date: None,
                status: None,
                user_id: me.id.to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Pending);

    let updated = client
        .update_task(
            &session,
            task.id,
            &UpdateTask {
                status: Some(TaskStatus::Completed),
                description: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::Completed);
    assert_eq!(updated.description, None);
    assert!(updated.updated_at > task.updated_at);

    assert_eq!(client.get_task(&session, task.id).await.unwrap(), updated);

    client.delete_task(&session, task.id).await.unwrap();
    match client.get_task(&session, task.id).await.unwrap_err() {
        ClientError::Api { status, message } => {
            assert_eq!(status, 404);
            assert!(!message.is_empty());
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_client_auth_errors_are_typed() {
    let ctx = TestContext::new();
    let client = serve(&ctx).await;
    client
        .register("Ada", "ada@example.com", "password123")
        .await
        .unwrap();

    let err = client.login("ada@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    let err = client
        .register("Ada", "ada@example.com", "password123")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));
}

#[tokio::test]
async fn test_client_user_administration() {
    let ctx = TestContext::new();
    let client = serve(&ctx).await;
    let (_, admin) = ctx.admin_token().await;
    let admin_session = client.login(&admin.email, "admin-password").await.unwrap();
    let user_session = client
        .register("Ada", "ada@example.com", "password123")
        .await
        .unwrap();

    assert_eq!(
        client.list_users(&user_session).await.unwrap_err().status(),
        Some(403)
    );

    let grace = client
        .create_user(
            &admin_session,
            &NewUser {
                name: "Grace".to_string(),
                email: "grace@example.com".to_string(),
                password: "hopper".to_string(),
                role: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(grace.role, Role::User);

    let promoted = client
        .update_user(
            &admin_session,
            grace.id,
            &UpdateUser {
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::Admin);
    assert_eq!(promoted.name, "Grace");

    assert_eq!(client.list_users(&admin_session).await.unwrap().len(), 3);

    client.delete_user(&admin_session, grace.id).await.unwrap();
    assert_eq!(
        client
            .delete_user(&admin_session, grace.id)
            .await
            .unwrap_err()
            .status(),
        Some(404)
    );
}
