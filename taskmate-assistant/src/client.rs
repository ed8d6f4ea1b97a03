/// Typed client for the TaskMate REST API
///
/// Authentication state is an explicit [`Session`] value: `login` and
/// `register` return one, and every authenticated call takes it by
/// reference. Non-2xx responses become [`ClientError::Api`] carrying the
/// server's status and message.
///
/// # Example
///
/// ```no_run
/// use taskmate_assistant::client::ApiClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new("http://localhost:5000");
/// let session = client.login("ada@example.com", "password123").await?;
/// let tasks = client.list_tasks(&session, Some(&session.user.id.to_string())).await?;
/// println!("{} tasks", tasks.len());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use taskmate_shared::models::{CreateTask, PublicUser, Role, Task, UpdateTask, UpdateUser};
use thiserror::Error;
use uuid::Uuid;

use crate::chat::TaskSink;
use crate::service::{AssistantError, AssistantResult};

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport or decoding failure
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status
    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// Status of an API error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(_) => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// An authenticated user and their bearer token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

/// Admin create-user payload
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// REST client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:5000`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: Method, path: &str, session: Option<&Session>) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}/api{}", self.base_url, path));
        match session {
            Some(session) => builder.bearer_auth(&session.token),
            None => builder,
        }
    }

    /// Turns an error status into `ClientError::Api`
    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("error").to_string()
                } else {
                    text
                }
            });

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> ClientResult<T> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_empty(builder: RequestBuilder) -> ClientResult<()> {
        Self::check(builder.send().await?).await?;
        Ok(())
    }

    // Auth

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<Session> {
        let body = json!({ "name": name, "email": email, "password": password });
        Self::send(self.request(Method::POST, "/auth/register", None).json(&body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let body = json!({ "email": email, "password": password });
        Self::send(self.request(Method::POST, "/auth/login", None).json(&body)).await
    }

    pub async fn me(&self, session: &Session) -> ClientResult<PublicUser> {
        Self::send(self.request(Method::GET, "/auth/me", Some(session))).await
    }

    // Tasks

    /// All tasks, or only those of `user_id`
    pub async fn list_tasks(
        &self,
        session: &Session,
        user_id: Option<&str>,
    ) -> ClientResult<Vec<Task>> {
        let mut builder = self.request(Method::GET, "/tasks", Some(session));
        if let Some(user_id) = user_id {
            builder = builder.query(&[("userId", user_id)]);
        }
        Self::send(builder).await
    }

    /// Tasks of `user_id`; the server answers 404 when there are none
    pub async fn list_user_tasks(&self, session: &Session, user_id: &str) -> ClientResult<Vec<Task>> {
        let path = format!("/tasks/user/{}", user_id);
        Self::send(self.request(Method::GET, &path, Some(session))).await
    }

    pub async fn get_task(&self, session: &Session, id: Uuid) -> ClientResult<Task> {
        let path = format!("/tasks/{}", id);
        Self::send(self.request(Method::GET, &path, Some(session))).await
    }

    pub async fn create_task(&self, session: &Session, task: &CreateTask) -> ClientResult<Task> {
        Self::send(self.request(Method::POST, "/tasks", Some(session)).json(task)).await
    }

    pub async fn update_task(
        &self,
        session: &Session,
        id: Uuid,
        update: &UpdateTask,
    ) -> ClientResult<Task> {
        let path = format!("/tasks/{}", id);
        Self::send(self.request(Method::PATCH, &path, Some(session)).json(update)).await
    }

    pub async fn delete_task(&self, session: &Session, id: Uuid) -> ClientResult<()> {
        let path = format!("/tasks/{}", id);
        Self::send_empty(self.request(Method::DELETE, &path, Some(session))).await
    }

    // Users (ADMIN)

    pub async fn list_users(&self, session: &Session) -> ClientResult<Vec<PublicUser>> {
        Self::send(self.request(Method::GET, "/users", Some(session))).await
    }

    pub async fn create_user(&self, session: &Session, user: &NewUser) -> ClientResult<PublicUser> {
        Self::send(self.request(Method::POST, "/users", Some(session)).json(user)).await
    }

    pub async fn update_user(
        &self,
        session: &Session,
        id: Uuid,
        update: &UpdateUser,
    ) -> ClientResult<PublicUser> {
        let path = format!("/users/{}", id);
        Self::send(self.request(Method::PATCH, &path, Some(session)).json(update)).await
    }

    pub async fn delete_user(&self, session: &Session, id: Uuid) -> ClientResult<()> {
        let path = format!("/users/{}", id);
        Self::send_empty(self.request(Method::DELETE, &path, Some(session))).await
    }
}

/// Saves chat drafts through the REST API as the session's user
pub struct SessionTaskSink {
    client: ApiClient,
    session: Session,
}

impl SessionTaskSink {
    pub fn new(client: ApiClient, session: Session) -> Self {
        Self { client, session }
    }
}

#[async_trait]
impl TaskSink for SessionTaskSink {
    async fn create_task(&self, task: CreateTask) -> AssistantResult<Task> {
        self.client
            .create_task(&self.session, &task)
            .await
            .map_err(|e| AssistantError::TaskSink(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/");
        assert_eq!(client.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_new_user_omits_missing_role() {
        let user = NewUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "pw".to_string(),
            role: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("role").is_none());

        let admin = NewUser {
            role: Some(Role::Admin),
            ..user
        };
        assert_eq!(serde_json::to_value(&admin).unwrap()["role"], "ADMIN");
    }

    #[test]
    fn test_error_status() {
        let err = ClientError::Api {
            status: 404,
            message: "Task not found".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Server returned 404: Task not found");
    }
}
