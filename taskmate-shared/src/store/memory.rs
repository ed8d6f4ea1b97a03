/// In-memory storage backend
///
/// Used by the test suites and by `DATABASE_URL=memory://` for local demos.
/// Records live in insertion-ordered vectors behind a tokio `RwLock`, which
/// gives the same oldest-first listing order as the PostgreSQL backend.
/// The backend enforces the same rules as the database schema: unique
/// emails, non-blank task titles and an `updated_at` that never goes
/// backwards.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{CreateTask, CreateUser, Task, TaskFilter, UpdateTask, UpdateUser, User};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    tasks: Vec<Task>,
}

/// [`Store`] kept entirely in process memory
///
/// Cloning is cheap and clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Next `updated_at` for a record last touched at `previous`
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

fn check_title(title: &str) -> StoreResult<()> {
    if title.trim().is_empty() {
        return Err(StoreError::Invalid("task title must not be blank".to_string()));
    }
    Ok(())
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::DuplicateEmail(data.email));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(name) = data.name {
            user.name = name;
        }
        if let Some(role) = data.role {
            user.role = role;
        }
        user.updated_at = next_timestamp(user.updated_at);

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        Ok(tables.users.len() < before)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        check_title(&data.title)?;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            status: data.status.unwrap_or_default(),
            user_id: data.user_id,
            created_at: now,
            updated_at: now,
        };

        self.tables.write().await.tasks.push(task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Option<Task>> {
        if let Some(title) = &data.title {
            check_title(title)?;
        }

        let mut tables = self.tables.write().await;
        let Some(task) = tables.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        data.apply_to(task);
        task.updated_at = next_timestamp(task.updated_at);

        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.tasks.len();
        tables.tasks.retain(|t| t.id != id);
        Ok(tables.tasks.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, TaskStatus};
    use chrono::NaiveDate;

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        }
    }

    fn new_task(title: &str, user_id: &str) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            description: None,
            due_date: None,
            status: None,
            user_id: user_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.create_user(new_user("ada@example.com")).await.unwrap();

        let err = store
            .create_user(new_user("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(ref e) if e == "ada@example.com"));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_user_update_and_delete() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("ada@example.com")).await.unwrap();

        let updated = store
            .update_user(
                user.id,
                UpdateUser {
                    name: None,
                    role: Some(Role::Admin),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.name, "Ada");
        assert!(updated.updated_at > user.updated_at);

        assert!(store.delete_user(user.id).await.unwrap());
        assert!(!store.delete_user(user.id).await.unwrap());
        assert!(store.find_user_by_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_user_returns_none() {
        let store = MemoryStore::new();
        let result = store
            .update_user(Uuid::new_v4(), UpdateUser::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_create_task_defaults_to_pending() {
        let store = MemoryStore::new();
        let task = store.create_task(new_task("Write report", "u1")).await.unwrap();

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(store.find_task(task.id).await.unwrap(), Some(task));
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let store = MemoryStore::new();
        let err = store.create_task(new_task("   ", "u1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_list_tasks_filters_and_keeps_order() {
        let store = MemoryStore::new();
        let a = store.create_task(new_task("A", "u1")).await.unwrap();
        store.create_task(new_task("B", "u2")).await.unwrap();
        let c = store.create_task(new_task("C", "u1")).await.unwrap();

        let all = store.list_tasks(&TaskFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let mine = store.list_tasks(&TaskFilter::for_user("u1")).await.unwrap();
        let ids: Vec<_> = mine.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);

        let none = store.list_tasks(&TaskFilter::for_user("nobody")).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_update_task_merges_fields() {
        let store = MemoryStore::new();
        let mut data = new_task("A", "u1");
        data.description = Some("details".to_string());
        data.due_date = NaiveDate::from_ymd_opt(2025, 3, 1);
        let task = store.create_task(data).await.unwrap();

        let updated = store
            .update_task(
                task.id,
                UpdateTask {
                    status: Some(TaskStatus::Completed),
                    due_date: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.title, "A");
        assert_eq!(updated.description.as_deref(), Some("details"));
        assert_eq!(updated.due_date, None);
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at > task.updated_at);
    }

    #[tokio::test]
    async fn test_updated_at_strictly_increases() {
        let store = MemoryStore::new();
        let task = store.create_task(new_task("A", "u1")).await.unwrap();

        let mut last = task.updated_at;
        for _ in 0..20 {
            let updated = store
                .update_task(task.id, UpdateTask::default())
                .await
                .unwrap()
                .unwrap();
            assert!(updated.updated_at > last);
            last = updated.updated_at;
        }
    }

    #[tokio::test]
    async fn test_delete_task() {
        let store = MemoryStore::new();
        let task = store.create_task(new_task("A", "u1")).await.unwrap();

        assert!(store.delete_task(task.id).await.unwrap());
        assert!(!store.delete_task(task.id).await.unwrap());
        assert!(store.find_task(task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_user_keeps_tasks() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("ada@example.com")).await.unwrap();
        store
            .create_task(new_task("A", &user.id.to_string()))
            .await
            .unwrap();

        store.delete_user(user.id).await.unwrap();

        let tasks = store
            .list_tasks(&TaskFilter::for_user(user.id.to_string()))
            .await
            .unwrap();
        assert_eq!(tasks.len(), 1);
    }
}
