/// Storage abstraction for users and tasks
///
/// The API server only talks to storage through the [`Store`] trait, so the
/// same handlers run against PostgreSQL in production and against the
/// in-memory backend in tests and local demos.
///
/// # Backends
///
/// - [`PgStore`]: PostgreSQL through the model functions in [`crate::models`]
/// - [`MemoryStore`]: process-local maps, lost on restart
///
/// # Example
///
/// ```
/// use taskmate_shared::models::{CreateTask, TaskStatus};
/// use taskmate_shared::store::{MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let task = store
///     .create_task(CreateTask {
///         title: "A".to_string(),
///         description: None,
///         due_date: None,
///         status: None,
///         user_id: "u1".to_string(),
///     })
///     .await?;
/// assert_eq!(task.status, TaskStatus::Pending);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{CreateTask, CreateUser, Task, TaskFilter, UpdateTask, UpdateUser, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A user with this email already exists
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    /// A record failed a storage-level check
    #[error("Invalid record: {0}")]
    Invalid(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// User and task persistence
///
/// Every operation touches a single record (or a plain scan), so backends
/// need no transactions. Lookups return `Ok(None)`/`Ok(false)` for missing
/// records; only real failures are errors.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs and the health endpoint
    fn backend(&self) -> &'static str;

    /// Verifies the backend is reachable
    async fn health_check(&self) -> StoreResult<()>;

    // --- Users ---

    /// Fails with [`StoreError::DuplicateEmail`] if the email is taken
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// All users, oldest first
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>>;

    /// Does not touch the user's tasks
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    // --- Tasks ---

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Tasks matching `filter`, oldest first
    async fn list_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>>;

    /// Merges `data` into the task and moves `updated_at` forward
    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Option<Task>>;

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;
}
