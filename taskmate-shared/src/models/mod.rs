/// Database models for TaskMate
///
/// - `user`: user accounts, roles, and the public projection sent to clients
/// - `task`: tasks with status and due date
///
/// Each model carries its own PostgreSQL operations; the [`crate::store`]
/// module wraps them behind the storage trait used by the API.

pub mod task;
pub mod user;

pub use task::{CreateTask, Task, TaskFilter, TaskStatus, UpdateTask};
pub use user::{normalize_email, CreateUser, PublicUser, Role, UpdateUser, User};
