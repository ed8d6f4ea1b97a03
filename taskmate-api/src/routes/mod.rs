/// API route handlers, one module per resource
///
/// - `health`: liveness and store connectivity
/// - `auth`: register, login, current user
/// - `tasks`: task CRUD
/// - `users`: user administration

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
