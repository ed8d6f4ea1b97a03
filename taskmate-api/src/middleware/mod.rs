/// Middleware for the API server
///
/// - `admin`: role gate for the user administration routes
/// - `security`: hardening headers on every response

pub mod admin;
pub mod security;
