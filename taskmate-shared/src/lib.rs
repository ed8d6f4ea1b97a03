//! # TaskMate Shared Library
//!
//! Types and logic shared by the API server and the assistant client.
//!
//! ## Module Organization
//!
//! - `models`: users and tasks, with their PostgreSQL operations
//! - `auth`: password hashing, session tokens, auth middleware, role checks
//! - `db`: connection pool and migrations
//! - `store`: storage trait with PostgreSQL and in-memory backends

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the TaskMate shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
