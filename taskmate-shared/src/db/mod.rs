/// Database layer: connection pool and schema migrations
///
/// Models live in [`crate::models`]; the storage abstraction used by the API
/// lives in [`crate::store`].

pub mod migrations;
pub mod pool;
