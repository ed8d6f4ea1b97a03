//! # TaskMate API Server Library
//!
//! REST API for TaskMate: accounts, tasks and user administration, plus
//! static serving of the built web client.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: configuration from the environment
//! - `error`: error handling and HTTP response mapping
//! - `extract`: request extractors
//! - `middleware`: admin gate and security headers
//! - `routes`: API route handlers
//! - `server`: store selection and the serve loop

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod server;
