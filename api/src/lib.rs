//! # Postboard API
//!
//! HTTP surface of the Postboard backend: the app factory, request DTOs, the
//! JWT middleware and the auth routes. The binary in `main.rs` wires these to
//! the SQLite repositories.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;
