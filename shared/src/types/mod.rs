//! Type definitions shared between the API and its clients
//!
//! - `response` - error bodies and health checks

pub mod response;

pub use response::{ErrorResponse, HealthResponse, HealthStatus, ServiceHealth};
