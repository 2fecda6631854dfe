//! Common utility functions

pub mod timestamp;
pub mod validation;
