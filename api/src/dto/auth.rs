//! Request and response bodies of the auth routes

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use pb_shared::utils::validation::{
    validators, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH, USERNAME_REGEX,
};

/// Names must carry at least one visible character
fn validate_name(name: &str) -> Result<(), ValidationError> {
    if validators::not_empty(name) && validators::length_between(name, 1, 64) {
        Ok(())
    } else {
        Err(ValidationError::new("name"))
    }
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if validators::length_between(password, MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH) {
        Ok(())
    } else {
        Err(ValidationError::new("length"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// 3-32 characters of letters, digits, `_`, `.` or `-`; stored lowercase
    #[validate(regex = "USERNAME_REGEX")]
    pub username: String,

    #[validate(custom = "validate_password")]
    pub password: String,

    #[validate(custom = "validate_name")]
    pub first_name: String,

    #[validate(custom = "validate_name")]
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
