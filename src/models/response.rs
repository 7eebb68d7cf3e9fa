use serde::{Deserialize, Serialize};

use crate::models::email::INVALID_EMAIL_MESSAGE;

pub const JOINED_MESSAGE: &str = "You're on the list!";
pub const ALREADY_JOINED_MESSAGE: &str = "You're already on the list!";
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Body of a `201 Created` waitlist response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WaitlistResponse {
    pub success: bool,
    pub message: String,
}

impl WaitlistResponse {
    pub fn joined() -> Self {
        Self {
            success: true,
            message: JOINED_MESSAGE.to_string(),
        }
    }

    pub fn already_joined() -> Self {
        Self {
            success: true,
            message: ALREADY_JOINED_MESSAGE.to_string(),
        }
    }
}

/// Body of a `400 Bad Request` response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub message: String,
    pub field: String,
}

impl FieldError {
    pub fn invalid_email() -> Self {
        Self {
            message: INVALID_EMAIL_MESSAGE.to_string(),
            field: "email".to_string(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Body of a `500 Internal Server Error` response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub message: String,
}
