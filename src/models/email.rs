use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail};

use crate::models::response::FieldError;

/// Path of the waitlist endpoint, shared by the router and the client.
pub const WAITLIST_PATH: &str = "/api/waitlist";

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";

/// Stricter than `validator`'s email rule: the local part is dot-separated
/// runs of `[A-Za-z0-9_'+-]` that does not end in `'`, and the domain has at
/// least one dot and an alphabetic TLD of two or more letters.
pub static EMAIL_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z0-9_'+\-]+\.)*[A-Za-z0-9_'+\-]*[A-Za-z0-9_+\-]@(?:[A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$",
    )
    .expect("email pattern is a valid regex")
});

/// A persisted waitlist entry.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub id: i32,
    pub email: String,
}

/// Raw body of `POST /api/waitlist`.
///
/// A missing `email` deserializes to an empty string so that it fails the
/// same format check as a malformed address.
#[derive(Serialize, Deserialize, Validate, Debug, Clone, Default)]
pub struct WaitlistInput {
    #[serde(default)]
    #[validate(
        email(message = "Please enter a valid email address"),
        regex(path = *EMAIL_FORMAT, message = "Please enter a valid email address")
    )]
    pub email: String,
}

impl WaitlistInput {
    pub fn new(email: impl Into<String>) -> Self {
        Self { email: email.into() }
    }

    /// Validates the submission, returning the first failing field.
    pub fn parse(self) -> Result<SubscriberEmail, FieldError> {
        if let Err(errors) = self.validate() {
            let field_errors = errors.field_errors();
            let first = field_errors
                .iter()
                .flat_map(|(field, errs)| errs.iter().map(move |e| (field, e)))
                .next();
            return Err(match first {
                Some((field, err)) => FieldError {
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| INVALID_EMAIL_MESSAGE.to_string()),
                    field: field.to_string(),
                },
                None => FieldError::invalid_email(),
            });
        }
        SubscriberEmail::parse(self.email).map_err(|_| FieldError::invalid_email())
    }
}

/// An email address that passed format validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(s: String) -> Result<SubscriberEmail, String> {
        if s.validate_email() && EMAIL_FORMAT.is_match(&s) {
            Ok(Self(s))
        } else {
            Err(format!("{} is not a valid email address.", s))
        }
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
