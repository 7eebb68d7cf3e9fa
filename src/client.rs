//! Caller side of the waitlist contract.
//!
//! [`WaitlistClient`] validates with the same [`WaitlistInput`] rules as the
//! handler before anything goes over the wire. [`SignupForm`] holds the
//! signup field and turns each submission into a [`Toast`].

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{
    email::{WAITLIST_PATH, WaitlistInput},
    response::{FieldError, WaitlistResponse},
};

pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to join waitlist";
pub const FALLBACK_SUCCESS_MESSAGE: &str = "We'll notify you when Stable Alpha V.2 launches.";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{}", .0.message)]
    Validation(FieldError),

    /// The server answered with a non-success status.
    #[error("{0}")]
    Rejected(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct WaitlistClient {
    http_client: Client,
    base_url: String,
}

impl WaitlistClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Submits `email` once. No retry.
    pub async fn join(&self, email: &str) -> Result<WaitlistResponse, ClientError> {
        let input = WaitlistInput::new(email);
        input.clone().parse().map_err(ClientError::Validation)?;

        let url = format!("{}{}", self.base_url.trim_end_matches('/'), WAITLIST_PATH);
        let response = self.http_client.post(&url).json(&input).send().await?;

        if !response.status().is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
            return Err(ClientError::Rejected(message));
        }

        Ok(response.json::<WaitlistResponse>().await?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Default,
    Destructive,
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    fn success(response: &WaitlistResponse) -> Self {
        let description = if response.message.is_empty() {
            FALLBACK_SUCCESS_MESSAGE.to_string()
        } else {
            response.message.clone()
        };
        Self {
            title: "You're in!".to_string(),
            description,
            variant: ToastVariant::Default,
        }
    }

    fn error(error: &ClientError) -> Self {
        Self {
            title: "Error".to_string(),
            description: error.to_string(),
            variant: ToastVariant::Destructive,
        }
    }
}

/// The email field of the signup form.
#[derive(Debug, Default)]
pub struct SignupForm {
    pub email: String,
}

impl SignupForm {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    /// Submits the current value. The field is cleared only on success.
    pub async fn submit(&mut self, client: &WaitlistClient) -> Toast {
        match client.join(&self.email).await {
            Ok(response) => {
                self.email.clear();
                Toast::success(&response)
            }
            Err(e) => Toast::error(&e),
        }
    }
}
