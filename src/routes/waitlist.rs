use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use hyper::StatusCode;
use thiserror::Error;

use crate::{
    email_client::{NotifyError, SIGNUP_SUBJECT, signup_notification_html},
    models::{
        email::{SubscriberEmail, WaitlistInput},
        response::{ErrorResponse, FieldError, INTERNAL_ERROR_MESSAGE, WaitlistResponse},
    },
    startup::AppState,
    store::StoreError,
};

#[derive(Error, Debug)]
pub enum WaitlistError {
    #[error("invalid submission: {0}")]
    Validation(FieldError),

    #[error("failed to save subscriber: {0}")]
    Store(#[from] StoreError),
}

impl WaitlistError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WaitlistError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::Validation(field_error) => (status, Json(field_error)).into_response(),
            // Storage details stay in the server log.
            Self::Store(_) => (
                status,
                Json(ErrorResponse {
                    message: INTERNAL_ERROR_MESSAGE.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

/// `POST /api/waitlist`
///
/// A duplicate email is reported as success with a different message, so the
/// endpoint never reveals whether an address was already registered.
#[tracing::instrument(name = "Adding a new waitlist subscriber", skip(state, payload))]
pub async fn join_waitlist(
    State(state): State<AppState>,
    payload: Result<Json<WaitlistInput>, JsonRejection>,
) -> Result<(StatusCode, Json<WaitlistResponse>), WaitlistError> {
    let Json(input) = payload.map_err(|rejection| {
        tracing::info!(error.message = %rejection, "Rejected malformed waitlist body");
        WaitlistError::Validation(FieldError::invalid_email())
    })?;

    let email = input.parse().map_err(|field_error| {
        tracing::info!(field = %field_error.field, "Rejected invalid waitlist submission");
        WaitlistError::Validation(field_error)
    })?;

    match state.store.create_subscriber(&email).await {
        Ok(subscriber) => {
            tracing::info!(subscriber_id = subscriber.id, "New subscriber has been saved");
            notify_signup(&state, &email).await;
            Ok((StatusCode::CREATED, Json(WaitlistResponse::joined())))
        }
        Err(StoreError::Conflict) => {
            tracing::info!("Subscriber is already on the waitlist");
            Ok((StatusCode::CREATED, Json(WaitlistResponse::already_joined())))
        }
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to save subscriber"
            );
            Err(WaitlistError::Store(e))
        }
    }
}

/// Best-effort: every failure ends here as a log line.
async fn notify_signup(state: &AppState, email: &SubscriberEmail) {
    let Some(notification) = &state.notification else {
        tracing::info!(subscriber_email = %email, "[WAITLIST] New signup");
        tracing::info!(
            "Email notifications are disabled; set RESEND_API_KEY and SECRET_RECIPIENT_MAIL to enable them"
        );
        return;
    };

    let html = signup_notification_html(email);
    let send = notification
        .notifier
        .send(&notification.recipient, SIGNUP_SUBJECT, &html);
    let outcome = match tokio::time::timeout(state.notify_timeout, send).await {
        Ok(outcome) => outcome,
        Err(_) => Err(NotifyError::Timeout(state.notify_timeout)),
    };

    match outcome {
        Ok(()) => tracing::info!("Signup notification sent"),
        Err(e) => tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Email notification failed"
        ),
    }
}
