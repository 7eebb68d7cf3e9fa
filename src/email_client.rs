use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

use crate::models::email::SubscriberEmail;

pub const SIGNUP_SUBJECT: &str = "🚀 New Stable Alpha V.2 Signup";

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("email request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("email send timed out after {0:?}")]
    Timeout(Duration),
}

/// Sends a single email. Implementations make one attempt and never retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        recipient: &SubscriberEmail,
        subject: &str,
        html_content: &str,
    ) -> Result<(), NotifyError>;
}

/// Client for the Resend transactional email API.
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: String,
    authorization_token: Secret<String>,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: String,
        authorization_token: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        })
    }
}

#[async_trait]
impl Notifier for EmailClient {
    async fn send(
        &self,
        recipient: &SubscriberEmail,
        subject: &str,
        html_content: &str,
    ) -> Result<(), NotifyError> {
        let url = format!("{}/emails", self.base_url.trim_end_matches('/'));
        let request_body = SendEmailRequest {
            from: &self.sender,
            to: recipient.as_ref(),
            subject,
            html: html_content,
        };
        self.http_client
            .post(&url)
            .bearer_auth(self.authorization_token.expose_secret())
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[derive(serde::Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// HTML body announcing a new waitlist signup.
pub fn signup_notification_html(subscriber: &SubscriberEmail) -> String {
    format!(
        r#"
<div style="font-family: Inter, system-ui, sans-serif; padding: 24px; background: #0a0a0a; color: #ededed;">
  <h2 style="margin: 0 0 16px; color: #ffffff;">New Waitlist Signup</h2>
  <p style="margin: 0 0 8px; color: #999999;">Someone joined the Stable Alpha V.2 waitlist:</p>
  <p style="margin: 0; padding: 16px; background: #1a1a1a; border-radius: 8px; font-size: 18px;">
    <strong>{}</strong>
  </p>
  <p style="margin: 16px 0 0; color: #666666; font-size: 12px;">
    Sent from Anveshan Identity Platform
  </p>
</div>
"#,
        escape_html(subscriber.as_ref())
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
