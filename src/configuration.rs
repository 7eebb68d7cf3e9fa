use std::time::Duration;

use secrecy::Secret;
use thiserror::Error;

use crate::models::email::SubscriberEmail;

pub const DEFAULT_SENDER: &str = "Anveshan Waitlist <onboarding@resend.dev>";
pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";
pub const DEFAULT_EMAIL_TIMEOUT_MS: u64 = 5_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub email: EmailSettings,
}

#[derive(Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    pub url: Secret<String>,
    pub max_connections: u32,
}

#[derive(Clone, Debug)]
pub struct EmailSettings {
    pub api_key: Option<Secret<String>>,
    pub recipient: Option<SubscriberEmail>,
    pub base_url: String,
    pub sender: String,
    pub timeout_milliseconds: u64,
}

impl EmailSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Settings {
    /// Reads settings from the process environment after loading `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let recipient = match get("SECRET_RECIPIENT_MAIL") {
            Some(raw) => Some(SubscriberEmail::parse(raw).map_err(|reason| {
                ConfigError::Invalid {
                    key: "SECRET_RECIPIENT_MAIL",
                    reason,
                }
            })?),
            None => None,
        };

        Ok(Settings {
            application: ApplicationSettings {
                host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or("APP_PORT", get("APP_PORT"), 3000)?,
            },
            database: DatabaseSettings {
                url: Secret::new(url),
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    get("DATABASE_MAX_CONNECTIONS"),
                    5,
                )?,
            },
            email: EmailSettings {
                api_key: get("RESEND_API_KEY").map(Secret::new),
                recipient,
                base_url: get("RESEND_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_RESEND_BASE_URL.to_string()),
                sender: get("EMAIL_SENDER").unwrap_or_else(|| DEFAULT_SENDER.to_string()),
                timeout_milliseconds: parse_or(
                    "EMAIL_TIMEOUT_MS",
                    get("EMAIL_TIMEOUT_MS"),
                    DEFAULT_EMAIL_TIMEOUT_MS,
                )?,
            },
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
