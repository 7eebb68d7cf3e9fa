//! Persistence of waitlist subscribers.
//!
//! Uniqueness of `email` is owned by the backing store. Callers learn about a
//! duplicate only through [`StoreError::Conflict`].

use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::email::{Subscriber, SubscriberEmail};

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum StoreError {
    /// The email is already present.
    #[error("subscriber already exists")]
    Conflict,

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// The database could not be reached (pool exhausted or closed, socket error).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Classifies a raw sqlx error, singling out unique violations.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db)
                if db.is_unique_violation() || db.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                StoreError::Conflict
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            e => StoreError::Database(e),
        }
    }
}

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Prepares the backing schema. Must be safe to call more than once.
    async fn init(&self) -> Result<(), StoreError>;

    async fn create_subscriber(&self, email: &SubscriberEmail) -> Result<Subscriber, StoreError>;
}

pub struct PgSubscriberStore {
    pool: PgPool,
}

impl PgSubscriberStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriberStore for PgSubscriberStore {
    #[tracing::instrument(name = "Creating subscribers table", skip(self))]
    async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscribers (
                id SERIAL PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );"#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(())
    }

    #[tracing::instrument(name = "Saving new subscriber in the database", skip(self, email))]
    async fn create_subscriber(&self, email: &SubscriberEmail) -> Result<Subscriber, StoreError> {
        sqlx::query_as::<_, Subscriber>(
            "INSERT INTO subscribers (email) VALUES ($1) RETURNING id, email",
        )
        .bind(email.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }
}

/// Process-local store with the same uniqueness contract as the table.
#[derive(Default)]
pub struct InMemorySubscriberStore {
    rows: Mutex<Vec<Subscriber>>,
}

impl InMemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribers(&self) -> Vec<Subscriber> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        // A poisoned lock still holds consistent rows; every write is a single push.
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SubscriberStore for InMemorySubscriberStore {
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_subscriber(&self, email: &SubscriberEmail) -> Result<Subscriber, StoreError> {
        let mut rows = self.lock();
        if rows.iter().any(|s| s.email == email.as_ref()) {
            return Err(StoreError::Conflict);
        }
        let id = rows.last().map(|s| s.id + 1).unwrap_or(1);
        let subscriber = Subscriber {
            id,
            email: email.as_ref().to_string(),
        };
        rows.push(subscriber.clone());
        Ok(subscriber)
    }
}
