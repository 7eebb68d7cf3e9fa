use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::Request,
    response::Response,
    routing::{get, post},
};
use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::{net::TcpListener, sync::OnceCell};
use tower::{ServiceBuilder, ServiceExt};
use tower_http::trace::TraceLayer;

use crate::{
    configuration::{DatabaseSettings, EmailSettings},
    email_client::{EmailClient, Notifier, NotifyError},
    models::email::{SubscriberEmail, WAITLIST_PATH},
    routes::{health_check, join_waitlist},
    store::{StoreError, SubscriberStore},
};

/// Where and through what signup notifications are sent.
#[derive(Clone)]
pub struct Notification {
    pub notifier: Arc<dyn Notifier>,
    pub recipient: SubscriberEmail,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SubscriberStore>,
    pub notification: Option<Notification>,
    pub notify_timeout: Duration,
}

impl AppState {
    /// Notifications are enabled only when both an API key and a recipient are configured.
    pub fn new(
        store: Arc<dyn SubscriberStore>,
        settings: &EmailSettings,
    ) -> Result<Self, NotifyError> {
        let notification = match (&settings.api_key, &settings.recipient) {
            (Some(api_key), Some(recipient)) => {
                let email_client = EmailClient::new(
                    settings.base_url.clone(),
                    settings.sender.clone(),
                    api_key.clone(),
                    settings.timeout(),
                )?;
                Some(Notification {
                    notifier: Arc::new(email_client),
                    recipient: recipient.clone(),
                })
            }
            (api_key, recipient) => {
                tracing::info!(
                    api_key_set = api_key.is_some(),
                    recipient_set = recipient.is_some(),
                    "Email notifications are disabled"
                );
                None
            }
        };

        Ok(Self {
            store,
            notification,
            notify_timeout: settings.timeout(),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health_check", get(health_check))
        .route(WAITLIST_PATH, post(join_waitlist))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Builds the router on first use.
///
/// Concurrent first callers all wait on the same initialization. A failed
/// initialization leaves the cell empty, so the next call tries again.
pub struct LazyRouter {
    state: AppState,
    router: OnceCell<Router>,
}

impl LazyRouter {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            router: OnceCell::new(),
        }
    }

    pub async fn router(&self) -> Result<&Router, StoreError> {
        self.router
            .get_or_try_init(|| async {
                tracing::info!("Initializing waitlist routes");
                self.state.store.init().await?;
                Ok::<_, StoreError>(router(self.state.clone()))
            })
            .await
    }

    /// Dispatches one request, initializing the router first if needed.
    pub async fn handle(&self, request: Request) -> Result<Response, StoreError> {
        let router = self.router().await?.clone();
        let response = match router.oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        Ok(response)
    }
}

pub async fn get_connection_pool(configuration: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(configuration.max_connections)
        .acquire_timeout(Duration::from_secs(2))
        .connect(configuration.url.expose_secret())
        .await
}

pub async fn run(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error.message = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
