use std::sync::Arc;

use anveshan_waitlist::configuration::Settings;
use anveshan_waitlist::startup::{AppState, LazyRouter, get_connection_pool, run};
use anveshan_waitlist::store::PgSubscriberStore;
use anveshan_waitlist::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("info", std::io::stdout);
    init_subscriber(subscriber)?;

    let settings = Settings::from_env()?;

    let db_pool = get_connection_pool(&settings.database).await?;
    let store = Arc::new(PgSubscriberStore::new(db_pool));
    let app_state = AppState::new(store, &settings.email)?;

    // Creates the subscribers table before the listener opens.
    let lazy_router = LazyRouter::new(app_state);
    let app = lazy_router.router().await?.clone();

    let listener = tokio::net::TcpListener::bind(settings.application.address()).await?;
    tracing::info!("Server running on http://{}", listener.local_addr()?);
    run(listener, app).await?;

    Ok(())
}
