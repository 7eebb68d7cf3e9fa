pub mod client;
pub mod configuration;
pub mod email_client;
pub mod models;
pub mod routes;
pub mod startup;
pub mod store;
pub mod telemetry;
