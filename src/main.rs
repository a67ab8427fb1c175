use std::net::TcpListener;
use std::sync::Arc;

use credential_gate::configuration::get_configuration;
use credential_gate::startup::run;
use credential_gate::store::{CredentialStore, MemoryStore, PostgresStore};
use credential_gate::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry("info");

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let store: Arc<dyn CredentialStore> = match &configuration.database {
        Some(database) => {
            tracing::info!(host = %database.host, "Using PostgreSQL credential store");
            let store = PostgresStore::connect_lazy(database).map_err(|e| {
                tracing::error!("Failed to create connection pool: {}", e);
                std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "Database connection error",
                )
            })?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("No database configured, accounts will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(
        listener,
        store,
        configuration.jwt.clone(),
        configuration.hashing.clone(),
        configuration.application.allowed_origins.clone(),
    )?;
    server.await
}
