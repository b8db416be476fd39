//! idstore server: application entry point.

mod config;

use idstore_core::{ClientStore, OrganizationStore};
use idstore_db::{DbError, DbManager};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("signal handling failed: {0}")]
    Signal(#[from] std::io::Error),
}

async fn run() -> Result<(), ServerError> {
    let config = config::load()?;
    let db = DbManager::connect(&config).await?;
    idstore_db::run_migrations(db.client()).await?;

    let organizations = OrganizationStore::with_default_fields(db.storage());
    let clients = ClientStore::with_default_fields(db.storage());
    info!(
        organization_fields = organizations.fields().len(),
        client_fields = clients.fields().len(),
        "Stores ready"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    info!("Starting idstore server...");

    if let Err(err) = run().await {
        error!(error = %err, "idstore server failed");
        std::process::exit(1);
    }

    info!("idstore server stopped.");
}
