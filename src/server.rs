/// Server setup and initialization
///
/// Wires together all components: database, blob store, mailer, project
/// workflow and HTTP routes.

use crate::{
    api::{create_project_routes, AppState},
    blob::{BlobStore, LocalBlobStore},
    config::Config,
    mail::{HttpMailer, LogMailer, Mailer},
    project::{service::LeadSettings, Database, ProjectStorage, ProjectWorkflow},
};
use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Create the main Axum application with all routes
///
/// Opens the database, picks the blob store and mail transport from the
/// configuration and builds the router.
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("🏗️ Opening project database");
    let database = Database::open(&config.database.database_path())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open project database: {}", e))?;

    tracing::info!("📁 Public disk at: {}", config.storage.public_root);
    std::fs::create_dir_all(&config.storage.public_root)
        .map_err(|e| anyhow::anyhow!("Failed to create public disk directory: {}", e))?;
    let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(&config.storage.public_root));

    let mailer: Arc<dyn Mailer> = match &config.mail.relay_url {
        Some(url) => {
            tracing::info!("📧 Sending mail through relay: {}", url);
            Arc::new(HttpMailer::new(url.clone())?)
        }
        None => {
            tracing::info!("📧 No mail relay configured, logging outbound mail");
            Arc::new(LogMailer)
        }
    };

    let workflow = ProjectWorkflow::new(
        ProjectStorage::new(database.pool().clone()),
        blobs,
        mailer,
        LeadSettings {
            enabled: config.leads.enabled,
            operator_address: config.mail.operator_address.clone(),
            from_address: config.mail.from_address.clone(),
        },
    );

    Ok(build_router(AppState { workflow }))
}

/// Router over an already assembled application state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Admin project routes
        .merge(create_project_routes().with_state(state))
}

/// Start the HTTP server with the given configuration
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting portfolio admin server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
