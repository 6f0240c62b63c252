/// Portfolio admin server
///
/// Loads configuration and starts the HTTP server exposing:
/// - Project administration at /admin/projects/*
/// - Lead review at /admin/leads
/// - Health check at /healthz

use portfolio_admin::{config::Config, start_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Pick up PORTFOLIO_* variables from a local .env file when present
    dotenvy::dotenv().ok();

    // Defaults to 0.0.0.0:3004 with data under ./data
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
