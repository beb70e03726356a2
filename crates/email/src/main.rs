use anyhow::{Context, Result};
use dotenv::dotenv;
use email::{config::ServiceConfig, handler::AppRouter, state::AppState};
use shared::utils::{Telemetry, init_logger};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let telemetry = Telemetry::from_env("email-service");
    let providers = telemetry.init().context("Failed to initialize telemetry")?;

    let _log_guard = init_logger(&providers.logger, "email-service");

    let config = ServiceConfig::init()
        .inspect_err(|e| error!("Refusing to start: {e:#}"))
        .context("Failed to load configuration")?;

    let state = AppState::new(&config).context("Failed to create AppState")?;

    AppRouter::serve(config.port, state)
        .await
        .context("Failed to start server")?;

    info!("Shutting down servers...");

    providers.shutdown()?;

    Ok(())
}
