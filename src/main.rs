use dotenvy::dotenv;
use scrim_buddy::{bot::shell, config::BotConfig, errors::Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the bot configuration
    let config = BotConfig::from_env()
        .inspect_err(|e| error!("Critical error loading configuration: {e}"))?;
    info!(?config, "Configuration loaded.");

    // 4. Run the bot until shutdown
    shell::run(config).await
}
