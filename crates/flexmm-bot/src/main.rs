//! flexmm bot entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Market-making bot maintaining flexible order ladders.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via FLEXMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    flexmm_bot::init_logging();

    info!("Starting flexmm bot v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > FLEXMM_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("FLEXMM_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = flexmm_bot::AppConfig::load_or_default(&config_path)?;

    let app = flexmm_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
