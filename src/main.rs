//! WISE Agent - Main Entry Point

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wise_agent::{AgentConfig, AgentRuntime};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("WISE agent v{}", env!("CARGO_PKG_VERSION"));

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "/etc/wise-agent/agent.json".into());

    let config = AgentConfig::load(&config_path).unwrap_or_else(|_| {
        tracing::warn!("Config not found, using defaults");
        AgentConfig::default()
    });

    let runtime = AgentRuntime::bind(config).await?;
    runtime.run().await?;

    Ok(())
}
