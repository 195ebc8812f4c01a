use mafia::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        outbound_buffer = config.outbound_buffer,
        seeded = config.coordinator.seed.is_some(),
        "configuration loaded"
    );

    let server = MafiaServer::builder().config(config).build().await?;
    server.run().await?;
    Ok(())
}
