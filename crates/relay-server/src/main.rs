use anyhow::Context;
use relay_server::{run_server, AppState, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,relay_server=debug")),
        )
        .init();

    let config = ServerConfig::from_env().context("reading configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let upstream = config
        .build_upstream()
        .context("MISTRAL_API_KEY must be set (or RELAY_PROVIDER=mock)")?;
    tracing::info!(provider = %config.provider, model = upstream.model(), "upstream ready");

    let addr = config.resolve_addr().await?;
    run_server(AppState::new(upstream), addr).await?;
    Ok(())
}
