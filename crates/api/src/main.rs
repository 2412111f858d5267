use anyhow::Context;

use storefront_infra::StorefrontConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = StorefrontConfig::from_env().context("invalid configuration")?;
    storefront_observability::init(config.log_format);

    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let app = storefront_api::app::build_app(&config)
        .await
        .context("failed to wire stores")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
