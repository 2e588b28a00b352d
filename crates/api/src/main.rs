use anyhow::Context;

use invoiceai_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    invoiceai_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let addr = config.listen_addr()?;
    let app = invoiceai_api::app::build_app(&config).context("failed to build app")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("Server is running on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
