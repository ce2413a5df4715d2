use anyhow::Context;
use axum::{ServiceExt, extract::Request};

use userdesk_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    userdesk_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let app = userdesk_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind 0.0.0.0:{}", config.port))?;

    let addr = listener.local_addr()?;
    tracing::info!(%addr, base_path = %config.base_path, "userdesk api listening");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;
    Ok(())
}
