use std::sync::Arc;

use anyhow::Context;

use bankmark_ai::PredictionService;
use bankmark_api::config::ServeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServeConfig::from_env().context("invalid configuration")?;
    bankmark_observability::tracing::init(config.log_format);

    let mut service = PredictionService::new();
    service
        .load(&config.artifact)
        .with_context(|| format!("cannot start without a pipeline ({})", config.artifact.display()))?;

    let app = bankmark_api::app::build_app(Arc::new(service));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
