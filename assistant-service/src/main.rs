use assistant_service::{
    config::AssistantConfig,
    services::{metrics::init_metrics, AssistantStore, InMemoryAssistantStore},
    startup::Application,
};
use service_core::error::AppError;
use service_core::observability::init_tracing;
use std::sync::Arc;
use tracing::Instrument;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Fail fast on bad configuration, before anything binds
    let config = AssistantConfig::load()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "Metrics recorder unavailable, /metrics will be empty");
    }

    let service_span = tracing::info_span!(
        "service",
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
    );

    async move {
        tracing::info!(
            cors_origins = ?config.cors.allowed_origins,
            "Starting assistant registry"
        );

        let store: Arc<dyn AssistantStore> = Arc::new(InMemoryAssistantStore::new());
        let app = Application::build(config, store).await?;
        app.run_until_stopped().await?;

        tracing::info!("Service shutdown complete");
        Ok::<(), AppError>(())
    }
    .instrument(service_span)
    .await
}
