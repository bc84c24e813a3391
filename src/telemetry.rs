use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize structured logging for the dispatch core.
/// JSON output with span context, so violation and mismatch events can
/// be correlated with the transitions that produced them downstream.
pub fn init_telemetry() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Crew dispatch telemetry initialized with structured logging");
    Ok(())
}

/// Generate a correlation ID for linking related records and events.
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span with common dispatch operation attributes.
pub fn create_dispatch_span(
    operation: &str,
    task_id: Option<u64>,
    location_id: Option<u32>,
    correlation_id: Option<&str>,
) -> tracing::Span {
    tracing::info_span!(
        "transport_dispatch",
        operation = operation,
        task.id = task_id,
        location.id = location_id,
        correlation.id = correlation_id,
        otel.kind = "internal"
    )
}

/// Shutdown telemetry gracefully.
pub fn shutdown_telemetry() {
    // For structured logging, no explicit shutdown needed
    tracing::info!("Crew dispatch telemetry shutdown complete");
}
