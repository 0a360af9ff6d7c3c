//! Tracing bootstrap with optional OpenTelemetry span export.
//!
//! Log lines always go to stdout through `common::logging`. When telemetry is
//! enabled, spans (one per scrape request and one per probe) are additionally
//! exported over OTLP/gRPC.

use crate::config::{LoggingSettings, TelemetrySettings};
use opentelemetry::{KeyValue, trace::TracerProvider as _};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource, runtime,
    trace::{RandomIdGenerator, Sampler, TracerProvider},
};

/// OpenTelemetry tracer guard
///
/// When dropped, flushes all pending spans and shuts down the tracer
pub struct TelemetryGuard;

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        opentelemetry::global::shutdown_tracer_provider();
    }
}

/// Build a tracer provider exporting spans to an OTLP collector
fn build_tracer_provider(service_name: &str, otlp_endpoint: &str) -> common::Result<TracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_endpoint)
        .build()
        .map_err(common::Error::telemetry)?;

    let resource = Resource::new(vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION").to_string()),
    ]);

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource),
        )
        .build())
}

/// Install the global tracing subscriber.
///
/// Returns a guard that must be kept alive for the duration of the program
/// when OpenTelemetry is enabled.
pub fn init_tracing(
    logging: &LoggingSettings,
    telemetry: &TelemetrySettings,
) -> common::Result<Option<TelemetryGuard>> {
    if !telemetry.enabled {
        common::logging::init(&logging.level, logging.format)?;
        tracing::info!(format = %logging.format, "Tracing initialized without OpenTelemetry");
        return Ok(None);
    }

    let provider = build_tracer_provider(&telemetry.service_name, &telemetry.otlp_endpoint)?;
    let tracer = provider.tracer(telemetry.service_name.clone());
    opentelemetry::global::set_tracer_provider(provider);

    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    common::logging::init_with_layer(&logging.level, logging.format, Some(telemetry_layer))?;

    tracing::info!(
        service_name = %telemetry.service_name,
        otlp_endpoint = %telemetry.otlp_endpoint,
        "Tracing initialized with OpenTelemetry integration"
    );

    Ok(Some(TelemetryGuard))
}
