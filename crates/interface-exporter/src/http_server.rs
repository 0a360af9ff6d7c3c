//! HTTP server for the Prometheus scrape endpoint.

use crate::collector::HealthCollector;
use crate::metrics::{MetricsRegistry, OPENMETRICS_CONTENT_TYPE, encode_samples};
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared handler state
#[derive(Clone)]
struct AppState {
    collector: HealthCollector,
    metrics: Arc<MetricsRegistry>,
    metrics_path: Arc<str>,
}

/// HTTP server for the metrics endpoint
pub struct MetricsServer {
    collector: HealthCollector,
    metrics: Arc<MetricsRegistry>,
    /// Listen address
    listen_addr: String,
    /// Path the scrape endpoint is served on
    metrics_path: String,
}

impl MetricsServer {
    /// Create a new metrics server
    pub fn new(
        collector: HealthCollector,
        metrics: Arc<MetricsRegistry>,
        listen_addr: String,
        metrics_path: String,
    ) -> Self {
        Self {
            collector,
            metrics,
            listen_addr,
            metrics_path,
        }
    }

    pub fn listen_addr(&self) -> &str {
        &self.listen_addr
    }

    /// Build the router serving the scrape endpoint and the landing page
    pub fn router(&self) -> Router {
        let state = AppState {
            collector: self.collector.clone(),
            metrics: self.metrics.clone(),
            metrics_path: Arc::from(self.metrics_path.as_str()),
        };

        Router::new()
            .route(&self.metrics_path, get(metrics_handler))
            .route("/", get(index_handler))
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
            .with_state(state)
    }

    /// Bind the listener and serve until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> common::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(listen_addr = %self.listen_addr, "Starting metrics HTTP server");

        let listener = TcpListener::bind(&self.listen_addr)
            .await
            .map_err(|e| common::Error::listener(self.listen_addr.clone(), e))?;

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> common::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        info!(
            listen_addr = %self.listen_addr,
            metrics_path = %self.metrics_path,
            "Metrics server listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Metrics server stopped");
        Ok(())
    }
}

/// Handler for the scrape endpoint: one collection pass per request
async fn metrics_handler(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    let samples = state.collector.collect().await;
    state.metrics.record_scrape(start.elapsed());

    match encode_samples(&samples, Some(&state.metrics)) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html><head><title>Interface Exporter</title></head>\
         <body><h1>Interface Exporter</h1>\
         <p><a href=\"{path}\">{path}</a></p></body></html>",
        path = state.metrics_path
    ))
}
