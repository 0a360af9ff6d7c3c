//! Exporter wiring: registry, collector and scrape server built explicitly.

use crate::collector::HealthCollector;
use crate::config::Config;
use crate::http_server::MetricsServer;
use crate::metrics::MetricsRegistry;
use crate::registry::TargetRegistry;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Interface exporter
pub struct ExporterServer {
    registry: TargetRegistry,
    metrics_server: MetricsServer,
}

impl ExporterServer {
    /// Build every component from a loaded configuration
    pub fn new(config: &Config) -> common::Result<Self> {
        let registry = TargetRegistry::from_configs(&config.targets);
        for target in registry.iter() {
            debug!(
                name = %target.name,
                url = %target.url,
                protocol = %target.protocol,
                check_interval_ms = target.check_interval.as_millis(),
                "Registered target"
            );
        }
        if registry.is_empty() {
            warn!("No targets configured, scrapes will only carry exporter metrics");
        }

        let metrics = Arc::new(MetricsRegistry::new());
        let collector = HealthCollector::new(
            &registry,
            &config.probe.to_probe_config(),
            Some(metrics.clone()),
        )?;

        let metrics_server = MetricsServer::new(
            collector,
            metrics,
            config.server.listen_addr.clone(),
            config.server.metrics_path.clone(),
        );

        Ok(Self {
            registry,
            metrics_server,
        })
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Serve until Ctrl-C or SIGTERM
    pub async fn run(self) -> common::Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> common::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(targets = self.registry.len(), "Starting interface exporter");
        self.metrics_server.run(shutdown).await?;
        info!("Interface exporter stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
