//! Interface health exporter
//!
//! Probes a configured set of network interfaces (HTTP endpoints and TCP
//! sockets) whenever it is scraped and reports one `interface_health_status`
//! gauge per interface: 1 when healthy, 0 otherwise.
//!
//! # Components
//!
//! - **Config**: YAML target list plus optional exporter settings
//! - **TargetRegistry**: immutable targets shared by every scrape
//! - **HealthCollector**: concurrent fan-out of probes, one sample per target
//! - **MetricsServer**: axum scrape endpoint encoding samples with prometheus-client

pub mod collector;
pub mod config;
pub mod http_server;
pub mod metrics;
pub mod registry;
pub mod server;
pub mod telemetry;

pub use collector::{HealthCollector, HealthResult};
pub use config::{Config, ConfigError, DEFAULT_CONFIG_PATH, TargetConfig};
pub use http_server::MetricsServer;
pub use metrics::{HEALTH_METRIC_NAME, InterfaceLabels, MetricSample, MetricsRegistry, encode_samples};
pub use registry::TargetRegistry;
pub use server::ExporterServer;
pub use telemetry::{TelemetryGuard, init_tracing};
