//! Metric samples and Prometheus encoding for the interface exporter.

use interface_probe::{ProbeResult, Target};
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

/// Name of the exported health gauge
pub const HEALTH_METRIC_NAME: &str = "interface_health_status";

/// Help text of the exported health gauge
pub const HEALTH_METRIC_HELP: &str = "Health status of the interfaces";

/// Content type of the encoded exposition
pub const OPENMETRICS_CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Labels of the health gauge, taken verbatim from the target
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct InterfaceLabels {
    /// Target name
    pub name: String,
    /// Target URL or host:port
    pub url: String,
    /// Configured protocol string
    pub protocol: String,
}

impl From<&Target> for InterfaceLabels {
    fn from(target: &Target) -> Self {
        Self {
            name: target.name.clone(),
            url: target.url.clone(),
            protocol: target.protocol.as_str().to_string(),
        }
    }
}

/// One observation of the health gauge
#[derive(Clone, Debug, PartialEq)]
pub struct MetricSample {
    pub labels: InterfaceLabels,
    /// 1.0 healthy, 0.0 anything else
    pub value: f64,
}

impl MetricSample {
    pub fn new(target: &Target, healthy: bool) -> Self {
        Self {
            labels: InterfaceLabels::from(target),
            value: if healthy { 1.0 } else { 0.0 },
        }
    }

    pub fn from_result(target: &Target, result: &ProbeResult) -> Self {
        Self::new(target, result.is_healthy())
    }

    pub fn is_healthy(&self) -> bool {
        self.value == 1.0
    }
}

/// Encode one pass worth of samples, plus the exporter's own metrics.
///
/// A fresh registry is built per call so concurrent scrapes never share
/// series and targets never linger from an earlier pass.
pub fn encode_samples(
    samples: &[MetricSample],
    metrics: Option<&MetricsRegistry>,
) -> Result<String, std::fmt::Error> {
    let mut registry = Registry::default();

    let health = Family::<InterfaceLabels, Gauge<f64, AtomicU64>>::default();
    for sample in samples {
        health.get_or_create(&sample.labels).set(sample.value);
    }
    registry.register(HEALTH_METRIC_NAME, HEALTH_METRIC_HELP, health);

    if let Some(m) = metrics {
        m.register_into(&mut registry);
    }

    let mut buffer = String::new();
    encode(&mut buffer, &registry)?;
    Ok(buffer)
}

/// Labels for probe outcome counters
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ProbeLabels {
    /// Configured protocol string
    pub protocol: String,
    /// Result (success, failure, timeout, error)
    pub result: String,
}

/// Labels for per-protocol metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ProtocolLabels {
    pub protocol: String,
}

/// Exporter self-metrics, kept across scrapes
#[derive(Clone)]
pub struct MetricsRegistry {
    /// Scrapes served
    scrapes_total: Counter,
    /// Collection pass duration
    scrape_duration_seconds: Histogram,
    /// Probes by outcome
    probes_total: Family<ProbeLabels, Counter>,
    /// Probe duration
    probe_duration_seconds: Family<ProtocolLabels, Histogram>,
    /// Configured targets
    targets: Gauge,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    pub fn new() -> Self {
        // 1ms up to ~16s, enough to cover the largest probe timeout
        let probe_duration_seconds: Family<ProtocolLabels, Histogram> =
            Family::new_with_constructor(|| Histogram::new(exponential_buckets(0.001, 2.0, 15)));

        Self {
            scrapes_total: Counter::default(),
            scrape_duration_seconds: Histogram::new(exponential_buckets(0.001, 2.0, 15)),
            probes_total: Family::default(),
            probe_duration_seconds,
            targets: Gauge::default(),
        }
    }

    /// Register handles to the self-metrics under the `interface_exporter` prefix
    pub fn register_into(&self, registry: &mut Registry) {
        let sub = registry.sub_registry_with_prefix("interface_exporter");
        sub.register(
            "scrapes",
            "Total scrapes served",
            self.scrapes_total.clone(),
        );
        sub.register(
            "scrape_duration_seconds",
            "Duration of a full collection pass in seconds",
            self.scrape_duration_seconds.clone(),
        );
        sub.register(
            "probes",
            "Total probes performed by result",
            self.probes_total.clone(),
        );
        sub.register(
            "probe_duration_seconds",
            "Probe duration in seconds",
            self.probe_duration_seconds.clone(),
        );
        sub.register(
            "targets",
            "Number of configured targets",
            self.targets.clone(),
        );
    }

    /// Record the outcome of one probe
    pub fn record_probe(&self, protocol: &str, result: &ProbeResult) {
        self.probes_total
            .get_or_create(&ProbeLabels {
                protocol: protocol.to_string(),
                result: result.status.as_label().to_string(),
            })
            .inc();

        self.probe_duration_seconds
            .get_or_create(&ProtocolLabels {
                protocol: protocol.to_string(),
            })
            .observe(result.duration.as_secs_f64());
    }

    /// Record a completed scrape
    pub fn record_scrape(&self, duration: Duration) {
        self.scrapes_total.inc();
        self.scrape_duration_seconds.observe(duration.as_secs_f64());
    }

    /// Update the configured target count
    pub fn set_targets(&self, count: usize) {
        self.targets.set(count as i64);
    }
}
