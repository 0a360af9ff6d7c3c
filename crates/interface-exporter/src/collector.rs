//! Collection engine: one concurrent probe per target, joined into samples.

use crate::metrics::{MetricSample, MetricsRegistry};
use crate::registry::TargetRegistry;
use futures::future::join_all;
use interface_probe::{HealthChecker, ProbeConfig, ProbeResult, Target, build_http_client, checker_for};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, debug, debug_span, warn};

/// Outcome of probing one target during a pass
#[derive(Debug, Clone)]
pub struct HealthResult {
    pub target: Target,
    pub result: ProbeResult,
}

impl HealthResult {
    pub fn healthy(&self) -> bool {
        self.result.is_healthy()
    }

    pub fn to_sample(&self) -> MetricSample {
        MetricSample::from_result(&self.target, &self.result)
    }
}

/// A target paired with the checker built for it
struct ProbeUnit {
    target: Target,
    checker: Arc<dyn HealthChecker>,
}

/// Runs collection passes over a fixed set of targets.
///
/// Cloning is cheap and every pass is independent, so any number of scrapes
/// may collect at the same time.
#[derive(Clone)]
pub struct HealthCollector {
    units: Arc<[ProbeUnit]>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl HealthCollector {
    /// Build one checker per registered target
    pub fn new(
        registry: &TargetRegistry,
        probe: &ProbeConfig,
        metrics: Option<Arc<MetricsRegistry>>,
    ) -> common::Result<Self> {
        let client = build_http_client(probe)?;
        let units = registry
            .iter()
            .map(|target| (target.clone(), checker_for(target, &client, probe)));

        Ok(Self::with_checkers(units, metrics))
    }

    /// Build a collector from explicit target/checker pairs
    pub fn with_checkers(
        units: impl IntoIterator<Item = (Target, Arc<dyn HealthChecker>)>,
        metrics: Option<Arc<MetricsRegistry>>,
    ) -> Self {
        let units: Vec<ProbeUnit> = units
            .into_iter()
            .map(|(target, checker)| ProbeUnit { target, checker })
            .collect();

        if let Some(ref m) = metrics {
            m.set_targets(units.len());
        }

        Self {
            units: units.into(),
            metrics,
        }
    }

    /// Number of targets probed per pass
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Run one pass and return one sample per target
    pub async fn collect(&self) -> Vec<MetricSample> {
        self.probe_all().await.iter().map(HealthResult::to_sample).collect()
    }

    /// Run one pass and return one result per target, in registry order.
    ///
    /// Every probe runs in its own task and the pass waits for all of them,
    /// so its latency is that of the slowest probe. A task that dies yields
    /// an error result for its target instead of a missing entry.
    pub async fn probe_all(&self) -> Vec<HealthResult> {
        let start = Instant::now();

        let handles: Vec<_> = self
            .units
            .iter()
            .map(|unit| {
                let checker = unit.checker.clone();
                let span = debug_span!(
                    "probe",
                    name = %unit.target.name,
                    protocol = %unit.target.protocol
                );
                tokio::spawn(async move { checker.check().await }.instrument(span))
            })
            .collect();

        let joined = join_all(handles).await;

        let results: Vec<HealthResult> = self
            .units
            .iter()
            .zip(joined)
            .map(|(unit, outcome)| {
                let result = outcome.unwrap_or_else(|e| {
                    warn!(name = %unit.target.name, error = %e, "Probe task failed");
                    ProbeResult::error(Duration::ZERO, format!("Probe task failed: {}", e))
                });

                if let Some(ref m) = self.metrics {
                    m.record_probe(unit.target.protocol.as_str(), &result);
                }

                HealthResult {
                    target: unit.target.clone(),
                    result,
                }
            })
            .collect();

        debug!(
            targets = results.len(),
            healthy = results.iter().filter(|r| r.healthy()).count(),
            duration_ms = start.elapsed().as_millis(),
            "Collection pass finished"
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use interface_probe::ProbeStatus;
    use tokio::time::sleep;

    struct FixedChecker {
        healthy: bool,
        delay: Duration,
    }

    #[async_trait]
    impl HealthChecker for FixedChecker {
        async fn check(&self) -> ProbeResult {
            sleep(self.delay).await;
            if self.healthy {
                ProbeResult::healthy(self.delay)
            } else {
                ProbeResult::timeout(self.delay)
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct PanickingChecker;

    #[async_trait]
    impl HealthChecker for PanickingChecker {
        async fn check(&self) -> ProbeResult {
            panic!("checker blew up");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn target(name: &str) -> Target {
        Target::new(name, format!("{}.internal:80", name), "tcp", None)
    }

    fn fixed(healthy: bool, delay_ms: u64) -> Arc<dyn HealthChecker> {
        Arc::new(FixedChecker {
            healthy,
            delay: Duration::from_millis(delay_ms),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_pass_latency_is_slowest_probe() {
        let units = (0..10).map(|i| (target(&format!("t{}", i)), fixed(true, 1000)));
        let collector = HealthCollector::with_checkers(units, None);

        let start = tokio::time::Instant::now();
        let samples = collector.collect().await;

        assert_eq!(samples.len(), 10);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_panicking_probe_still_yields_sample() {
        let collector = HealthCollector::with_checkers(
            vec![
                (target("a"), fixed(true, 0)),
                (target("b"), Arc::new(PanickingChecker) as Arc<dyn HealthChecker>),
                (target("c"), fixed(true, 0)),
            ],
            None,
        );

        let results = collector.probe_all().await;
        assert_eq!(results.len(), 3);
        assert!(results[0].healthy());
        assert_eq!(results[1].result.status, ProbeStatus::Error);
        assert!(results[2].healthy());
    }

    #[tokio::test]
    async fn test_results_follow_registry_order() {
        let collector = HealthCollector::with_checkers(
            vec![
                (target("slow"), fixed(true, 50)),
                (target("fast"), fixed(false, 0)),
            ],
            None,
        );

        let samples = collector.collect().await;
        assert_eq!(samples[0].labels.name, "slow");
        assert_eq!(samples[0].value, 1.0);
        assert_eq!(samples[1].labels.name, "fast");
        assert_eq!(samples[1].value, 0.0);
    }

    #[tokio::test]
    async fn test_empty_collector() {
        let collector = HealthCollector::with_checkers(Vec::new(), None);
        assert!(collector.is_empty());
        assert!(collector.collect().await.is_empty());
    }

    #[tokio::test]
    async fn test_probes_recorded_in_metrics() {
        let metrics = Arc::new(MetricsRegistry::new());
        let collector = HealthCollector::with_checkers(
            vec![(target("a"), fixed(true, 0)), (target("b"), fixed(false, 0))],
            Some(metrics.clone()),
        );

        collector.collect().await;

        let output = crate::metrics::encode_samples(&[], Some(&metrics)).unwrap();
        assert!(output.contains("interface_exporter_targets 2"));
        assert!(output.contains("interface_exporter_probes_total{protocol=\"tcp\",result=\"success\"} 1"));
        assert!(output.contains("interface_exporter_probes_total{protocol=\"tcp\",result=\"timeout\"} 1"));
    }
}
