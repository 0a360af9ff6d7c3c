//! Probe implementations.

use crate::types::{ProbeConfig, ProbeResult, Protocol, Target};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::redirect::Policy;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Health checker trait
#[async_trait]
pub trait HealthChecker: Send + Sync {
    /// Perform a single probe
    async fn check(&self) -> ProbeResult;

    /// Get the name of this checker
    fn name(&self) -> &str;
}

/// Build the HTTP client shared by every [`HttpChecker`] of a collector.
///
/// Idle connections are never pooled, so each probe opens and closes its
/// own connection.
pub fn build_http_client(config: &ProbeConfig) -> common::Result<reqwest::Client> {
    let redirect = if config.follow_redirects {
        Policy::limited(ProbeConfig::MAX_REDIRECTS)
    } else {
        Policy::none()
    };

    reqwest::Client::builder()
        .timeout(config.timeout)
        .redirect(redirect)
        .pool_max_idle_per_host(0)
        .build()
        .map_err(common::Error::probe)
}

/// Pick the checker matching the target's protocol.
pub fn checker_for(
    target: &Target,
    client: &reqwest::Client,
    config: &ProbeConfig,
) -> Arc<dyn HealthChecker> {
    match &target.protocol {
        Protocol::Http => Arc::new(HttpChecker::new(
            target.url.clone(),
            client.clone(),
            config.timeout,
        )),
        Protocol::Tcp => Arc::new(TcpChecker::new(target.url.clone(), config.timeout)),
        Protocol::Unsupported(raw) => Arc::new(UnsupportedChecker::new(raw.clone())),
    }
}

/// TCP health checker
pub struct TcpChecker {
    address: String,
    timeout_duration: Duration,
}

impl TcpChecker {
    /// Create a new TCP health checker for a `host:port` address
    pub fn new(address: impl Into<String>, timeout_duration: Duration) -> Self {
        Self {
            address: address.into(),
            timeout_duration,
        }
    }
}

#[async_trait]
impl HealthChecker for TcpChecker {
    async fn check(&self) -> ProbeResult {
        let start = Instant::now();

        // Resolution is part of the connect future, so the timeout covers DNS too.
        match timeout(self.timeout_duration, TcpStream::connect(self.address.as_str())).await {
            Ok(Ok(stream)) => {
                drop(stream);
                let duration = start.elapsed();
                debug!(address = %self.address, duration_ms = duration.as_millis(), "TCP probe successful");
                ProbeResult::healthy(duration)
            }
            Ok(Err(e)) => {
                let duration = start.elapsed();
                warn!(address = %self.address, error = %e, "TCP probe failed");
                ProbeResult::unhealthy(duration, format!("Connection failed: {}", e))
            }
            Err(_) => {
                let duration = start.elapsed();
                warn!(address = %self.address, "TCP probe timed out");
                ProbeResult::timeout(duration)
            }
        }
    }

    fn name(&self) -> &str {
        "tcp"
    }
}

/// HTTP health checker
///
/// Issues a GET and is healthy only on status 200. Any other code, including
/// an unfollowed redirect, is unhealthy.
pub struct HttpChecker {
    url: String,
    client: reqwest::Client,
    timeout_duration: Duration,
}

impl HttpChecker {
    /// Create a new HTTP health checker using a client from [`build_http_client`]
    pub fn new(url: impl Into<String>, client: reqwest::Client, timeout_duration: Duration) -> Self {
        Self {
            url: url.into(),
            client,
            timeout_duration,
        }
    }
}

#[async_trait]
impl HealthChecker for HttpChecker {
    async fn check(&self) -> ProbeResult {
        let start = Instant::now();

        match timeout(self.timeout_duration, self.client.get(&self.url).send()).await {
            Ok(Ok(response)) => {
                let duration = start.elapsed();
                let status = response.status();

                if status == StatusCode::OK {
                    debug!(url = %self.url, status = status.as_u16(), duration_ms = duration.as_millis(),
                           "HTTP probe successful");
                    ProbeResult::healthy(duration).with_response_code(status.as_u16())
                } else {
                    warn!(url = %self.url, status = status.as_u16(), "HTTP probe failed: unexpected status code");
                    ProbeResult::unhealthy(duration, format!("Unexpected status code: {}", status.as_u16()))
                        .with_response_code(status.as_u16())
                }
            }
            Ok(Err(e)) if e.is_timeout() => {
                let duration = start.elapsed();
                warn!(url = %self.url, "HTTP probe timed out");
                ProbeResult::timeout(duration)
            }
            Ok(Err(e)) => {
                let duration = start.elapsed();
                warn!(url = %self.url, error = %e, "HTTP probe failed");
                ProbeResult::error(duration, format!("HTTP request failed: {}", e))
            }
            Err(_) => {
                let duration = start.elapsed();
                warn!(url = %self.url, "HTTP probe timed out");
                ProbeResult::timeout(duration)
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Checker for protocols the exporter does not know. Never touches the network.
pub struct UnsupportedChecker {
    protocol: String,
}

impl UnsupportedChecker {
    pub fn new(protocol: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
        }
    }
}

#[async_trait]
impl HealthChecker for UnsupportedChecker {
    async fn check(&self) -> ProbeResult {
        debug!(protocol = %self.protocol, "Skipping probe for unsupported protocol");
        ProbeResult::unhealthy(
            Duration::ZERO,
            format!("Unsupported protocol: {}", self.protocol),
        )
    }

    fn name(&self) -> &str {
        &self.protocol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProbeStatus;

    #[tokio::test]
    async fn test_tcp_checker_refused() {
        let checker = TcpChecker::new("127.0.0.1:1", Duration::from_millis(100));

        let result = checker.check().await;
        assert!(!result.is_healthy());
        assert!(result.duration <= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_tcp_checker_invalid_address() {
        let checker = TcpChecker::new("not an address", Duration::from_millis(100));

        let result = checker.check().await;
        assert!(!result.is_healthy());
    }

    #[tokio::test]
    async fn test_http_checker_connection_error() {
        let client = build_http_client(&ProbeConfig {
            timeout: Duration::from_millis(100),
            follow_redirects: true,
        })
        .unwrap();
        let checker = HttpChecker::new("http://127.0.0.1:1/health", client, Duration::from_millis(100));

        let result = checker.check().await;
        assert!(!result.is_healthy());
        assert!(result.response_code.is_none());
    }

    #[tokio::test]
    async fn test_http_checker_malformed_url() {
        let client = build_http_client(&ProbeConfig::default()).unwrap();
        let checker = HttpChecker::new("localhost:9999/health", client, Duration::from_millis(100));

        let result = checker.check().await;
        assert_eq!(result.status, ProbeStatus::Error);
    }

    #[tokio::test]
    async fn test_unsupported_checker() {
        let checker = UnsupportedChecker::new("udp");

        let result = checker.check().await;
        assert_eq!(result.status, ProbeStatus::Unhealthy);
        assert_eq!(result.duration, Duration::ZERO);
        assert_eq!(checker.name(), "udp");
    }

    #[tokio::test]
    async fn test_checker_for_protocols() {
        let config = ProbeConfig::default();
        let client = build_http_client(&config).unwrap();

        let http = Target::new("api", "http://localhost/health", "http", None);
        let tcp = Target::new("db", "localhost:5432", "tcp", None);
        let other = Target::new("dns", "localhost:53", "HTTP", None);

        assert_eq!(checker_for(&http, &client, &config).name(), "http");
        assert_eq!(checker_for(&tcp, &client, &config).name(), "tcp");
        assert_eq!(checker_for(&other, &client, &config).name(), "HTTP");
    }
}
