//! Target and probe result types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Protocol a target is probed with.
///
/// Keeps the configured string verbatim so it can be exported as a label
/// value unchanged. Matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Protocol {
    /// HTTP GET, healthy on status 200
    Http,
    /// TCP connect, healthy once established
    Tcp,
    /// Anything else; never healthy
    Unsupported(String),
}

impl Protocol {
    /// The configured protocol string.
    pub fn as_str(&self) -> &str {
        match self {
            Protocol::Http => "http",
            Protocol::Tcp => "tcp",
            Protocol::Unsupported(raw) => raw,
        }
    }
}

impl From<String> for Protocol {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "http" => Protocol::Http,
            "tcp" => Protocol::Tcp,
            _ => Protocol::Unsupported(raw),
        }
    }
}

impl From<&str> for Protocol {
    fn from(raw: &str) -> Self {
        Protocol::from(raw.to_string())
    }
}

impl From<Protocol> for String {
    fn from(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Unsupported(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured interface to health-check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Display name, exported as the `name` label
    pub name: String,

    /// HTTP URL for `http`, `host:port` for `tcp`
    pub url: String,

    /// Probe protocol
    pub protocol: Protocol,

    /// Informational check interval, always non-zero
    pub check_interval: Duration,
}

impl Target {
    /// Interval assigned to targets that do not configure one.
    pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

    /// Create a target, defaulting a missing or zero interval to one second.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        protocol: impl Into<Protocol>,
        check_interval: Option<Duration>,
    ) -> Self {
        let check_interval = check_interval
            .filter(|interval| !interval.is_zero())
            .unwrap_or(Self::DEFAULT_CHECK_INTERVAL);

        Self {
            name: name.into(),
            url: url.into(),
            protocol: protocol.into(),
            check_interval,
        }
    }
}

/// Probe status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Target answered as expected
    Healthy,
    /// Target answered, but not as expected
    Unhealthy,
    /// Probe did not complete within its timeout
    Timeout,
    /// Probe failed at the transport level
    Error,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Healthy => write!(f, "HEALTHY"),
            ProbeStatus::Unhealthy => write!(f, "UNHEALTHY"),
            ProbeStatus::Timeout => write!(f, "TIMEOUT"),
            ProbeStatus::Error => write!(f, "ERROR"),
        }
    }
}

impl ProbeStatus {
    /// Lower-case form used as a metric label value.
    pub fn as_label(&self) -> &'static str {
        match self {
            ProbeStatus::Healthy => "success",
            ProbeStatus::Unhealthy => "failure",
            ProbeStatus::Timeout => "timeout",
            ProbeStatus::Error => "error",
        }
    }
}

/// Probe result
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// Status of the probe
    pub status: ProbeStatus,

    /// Time spent probing
    pub duration: Duration,

    /// Optional failure detail, only ever logged
    pub message: Option<String>,

    /// Response code (for HTTP probes)
    pub response_code: Option<u16>,
}

impl ProbeResult {
    /// Create a healthy result
    pub fn healthy(duration: Duration) -> Self {
        Self {
            status: ProbeStatus::Healthy,
            duration,
            message: None,
            response_code: None,
        }
    }

    /// Create an unhealthy result
    pub fn unhealthy(duration: Duration, message: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Unhealthy,
            duration,
            message: Some(message.into()),
            response_code: None,
        }
    }

    /// Create a timeout result
    pub fn timeout(duration: Duration) -> Self {
        Self {
            status: ProbeStatus::Timeout,
            duration,
            message: Some("Probe timed out".to_string()),
            response_code: None,
        }
    }

    /// Create an error result
    pub fn error(duration: Duration, message: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Error,
            duration,
            message: Some(message.into()),
            response_code: None,
        }
    }

    /// Attach the HTTP status code that produced this result
    pub fn with_response_code(mut self, code: u16) -> Self {
        self.response_code = Some(code);
        self
    }

    /// Check if the result is healthy
    pub fn is_healthy(&self) -> bool {
        self.status == ProbeStatus::Healthy
    }

    /// Gauge value: 1.0 when healthy, 0.0 otherwise.
    pub fn value(&self) -> f64 {
        if self.is_healthy() { 1.0 } else { 0.0 }
    }
}

/// Probe settings shared by every checker of a collector.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    /// Upper bound for one probe, connect and response included
    pub timeout: Duration,

    /// Follow HTTP redirects (at most [`ProbeConfig::MAX_REDIRECTS`] hops)
    pub follow_redirects: bool,
}

impl ProbeConfig {
    /// Redirect hops followed when `follow_redirects` is set.
    pub const MAX_REDIRECTS: usize = 10;
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            follow_redirects: true,
        }
    }
}
