//! Single-shot health probes for configured network interfaces.
//!
//! A probe answers one question, "is this target healthy right now?", within
//! a bounded wait:
//! - `http`: GET the URL, healthy iff the status is exactly 200
//! - `tcp`: connect to `host:port`, healthy iff the connection is established
//! - anything else: never healthy, no network I/O
//!
//! Refused connections, DNS failures, unexpected status codes and timeouts
//! all end up unhealthy. The richer [`ProbeStatus`] is kept for logs only.
//!
//! # Example
//!
//! ```no_run
//! use interface_probe::{ProbeConfig, Target, build_http_client, checker_for};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProbeConfig::default();
//! let client = build_http_client(&config)?;
//!
//! let target = Target::new("db", "localhost:5432", "tcp", None);
//! let checker = checker_for(&target, &client, &config);
//!
//! let result = checker.check().await;
//! println!("{} healthy: {}", target.name, result.is_healthy());
//! # Ok(())
//! # }
//! ```

pub mod checkers;
pub mod types;

pub use checkers::{
    HealthChecker, HttpChecker, TcpChecker, UnsupportedChecker, build_http_client, checker_for,
};
pub use types::{ProbeConfig, ProbeResult, ProbeStatus, Protocol, Target};
