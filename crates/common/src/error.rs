//! Common error types for the interface exporter crates.

use std::fmt;

/// A specialized Result type for exporter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for exporter operations.
///
/// Only startup-time failures end up here. A failed probe is a result,
/// not an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to bind metrics listener on {addr}: {source}")]
    Listener {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Probe setup error: {0}")]
    Probe(String),

    #[error("Telemetry error: {0}")]
    Telemetry(String),

    #[error("Unknown error: {0}")]
    Other(String),
}

impl Error {
    /// Create a new listener error.
    pub fn listener(addr: impl Into<String>, source: std::io::Error) -> Self {
        Error::Listener {
            addr: addr.into(),
            source,
        }
    }

    /// Create a new probe setup error.
    pub fn probe(msg: impl fmt::Display) -> Self {
        Error::Probe(msg.to_string())
    }

    /// Create a new telemetry error.
    pub fn telemetry(msg: impl fmt::Display) -> Self {
        Error::Telemetry(msg.to_string())
    }

    /// Create a new other error.
    pub fn other(msg: impl fmt::Display) -> Self {
        Error::Other(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_error_display() {
        let err = Error::listener(
            "0.0.0.0:8080",
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        );
        assert_eq!(
            err.to_string(),
            "Failed to bind metrics listener on 0.0.0.0:8080: address in use"
        );
    }

    #[test]
    fn test_telemetry_error_display() {
        let err = Error::telemetry("exporter unavailable");
        assert_eq!(err.to_string(), "Telemetry error: exporter unavailable");
    }
}
