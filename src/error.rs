//! Error types for the GatewayClass exporter

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause carried by upstream failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in the GatewayClass exporter
#[derive(Error, Debug)]
pub enum Error {
    /// Cluster credentials or endpoint could not be resolved at startup
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Listing the monitored resource failed (transport, auth or API error)
    #[error("Upstream listing of {resource} unavailable: {source}")]
    UpstreamUnavailable {
        resource: String,
        #[source]
        source: BoxError,
    },

    /// Metric registration or encoding error
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build an `UpstreamUnavailable` error for the given resource.
    pub fn upstream(resource: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::UpstreamUnavailable {
            resource: resource.into(),
            source: source.into(),
        }
    }

    /// Returns true if this error came from the listing call.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::UpstreamUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_display() {
        let err = Error::upstream(
            "gatewayclasses.gateway.networking.k8s.io/v1",
            std::io::Error::other("connection refused"),
        );

        assert!(err.is_upstream());
        assert_eq!(
            err.to_string(),
            "Upstream listing of gatewayclasses.gateway.networking.k8s.io/v1 unavailable: connection refused"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_configuration_error_is_not_upstream() {
        let err = Error::Configuration("no kubeconfig".to_string());
        assert!(!err.is_upstream());
        assert_eq!(err.to_string(), "Configuration error: no kubeconfig");
    }
}
