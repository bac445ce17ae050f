//! Domain Ports (Port/Adapter Pattern)
//!
//! The synchronizer only depends on the narrow [`ResourceLister`] port.
//! Infrastructure adapters bind it to a concrete control-plane client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Domain Layer                            │
//! │        ResourceScope (value)  │  ResourceLister (port)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Infrastructure Layer                       │
//! │   KubernetesResourceLister  │  InMemoryResourceLister        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use crate::error::Result;

// =============================================================================
// Value Objects
// =============================================================================

/// The resource kind (and optional namespace) a lister is bound to.
///
/// Fixed at startup; listers never take a per-call scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceScope {
    /// API group, empty for the core group
    pub group: String,
    /// API version
    pub version: String,
    /// Kind name
    pub kind: String,
    /// Plural resource name used in API paths
    pub plural: String,
    /// Namespace to list in, `None` for cluster scope
    pub namespace: Option<String>,
}

impl ResourceScope {
    /// Create a cluster-wide scope.
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
        plural: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            plural: plural.into(),
            namespace: None,
        }
    }

    /// Gateway API GatewayClasses (cluster-scoped).
    pub fn gateway_classes() -> Self {
        Self::new("gateway.networking.k8s.io", "v1", "GatewayClass", "gatewayclasses")
    }

    /// Restrict the scope to a single namespace.
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// `group/version`, or the bare version for the core group.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Whether listing spans the whole cluster.
    pub fn is_cluster_scoped(&self) -> bool {
        self.namespace.is_none()
    }
}

impl std::fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}", self.plural, self.version)?;
        } else {
            write!(f, "{}.{}/{}", self.plural, self.group, self.version)?;
        }
        if let Some(ns) = &self.namespace {
            write!(f, " in namespace {}", ns)?;
        }
        Ok(())
    }
}

// =============================================================================
// Ports
// =============================================================================

/// Lists the names of every instance of one resource kind.
///
/// Implementations are read-only. Any failure surfaces as
/// [`Error::UpstreamUnavailable`](crate::error::Error::UpstreamUnavailable)
/// and callers must not use partial results. Duplicates reported by the
/// upstream are passed through untouched.
#[async_trait]
pub trait ResourceLister: Send + Sync {
    /// The scope this lister was configured with.
    fn scope(&self) -> &ResourceScope;

    /// Fetch a fresh snapshot of instance names.
    async fn list(&self) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_classes_scope() {
        let scope = ResourceScope::gateway_classes();

        assert_eq!(scope.group, "gateway.networking.k8s.io");
        assert_eq!(scope.version, "v1");
        assert_eq!(scope.kind, "GatewayClass");
        assert_eq!(scope.plural, "gatewayclasses");
        assert!(scope.is_cluster_scoped());
        assert_eq!(scope.api_version(), "gateway.networking.k8s.io/v1");
        assert_eq!(
            scope.to_string(),
            "gatewayclasses.gateway.networking.k8s.io/v1"
        );
    }

    #[test]
    fn test_core_group_scope() {
        let scope = ResourceScope::new("", "v1", "ConfigMap", "configmaps").in_namespace("kube-system");

        assert_eq!(scope.api_version(), "v1");
        assert!(!scope.is_cluster_scoped());
        assert_eq!(scope.to_string(), "configmaps/v1 in namespace kube-system");
    }
}
