//! Kubernetes Resource Lister Adapter
//!
//! Implements the `ResourceLister` port on top of kube's dynamic API, and
//! resolves the cluster client the lister runs against.

use std::path::Path;

use async_trait::async_trait;
use hyper::Uri;
use kube::api::{Api, ApiResource, DynamicObject, GroupVersionKind, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::{debug, info, instrument};

use crate::domain::ports::{ResourceLister, ResourceScope};
use crate::error::{Error, Result};

// =============================================================================
// Client Bootstrap
// =============================================================================

/// Resolve cluster credentials.
///
/// In-cluster service account first, then an explicit kubeconfig and/or
/// API server address.
pub async fn resolve_config(apiserver: Option<&str>, kubeconfig: Option<&Path>) -> Result<Config> {
    match Config::incluster() {
        Ok(config) => {
            info!("Using in-cluster service account credentials");
            Ok(config)
        }
        Err(e) => {
            debug!("In-cluster configuration unavailable: {}", e);
            explicit_config(apiserver, kubeconfig).await
        }
    }
}

/// Build a config from an explicit kubeconfig file and/or API server URL.
pub async fn explicit_config(
    apiserver: Option<&str>,
    kubeconfig: Option<&Path>,
) -> Result<Config> {
    let cluster_url = apiserver.map(parse_cluster_url).transpose()?;

    let mut config = match (kubeconfig, cluster_url.clone()) {
        (Some(path), _) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::Configuration(format!(
                    "failed to read kubeconfig {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| {
                    Error::Configuration(format!(
                        "invalid kubeconfig {}: {}",
                        path.display(),
                        e
                    ))
                })?;
            info!("Using kubeconfig {}", path.display());
            config
        }
        (None, Some(url)) => Config::new(url),
        (None, None) => {
            return Err(Error::Configuration(
                "not running in a cluster. Is APISERVER and/or KUBECONFIG set?".to_string(),
            ))
        }
    };

    if let Some(url) = cluster_url {
        info!("Using API server {}", url);
        config.cluster_url = url;
    }

    Ok(config)
}

/// Resolve credentials and create the Kubernetes client.
pub async fn connect(apiserver: Option<&str>, kubeconfig: Option<&Path>) -> Result<Client> {
    let config = resolve_config(apiserver, kubeconfig).await?;
    Client::try_from(config)
        .map_err(|e| Error::Configuration(format!("Kubernetes client creation failed: {}", e)))
}

/// Parse an API server address; `host[:port]` without a scheme means https.
fn parse_cluster_url(raw: &str) -> Result<Uri> {
    let raw = raw.trim();
    let absolute = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let url: Uri = absolute
        .parse()
        .map_err(|e| Error::Configuration(format!("invalid API server address {:?}: {}", raw, e)))?;
    if url.host().map_or(true, str::is_empty) {
        return Err(Error::Configuration(format!(
            "API server address {:?} has no host",
            raw
        )));
    }
    Ok(url)
}

// =============================================================================
// Lister
// =============================================================================

/// Lists resource names through the dynamic (untyped) Kubernetes API.
#[derive(Clone)]
pub struct KubernetesResourceLister {
    api: Api<DynamicObject>,
    scope: ResourceScope,
}

impl KubernetesResourceLister {
    /// Create a lister bound to `scope`.
    pub fn new(client: Client, scope: ResourceScope) -> Self {
        let resource = Self::api_resource(&scope);
        let api = match &scope.namespace {
            Some(ns) => Api::namespaced_with(client, ns, &resource),
            None => Api::all_with(client, &resource),
        };
        Self { api, scope }
    }

    fn api_resource(scope: &ResourceScope) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&scope.group, &scope.version, &scope.kind);
        ApiResource::from_gvk_with_plural(&gvk, &scope.plural)
    }

    /// Extract object names, skipping unnamed objects.
    fn names_of(objects: impl IntoIterator<Item = DynamicObject>) -> Vec<String> {
        objects
            .into_iter()
            .filter_map(|obj| obj.metadata.name)
            .collect()
    }
}

impl std::fmt::Debug for KubernetesResourceLister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubernetesResourceLister")
            .field("scope", &self.scope)
            .finish()
    }
}

#[async_trait]
impl ResourceLister for KubernetesResourceLister {
    fn scope(&self) -> &ResourceScope {
        &self.scope
    }

    #[instrument(skip(self), fields(resource = %self.scope))]
    async fn list(&self) -> Result<Vec<String>> {
        let list = self
            .api
            .list(&ListParams::default())
            .await
            .map_err(|e| Error::upstream(self.scope.to_string(), e))?;

        let names = Self::names_of(list.items);
        debug!(count = names.len(), "Listed resources");
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_api_resource_from_scope() {
        let ar = KubernetesResourceLister::api_resource(&ResourceScope::gateway_classes());

        assert_eq!(ar.group, "gateway.networking.k8s.io");
        assert_eq!(ar.version, "v1");
        assert_eq!(ar.api_version, "gateway.networking.k8s.io/v1");
        assert_eq!(ar.kind, "GatewayClass");
        assert_eq!(ar.plural, "gatewayclasses");
    }

    #[test]
    fn test_names_keep_order_and_duplicates() {
        let ar = KubernetesResourceLister::api_resource(&ResourceScope::gateway_classes());
        let mut unnamed = DynamicObject::new("ignored", &ar);
        unnamed.metadata.name = None;

        let objects = vec![
            DynamicObject::new("istio", &ar),
            unnamed,
            DynamicObject::new("default", &ar),
            DynamicObject::new("istio", &ar),
        ];

        assert_eq!(
            KubernetesResourceLister::names_of(objects),
            vec!["istio", "default", "istio"]
        );
    }

    #[tokio::test]
    async fn test_explicit_config_requires_endpoint() {
        let result = explicit_config(None, None).await;
        assert_matches!(result, Err(Error::Configuration(msg)) if msg.contains("APISERVER"));
    }

    #[tokio::test]
    async fn test_explicit_config_from_apiserver() {
        let config = explicit_config(Some("https://10.0.0.1:6443"), None)
            .await
            .unwrap();

        assert_eq!(config.cluster_url.host(), Some("10.0.0.1"));
        assert_eq!(config.cluster_url.port_u16(), Some(6443));
    }

    #[tokio::test]
    async fn test_explicit_config_defaults_to_https() {
        let config = explicit_config(Some("10.0.0.1:6443"), None).await.unwrap();

        assert_eq!(config.cluster_url.scheme_str(), Some("https"));
        assert_eq!(config.cluster_url.host(), Some("10.0.0.1"));
        assert_eq!(config.cluster_url.port_u16(), Some(6443));

        let config = explicit_config(Some("kube-apiserver"), None).await.unwrap();
        assert_eq!(config.cluster_url.scheme_str(), Some("https"));
        assert_eq!(config.cluster_url.host(), Some("kube-apiserver"));
    }

    #[tokio::test]
    async fn test_explicit_config_keeps_explicit_scheme() {
        let config = explicit_config(Some("http://127.0.0.1:8001"), None)
            .await
            .unwrap();

        assert_eq!(config.cluster_url.scheme_str(), Some("http"));
        assert_eq!(config.cluster_url.port_u16(), Some(8001));
    }

    #[tokio::test]
    async fn test_explicit_config_rejects_malformed_apiserver() {
        let result = explicit_config(Some("not an address"), None).await;
        assert_matches!(result, Err(Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_explicit_config_missing_kubeconfig() {
        let path = Path::new("/nonexistent/gatewayclass-exporter/kubeconfig");
        let result = explicit_config(None, Some(path)).await;
        assert_matches!(result, Err(Error::Configuration(msg)) if msg.contains("kubeconfig"));
    }
}
