//! In-Memory Resource Lister
//!
//! A `ResourceLister` whose listing is set programmatically. Used by tests
//! and for running the exporter without a cluster.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::ports::{ResourceLister, ResourceScope};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
enum Listing {
    Names(Vec<String>),
    Unavailable(String),
}

/// In-memory lister with a swappable listing.
#[derive(Debug)]
pub struct InMemoryResourceLister {
    scope: ResourceScope,
    listing: RwLock<Listing>,
    calls: AtomicU64,
}

impl InMemoryResourceLister {
    /// Create a lister returning `names`.
    pub fn new<I, S>(scope: ResourceScope, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scope,
            listing: RwLock::new(Listing::Names(names.into_iter().map(Into::into).collect())),
            calls: AtomicU64::new(0),
        }
    }

    /// Replace the names returned by subsequent listings.
    pub fn set_names<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.listing.write() = Listing::Names(names.into_iter().map(Into::into).collect());
    }

    /// Make subsequent listings fail with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.listing.write() = Listing::Unavailable(reason.into());
    }

    /// Number of times `list` has been called.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ResourceLister for InMemoryResourceLister {
    fn scope(&self) -> &ResourceScope {
        &self.scope
    }

    async fn list(&self) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let listing = self.listing.read().clone();
        match listing {
            Listing::Names(names) => Ok(names),
            Listing::Unavailable(reason) => Err(Error::upstream(
                self.scope.to_string(),
                std::io::Error::other(reason),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_listing_can_be_swapped() {
        let lister = InMemoryResourceLister::new(ResourceScope::gateway_classes(), ["a", "b"]);
        assert_eq!(lister.list().await.unwrap(), vec!["a", "b"]);

        lister.fail_with("apiserver down");
        let err = lister.list().await.unwrap_err();
        assert_matches!(err, Error::UpstreamUnavailable { ref resource, .. }
            if resource == "gatewayclasses.gateway.networking.k8s.io/v1");

        lister.set_names(Vec::<String>::new());
        assert!(lister.list().await.unwrap().is_empty());
        assert_eq!(lister.calls(), 3);
    }
}
