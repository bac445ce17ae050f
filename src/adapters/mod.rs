//! Infrastructure Adapters
//!
//! Implementations of the [`ResourceLister`](crate::domain::ResourceLister)
//! port.
//!
//! - [`KubernetesResourceLister`] lists objects through kube's dynamic API.
//! - [`InMemoryResourceLister`] serves a listing held in memory.
//!
//! # Usage
//!
//! ```ignore
//! use gatewayclass_exporter::adapters::{self, KubernetesResourceLister};
//! use gatewayclass_exporter::domain::{ResourceLister, ResourceScope};
//!
//! let client = adapters::connect(None, None).await?;
//! let lister = KubernetesResourceLister::new(client, ResourceScope::gateway_classes());
//! let names = lister.list().await?;
//! ```

mod in_memory;
mod kubernetes;

pub use in_memory::InMemoryResourceLister;
pub use kubernetes::{connect, explicit_config, resolve_config, KubernetesResourceLister};
