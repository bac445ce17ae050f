//! GatewayClass Exporter
//!
//! Publishes the Gateway API GatewayClasses present in a Kubernetes cluster
//! as the Prometheus gauge `gatewayapi_gatewayclass_info{name="..."} 1`.
//!
//! # Architecture
//!
//! ```text
//! scrape ─▶ ScrapeHandler ─▶ MetricsSynchronizer ─▶ ResourceLister ─▶ API server
//!                 │                    │
//!                 └──── render ◀── MetricSeries
//! ```
//!
//! The series is refreshed on every scrape; there is no background polling.
//! A failed listing keeps the previous series so the exporter stays
//! scrapeable during API server outages.
//!
//! # Modules
//!
//! - [`adapters`] - Kubernetes and in-memory listers, client bootstrap
//! - [`domain`] - Resource scope and the lister port
//! - [`error`] - Error types
//! - [`metrics`] - Metric series and synchronizer
//! - [`server`] - HTTP scrape endpoint and graceful shutdown

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod server;

// Re-export commonly used types
pub use adapters::{InMemoryResourceLister, KubernetesResourceLister};
pub use domain::{ResourceLister, ResourceScope};
pub use error::{Error, Result};
pub use metrics::{MetricSeries, MetricsSynchronizer, SyncReport};
pub use server::{MetricsServer, ScrapeHandler};
