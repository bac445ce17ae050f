//! Metrics module
//!
//! The GatewayClass presence gauge and the synchronizer that refreshes it
//! from the cluster on every scrape.

mod proptest;
mod series;
mod synchronizer;

pub use series::{MetricSeries, INFO_METRIC_HELP, INFO_METRIC_NAME, NAME_LABEL, PRESENT};
pub use synchronizer::{MetricsSynchronizer, SyncReport};
