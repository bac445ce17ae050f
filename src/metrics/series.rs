//! Metric Series
//!
//! Owns the `gatewayapi_gatewayclass_info` gauge and the registry it is
//! exposed from. Replacing the label set and rendering it take the same
//! lock, so a scrape never observes a partially repopulated series.

use std::collections::BTreeSet;

use parking_lot::RwLock;
use prometheus::{GaugeVec, Opts, Registry, TextEncoder};

use crate::error::Result;

/// Name of the info gauge
pub const INFO_METRIC_NAME: &str = "gatewayapi_gatewayclass_info";

/// Help text of the info gauge
pub const INFO_METRIC_HELP: &str = "Information about a GatewayClass";

/// Label carrying the resource name
pub const NAME_LABEL: &str = "name";

/// Value set for every present name
pub const PRESENT: f64 = 1.0;

/// Presence gauge keyed by resource name.
pub struct MetricSeries {
    registry: Registry,
    gauge: GaugeVec,
    names: RwLock<BTreeSet<String>>,
}

impl MetricSeries {
    /// Create an empty series on its own registry.
    pub fn new() -> Result<Self> {
        Self::with_opts(Opts::new(INFO_METRIC_NAME, INFO_METRIC_HELP))
    }

    /// Create an empty series with custom metric options.
    pub fn with_opts(opts: Opts) -> Result<Self> {
        let registry = Registry::new();
        let gauge = GaugeVec::new(opts, &[NAME_LABEL])?;
        registry.register(Box::new(gauge.clone()))?;

        Ok(Self {
            registry,
            gauge,
            names: RwLock::new(BTreeSet::new()),
        })
    }

    /// Replace the exposed label set with exactly `names`.
    ///
    /// Duplicates collapse into a single series.
    pub fn replace<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut current = self.names.write();
        self.gauge.reset();
        current.clear();

        for name in names {
            let name = name.as_ref();
            self.gauge.with_label_values(&[name]).set(PRESENT);
            current.insert(name.to_string());
        }
    }

    /// Names currently exposed.
    pub fn names(&self) -> BTreeSet<String> {
        self.names.read().clone()
    }

    /// Whether `name` is currently exposed.
    pub fn contains(&self, name: &str) -> bool {
        self.names.read().contains(name)
    }

    /// Number of exposed series.
    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    /// Returns true if no series is exposed.
    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }

    /// Render the registry in the text exposition format.
    pub fn render(&self) -> Result<String> {
        let _current = self.names.read();
        let families = self.registry.gather();

        let mut buffer = String::new();
        TextEncoder::new().encode_utf8(&families, &mut buffer)?;
        Ok(buffer)
    }
}

impl std::fmt::Debug for MetricSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricSeries")
            .field("names", &*self.names.read())
            .finish()
    }
}
