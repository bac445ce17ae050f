//! Metric Synchronizer
//!
//! Refreshes the [`MetricSeries`] from a [`ResourceLister`] on demand.
//! Whole cycles are serialized: two concurrent scrapes never interleave
//! their listings and replacements.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::domain::ports::ResourceLister;
use crate::error::Result;
use crate::metrics::series::MetricSeries;

/// Outcome of a successful sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Names returned by the lister, duplicates included
    pub listed: usize,
    /// Distinct series exposed afterwards
    pub series: usize,
    /// Wall time of the cycle
    pub elapsed: Duration,
}

/// Keeps the metric series equal to the latest successful listing.
pub struct MetricsSynchronizer {
    lister: Arc<dyn ResourceLister>,
    series: Arc<MetricSeries>,
    cycle: Mutex<()>,
}

impl MetricsSynchronizer {
    /// Create a synchronizer writing into `series`.
    pub fn new(lister: Arc<dyn ResourceLister>, series: Arc<MetricSeries>) -> Self {
        Self {
            lister,
            series,
            cycle: Mutex::new(()),
        }
    }

    /// The series this synchronizer maintains.
    pub fn series(&self) -> &Arc<MetricSeries> {
        &self.series
    }

    /// Run one list-then-replace cycle.
    ///
    /// On a listing failure the series keeps its previous contents and the
    /// error is returned to the caller.
    #[instrument(skip(self), fields(resource = %self.lister.scope()))]
    pub async fn sync(&self) -> Result<SyncReport> {
        let _cycle = self.cycle.lock().await;
        let started = Instant::now();

        let names = match self.lister.list().await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "Listing failed, keeping previous series");
                return Err(e);
            }
        };

        self.series.replace(&names);

        let report = SyncReport {
            listed: names.len(),
            series: self.series.len(),
            elapsed: started.elapsed(),
        };
        debug!(
            listed = report.listed,
            series = report.series,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Metric series synchronized"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for MetricsSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsSynchronizer")
            .field("scope", self.lister.scope())
            .field("series", &self.series.len())
            .finish()
    }
}
