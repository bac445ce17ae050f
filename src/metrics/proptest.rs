//! Property-Based Tests for Metric Synchronization
//!
//! # Test Properties
//!
//! 1. **Snapshot Equivalence**: after a successful sync the exposed names are
//!    exactly the distinct listed names
//! 2. **Idempotence**: syncing an unchanged listing twice yields the same series
//! 3. **Removal**: names missing from the next listing disappear
//! 4. **Failure Preservation**: a failed listing leaves the series untouched

#![cfg(test)]

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use super::series::MetricSeries;
use super::synchronizer::MetricsSynchronizer;
use crate::adapters::InMemoryResourceLister;
use crate::domain::ResourceScope;

// =============================================================================
// Property Strategies
// =============================================================================

/// DNS-1123 style resource names, small alphabet so duplicates are common.
fn name_strategy() -> impl Strategy<Value = String> {
    "[a-e][a-e0-9-]{0,3}"
}

fn listing_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(name_strategy(), 0..16)
}

fn setup(names: &[String]) -> (Arc<InMemoryResourceLister>, MetricsSynchronizer) {
    let lister = Arc::new(InMemoryResourceLister::new(
        ResourceScope::gateway_classes(),
        names.iter().cloned(),
    ));
    let series = Arc::new(MetricSeries::new().expect("series"));
    let sync = MetricsSynchronizer::new(lister.clone(), series);
    (lister, sync)
}

fn distinct(names: &[String]) -> BTreeSet<String> {
    names.iter().cloned().collect()
}

fn rendered_names(series: &MetricSeries) -> BTreeSet<String> {
    series
        .render()
        .expect("render")
        .lines()
        .filter(|l| !l.starts_with('#'))
        .filter_map(|l| l.split('"').nth(1))
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Synchronization Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: the exposed series equals the set of distinct listed names.
    #[test]
    fn prop_snapshot_equivalence(
        previous in listing_strategy(),
        current in listing_strategy(),
    ) {
        let (lister, sync) = setup(&previous);
        tokio_test::block_on(sync.sync())?;

        lister.set_names(current.clone());
        tokio_test::block_on(sync.sync())?;

        prop_assert_eq!(sync.series().names(), distinct(&current));
        prop_assert_eq!(rendered_names(sync.series()), distinct(&current));
    }

    /// Property: syncing an unchanged listing twice is a no-op.
    #[test]
    fn prop_idempotent(listing in listing_strategy()) {
        let (_, sync) = setup(&listing);

        tokio_test::block_on(sync.sync())?;
        let first = sync.series().render()?;
        tokio_test::block_on(sync.sync())?;
        let second = sync.series().render()?;

        prop_assert_eq!(first, second);
    }

    /// Property: a name absent from the next listing is no longer exposed.
    #[test]
    fn prop_removal(
        listing in listing_strategy(),
        removed in name_strategy(),
    ) {
        let mut previous = listing.clone();
        previous.push(removed.clone());
        let (lister, sync) = setup(&previous);
        tokio_test::block_on(sync.sync())?;
        prop_assert!(sync.series().contains(&removed));

        let next: Vec<String> = listing.into_iter().filter(|n| *n != removed).collect();
        lister.set_names(next);
        tokio_test::block_on(sync.sync())?;

        prop_assert!(!sync.series().contains(&removed));
        prop_assert!(!rendered_names(sync.series()).contains(&removed));
    }

    /// Property: a failed listing keeps the last good series.
    #[test]
    fn prop_failure_preserves_series(listing in listing_strategy()) {
        let (lister, sync) = setup(&listing);
        tokio_test::block_on(sync.sync())?;
        let before = sync.series().render()?;

        lister.fail_with("apiserver unreachable");
        prop_assert!(tokio_test::block_on(sync.sync()).is_err());

        prop_assert_eq!(sync.series().render()?, before);
        prop_assert_eq!(sync.series().names(), distinct(&listing));
    }
}
