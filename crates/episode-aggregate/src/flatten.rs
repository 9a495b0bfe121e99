//! Flat `"<feature>/<stat>"` view of statistics
//!
//! Episode metadata records store statistics as a single flat mapping. Feature
//! names may contain dots but never slashes, so the last `/` separates the
//! feature from the statistic.

use crate::validate::validate_entries;
use episode_core::{DatasetStatistics, Error, FeatureStatistics, Result};
use ndarray::ArrayD;
use std::collections::BTreeMap;

/// Separator between feature name and statistic key
pub const KEY_SEPARATOR: char = '/';

/// Flatten statistics into `"<feature>/<stat>" -> tensor`
///
/// `count` is included as a `(1,)` tensor.
///
/// # Examples
///
/// ```rust
/// use episode_aggregate::flatten_stats;
/// use episode_core::{DatasetStatistics, FeatureStatistics};
/// use ndarray::arr1;
/// use std::collections::BTreeMap;
///
/// let mut stats = DatasetStatistics::new();
/// stats.insert("action".into(), FeatureStatistics {
///     min: arr1(&[0.0]).into_dyn(),
///     max: arr1(&[1.0]).into_dyn(),
///     mean: arr1(&[0.5]).into_dyn(),
///     std: arr1(&[0.1]).into_dyn(),
///     count: 12,
///     quantiles: BTreeMap::new(),
/// });
///
/// let flat = flatten_stats(&stats);
/// assert_eq!(flat["action/mean"][[0]], 0.5);
/// assert_eq!(flat["action/count"][[0]], 12.0);
/// ```
pub fn flatten_stats(stats: &DatasetStatistics) -> BTreeMap<String, ArrayD<f64>> {
    stats
        .iter()
        .flat_map(|(feature, feature_stats)| {
            feature_stats
                .to_entries()
                .into_iter()
                .map(move |(key, value)| (format!("{feature}{KEY_SEPARATOR}{key}"), value))
        })
        .collect()
}

/// Rebuild statistics from their flat view
///
/// Each feature's entries are validated like aggregation input before the
/// record is rebuilt.
pub fn unflatten_stats(flat: BTreeMap<String, ArrayD<f64>>) -> Result<DatasetStatistics> {
    let mut grouped: BTreeMap<String, BTreeMap<String, ArrayD<f64>>> = BTreeMap::new();
    for (key, value) in flat {
        let Some((feature, stat)) = key.rsplit_once(KEY_SEPARATOR) else {
            return Err(Error::InvalidInput(format!(
                "flattened key '{key}' has no '{KEY_SEPARATOR}' separator"
            )));
        };
        grouped
            .entry(feature.to_string())
            .or_default()
            .insert(stat.to_string(), value);
    }

    grouped
        .into_iter()
        .map(|(feature, entries)| {
            validate_entries(&feature, &entries)?;
            let stats = FeatureStatistics::from_entries(&feature, entries)?;
            Ok((feature, stats))
        })
        .collect()
}
