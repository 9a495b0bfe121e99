//! Count-weighted merging of statistics
//!
//! Mean, standard deviation, min, max and count combine exactly: merging the
//! statistics of disjoint groups gives the statistics of their union, up to
//! floating-point rounding. Quantiles do not. A quantile of the union is not a
//! function of the groups' quantiles, so they are merged as a count-weighted
//! average. That average is a convex combination, so it always lies between
//! the smallest and largest contributing estimate (see [`quantile_bounds`]),
//! but it can be far from the true quantile of the union when groups have
//! very different distributions.

use crate::validate::assert_type_and_shape;
use episode_core::{DatasetStatistics, EpisodeStatistics, Error, FeatureStatistics, Result};
use ndarray::{ArrayD, IxDyn, Zip};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Merge the statistics of one feature across shards
///
/// `feature` only names the feature in errors. Every shard must share the
/// same tensor shape. Quantile labels are kept only when every shard reports
/// them.
///
/// # Examples
///
/// ```rust
/// use episode_aggregate::aggregate_feature_stats;
/// use episode_core::FeatureStatistics;
/// use ndarray::{arr1, ArrayD};
/// use std::collections::BTreeMap;
///
/// let shard = |mean: f64, std: f64, count: u64| FeatureStatistics {
///     min: arr1(&[mean - 1.0]).into_dyn(),
///     max: arr1(&[mean + 1.0]).into_dyn(),
///     mean: arr1(&[mean]).into_dyn(),
///     std: arr1(&[std]).into_dyn(),
///     count,
///     quantiles: BTreeMap::new(),
/// };
///
/// let merged = aggregate_feature_stats("action", [&shard(2.0, 0.5, 10), &shard(4.0, 0.5, 30)]).unwrap();
/// assert_eq!(merged.count, 40);
/// assert_eq!(merged.mean[[0]], 3.5);
/// ```
pub fn aggregate_feature_stats<'a, I>(feature: &str, shards: I) -> Result<FeatureStatistics>
where
    I: IntoIterator<Item = &'a FeatureStatistics>,
{
    let shards: Vec<&FeatureStatistics> = shards.into_iter().collect();
    let Some(first) = shards.first() else {
        return Err(Error::InsufficientSamples {
            expected: 1,
            actual: 0,
        });
    };
    let shape = first.shape().to_vec();
    for shard in &shards {
        shard.check_consistent_shapes(feature)?;
        if shard.shape() != shape.as_slice() {
            return Err(Error::shape_mismatch(feature, "mean", &shape, shard.shape()));
        }
    }

    let total: u64 = shards.iter().map(|s| s.count).sum();
    if total == 0 {
        return Err(Error::type_mismatch(
            feature,
            "count",
            "total count across shards is zero",
        ));
    }
    let total_f = total as f64;

    let weighted_average = |select: &dyn Fn(&FeatureStatistics) -> &ArrayD<f64>| {
        let mut acc = ArrayD::<f64>::zeros(IxDyn(&shape));
        for &shard in &shards {
            acc.scaled_add(shard.count as f64, select(shard));
        }
        acc / total_f
    };

    let mean = weighted_average(&|s| &s.mean);

    // Pooled variance: within-shard variance plus spread of the shard means
    let mut pooled = ArrayD::<f64>::zeros(IxDyn(&shape));
    for shard in &shards {
        let weight = shard.count as f64;
        Zip::from(&mut pooled)
            .and(&shard.std)
            .and(&shard.mean)
            .and(&mean)
            .for_each(|acc, &std, &m, &pooled_mean| {
                let delta = m - pooled_mean;
                *acc += weight * (std * std + delta * delta);
            });
    }
    let std = pooled.mapv(|v| (v / total_f).max(0.0).sqrt());

    let mut min = first.min.clone();
    let mut max = first.max.clone();
    for shard in &shards[1..] {
        Zip::from(&mut min)
            .and(&shard.min)
            .for_each(|acc, &v| *acc = acc.min(v));
        Zip::from(&mut max)
            .and(&shard.max)
            .for_each(|acc, &v| *acc = acc.max(v));
    }

    let mut quantiles = BTreeMap::new();
    for label in shared_quantile_labels(&shards) {
        let estimate = weighted_average(&|s| &s.quantiles[label]);
        quantiles.insert(label.to_string(), estimate);
    }

    Ok(FeatureStatistics {
        min,
        max,
        mean,
        std,
        count: total,
        quantiles,
    })
}

/// Merge per-episode statistics into dataset statistics
///
/// The result covers the union of feature names. Each feature is merged over
/// the shards that report it. All shards are validated before any numbers are
/// combined.
pub fn aggregate_stats(shards: &[EpisodeStatistics]) -> Result<DatasetStatistics> {
    assert_type_and_shape(shards)?;

    let features: BTreeSet<&str> = shards
        .iter()
        .flat_map(|shard| shard.keys().map(String::as_str))
        .collect();
    debug!(shards = shards.len(), features = features.len(), "aggregating statistics");

    let merge = |feature: &&str| -> Result<(String, FeatureStatistics)> {
        let reporting = shards.iter().filter_map(|shard| shard.get(*feature));
        Ok((feature.to_string(), aggregate_feature_stats(feature, reporting)?))
    };

    #[cfg(feature = "parallel")]
    let merged = features.par_iter().map(merge).collect();
    #[cfg(not(feature = "parallel"))]
    let merged = features.iter().map(merge).collect();

    merged
}

/// Range every merged quantile estimate is guaranteed to fall in
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileBounds {
    /// Elementwise smallest estimate among the shards
    pub lower: ArrayD<f64>,
    /// Elementwise largest estimate among the shards
    pub upper: ArrayD<f64>,
}

impl QuantileBounds {
    /// Whether `estimate` lies within the bounds, with absolute tolerance `tol`
    pub fn contains(&self, estimate: &ArrayD<f64>, tol: f64) -> bool {
        estimate.shape() == self.lower.shape()
            && Zip::from(estimate)
                .and(&self.lower)
                .and(&self.upper)
                .all(|&v, &lo, &hi| v >= lo - tol && v <= hi + tol)
    }

    /// Elementwise width of the interval
    pub fn width(&self) -> ArrayD<f64> {
        &self.upper - &self.lower
    }
}

/// Interval spanned by the shards' estimates, per quantile label
///
/// Only labels reported by every shard are included, matching
/// [`aggregate_feature_stats`].
pub fn quantile_bounds<'a, I>(feature: &str, shards: I) -> Result<BTreeMap<String, QuantileBounds>>
where
    I: IntoIterator<Item = &'a FeatureStatistics>,
{
    let shards: Vec<&FeatureStatistics> = shards.into_iter().collect();
    let mut bounds = BTreeMap::new();
    for label in shared_quantile_labels(&shards) {
        let mut estimates = shards.iter().map(|s| &s.quantiles[label]);
        let Some(first) = estimates.next() else {
            continue;
        };
        let mut lower = first.clone();
        let mut upper = first.clone();
        for estimate in estimates {
            if estimate.shape() != lower.shape() {
                return Err(Error::shape_mismatch(feature, label, lower.shape(), estimate.shape()));
            }
            Zip::from(&mut lower)
                .and(&mut upper)
                .and(estimate)
                .for_each(|lo, hi, &v| {
                    *lo = lo.min(v);
                    *hi = hi.max(v);
                });
        }
        bounds.insert(label.to_string(), QuantileBounds { lower, upper });
    }
    Ok(bounds)
}

/// Quantile labels present in every shard
fn shared_quantile_labels<'s>(shards: &[&'s FeatureStatistics]) -> Vec<&'s str> {
    let Some(first) = shards.first() else {
        return Vec::new();
    };
    first
        .quantiles
        .keys()
        .filter(|label| shards.iter().all(|s| s.quantiles.contains_key(*label)))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    fn shard(mean: f64, std: f64, count: u64, q50: f64) -> FeatureStatistics {
        FeatureStatistics {
            min: arr1(&[mean - 2.0 * std]).into_dyn(),
            max: arr1(&[mean + 2.0 * std]).into_dyn(),
            mean: arr1(&[mean]).into_dyn(),
            std: arr1(&[std]).into_dyn(),
            count,
            quantiles: [("q50".to_string(), arr1(&[q50]).into_dyn())]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn test_weighted_mean_and_pooled_variance() {
        let a = shard(2.0, 1.0, 10, 2.0);
        let b = shard(4.0, 2.0, 30, 4.5);
        let merged = aggregate_feature_stats("x", [&a, &b]).unwrap();

        assert_eq!(merged.count, 40);
        assert_relative_eq!(merged.mean[[0]], 3.5, epsilon = 1e-12);

        // (10 * (1 + 1.5^2) + 30 * (4 + 0.5^2)) / 40
        let expected_var = (10.0 * (1.0 + 2.25) + 30.0 * (4.0 + 0.25)) / 40.0;
        assert_relative_eq!(merged.std[[0]], f64::sqrt(expected_var), epsilon = 1e-12);

        assert_eq!(merged.min[[0]], 0.0);
        assert_eq!(merged.max[[0]], 8.0);
        assert_relative_eq!(merged.quantiles["q50"][[0]], 0.25 * 2.0 + 0.75 * 4.5, epsilon = 1e-12);
    }

    #[test]
    fn test_single_shard_is_identity() {
        let a = shard(-1.5, 0.25, 7, -1.4);
        let merged = aggregate_feature_stats("x", [&a]).unwrap();
        assert_eq!(merged.count, a.count);
        assert_relative_eq!(merged.mean[[0]], a.mean[[0]], epsilon = 1e-12);
        assert_relative_eq!(merged.std[[0]], a.std[[0]], epsilon = 1e-12);
        assert_eq!(merged.min, a.min);
        assert_eq!(merged.max, a.max);
    }

    #[test]
    fn test_quantiles_kept_only_when_shared() {
        let a = shard(0.0, 1.0, 5, 0.0);
        let mut b = shard(1.0, 1.0, 5, 1.0);
        b.quantiles.insert("q90".into(), arr1(&[2.0]).into_dyn());

        let merged = aggregate_feature_stats("x", [&a, &b]).unwrap();
        assert!(merged.quantiles.contains_key("q50"));
        assert!(!merged.quantiles.contains_key("q90"));
    }

    #[test]
    fn test_empty_and_mismatched_shards_rejected() {
        let none: [&FeatureStatistics; 0] = [];
        assert!(matches!(
            aggregate_feature_stats("x", none),
            Err(Error::InsufficientSamples { .. })
        ));

        let a = shard(0.0, 1.0, 5, 0.0);
        let mut b = shard(0.0, 1.0, 5, 0.0);
        b.mean = arr1(&[0.0, 1.0]).into_dyn();
        assert!(matches!(
            aggregate_feature_stats("x", [&a, &b]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_union_of_features() {
        let ep1: EpisodeStatistics = [
            ("action".to_string(), shard(1.0, 1.0, 10, 1.0)),
            ("state".to_string(), shard(5.0, 1.0, 10, 5.0)),
        ]
        .into_iter()
        .collect();
        let ep2: EpisodeStatistics = [("action".to_string(), shard(3.0, 1.0, 10, 3.0))]
            .into_iter()
            .collect();

        let merged = aggregate_stats(&[ep1, ep2]).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["action"].count, 20);
        assert_relative_eq!(merged["action"].mean[[0]], 2.0, epsilon = 1e-12);
        // Only the first episode reports "state"
        assert_eq!(merged["state"].count, 10);
        assert_relative_eq!(merged["state"].mean[[0]], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_aggregate_of_nothing_is_empty() {
        assert!(aggregate_stats(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_quantile_bounds_contain_merged_estimate() {
        let shards = [shard(0.0, 1.0, 3, -0.2), shard(2.0, 1.0, 9, 2.4), shard(1.0, 1.0, 1, 0.9)];
        let merged = aggregate_feature_stats("x", &shards).unwrap();
        let bounds = quantile_bounds("x", &shards).unwrap();

        let q50 = &bounds["q50"];
        assert_eq!(q50.lower[[0]], -0.2);
        assert_eq!(q50.upper[[0]], 2.4);
        assert_relative_eq!(q50.width()[[0]], 2.6, epsilon = 1e-12);
        assert!(q50.contains(&merged.quantiles["q50"], 0.0));
        assert!(!q50.contains(&arr1(&[3.0]).into_dyn(), 1e-9));
    }
}
