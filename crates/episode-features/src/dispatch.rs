//! Statistics of one feature array along a reduction axis

use crate::axis::ReductionAxis;
use episode_core::utils::{column_max, column_mean, column_min, column_std};
use episode_core::{Error, FeatureStatistics, Result, StatsConfig};
use episode_histogram::RunningQuantileStats;
use ndarray::{Array2, ArrayViewD};
use num_traits::AsPrimitive;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Compute min, max, mean, std, count and quantiles of `array` along `axis`
///
/// The input is laid out as `(rows, width)` according to `axis`, run through a
/// fresh [`RunningQuantileStats`], and every tensor is shaped back following
/// numpy's reduction conventions for that axis and `keepdims`. `count` is the
/// axis' sample count, not the number of rows.
///
/// With fewer than two rows there is nothing to build a histogram from, so the
/// moments are computed directly and every quantile is set to a copy of the
/// mean.
///
/// # Examples
///
/// ```rust
/// use episode_core::StatsConfig;
/// use episode_features::{get_feature_stats, ReductionAxis};
/// use ndarray::array;
///
/// let data = array![[1.0], [2.0], [3.0], [4.0], [5.0]].into_dyn();
/// let stats = get_feature_stats(data.view(), ReductionAxis::Vector, false, &StatsConfig::default()).unwrap();
///
/// assert_eq!(stats.mean[[0]], 3.0);
/// assert_eq!(stats.count, 5);
/// assert!((stats.quantiles["q50"][[0]] - 3.0).abs() < 0.01);
/// ```
#[instrument(level = "debug", skip(array, config), fields(shape = ?array.shape()))]
pub fn get_feature_stats<T>(
    array: ArrayViewD<'_, T>,
    axis: ReductionAxis,
    keepdims: bool,
    config: &StatsConfig,
) -> Result<FeatureStatistics>
where
    T: AsPrimitive<f64>,
{
    let original_shape = array.shape().to_vec();
    let (rows, sample_count) = axis.prepare(array)?;

    let mut stats = if rows.nrows() < 2 {
        debug!(rows = rows.nrows(), "too few rows for a histogram, using basic statistics");
        basic_stats(&rows, config)?
    } else {
        let mut estimator = RunningQuantileStats::from_config(config)?;
        estimator.update(rows.view())?;
        estimator.into_statistics()?
    };
    stats.count = sample_count;

    stats.try_map_tensors(|value| axis.restore(value, keepdims, &original_shape))
}

/// Direct moments for batches too small for a histogram
fn basic_stats(rows: &Array2<f64>, config: &StatsConfig) -> Result<FeatureStatistics> {
    if rows.nrows() == 0 {
        return Err(Error::InsufficientSamples {
            expected: 1,
            actual: 0,
        });
    }
    if rows.iter().any(|v| !v.is_finite()) {
        return Err(Error::non_finite("feature array"));
    }

    let mean = column_mean(rows.view()).into_dyn();
    let quantiles: BTreeMap<_, _> = config
        .quantiles
        .labels()
        .into_iter()
        .map(|label| (label, mean.clone()))
        .collect();

    Ok(FeatureStatistics {
        min: column_min(rows.view()).into_dyn(),
        max: column_max(rows.view()).into_dyn(),
        std: column_std(rows.view()).into_dyn(),
        mean,
        count: rows.nrows() as u64,
        quantiles,
    })
}
