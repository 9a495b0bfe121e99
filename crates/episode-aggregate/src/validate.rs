//! Preconditions checked before any statistics are merged
//!
//! Shards that cannot be combined are rejected up front with
//! [`Error::ShapeMismatch`] or [`Error::TypeMismatch`], so aggregation never
//! mixes incompatible tensors.

use episode_core::{EpisodeStatistics, Error, FeatureStatistics, Result};
use ndarray::ArrayD;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Per-channel shape every statistic of an image feature must have
pub const IMAGE_STATS_SHAPE: [usize; 3] = [3, 1, 1];

/// Whether `feature` names an image or video stream
pub fn is_image_feature(feature: &str) -> bool {
    feature.contains("image")
}

/// Check one feature's statistics in isolation
///
/// Every tensor must have rank at least one and share `mean`'s shape, `count`
/// must be positive, and image features must be shaped `(3, 1, 1)`.
pub fn validate_feature(feature: &str, stats: &FeatureStatistics) -> Result<()> {
    stats.check_consistent_shapes(feature)?;
    if stats.count == 0 {
        return Err(Error::type_mismatch(
            feature,
            "count",
            "must be a positive integer, got 0",
        ));
    }
    if is_image_feature(feature) {
        for (key, value) in stats.tensors() {
            if value.shape() != IMAGE_STATS_SHAPE {
                return Err(Error::shape_mismatch(
                    feature,
                    key,
                    &IMAGE_STATS_SHAPE,
                    value.shape(),
                ));
            }
        }
    }
    Ok(())
}

/// Check one feature's statistics in dictionary form
///
/// Same rules as [`validate_feature`], expressed on the `key -> tensor` view:
/// `count` must be shaped `(1,)` and every other value must have rank at least
/// one.
pub fn validate_entries(feature: &str, entries: &BTreeMap<String, ArrayD<f64>>) -> Result<()> {
    for (key, value) in entries {
        if value.ndim() == 0 {
            return Err(Error::shape_mismatch(feature, key, &[1], value.shape()));
        }
        if key == "count" {
            if value.shape() != [1] {
                return Err(Error::shape_mismatch(feature, key, &[1], value.shape()));
            }
        } else if is_image_feature(feature) && value.shape() != IMAGE_STATS_SHAPE {
            return Err(Error::shape_mismatch(
                feature,
                key,
                &IMAGE_STATS_SHAPE,
                value.shape(),
            ));
        }
    }
    Ok(())
}

/// Check every shard, and that each feature has one shape across all shards
pub fn assert_type_and_shape(shards: &[EpisodeStatistics]) -> Result<()> {
    let mut shapes: BTreeMap<&str, &[usize]> = BTreeMap::new();
    for shard in shards {
        for (feature, stats) in shard {
            validate_feature(feature, stats)?;
            match shapes.entry(feature.as_str()) {
                Entry::Vacant(entry) => {
                    entry.insert(stats.shape());
                }
                Entry::Occupied(entry) => {
                    if *entry.get() != stats.shape() {
                        return Err(Error::shape_mismatch(
                            feature,
                            "mean",
                            entry.get(),
                            stats.shape(),
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}
