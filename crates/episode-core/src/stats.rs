//! Per-feature statistics record and its dictionary view

use crate::error::{Error, Result};
use crate::quantiles::is_quantile_label;
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics of every feature in one episode, keyed by feature name
pub type EpisodeStatistics = BTreeMap<String, FeatureStatistics>;

/// Statistics of every feature across a dataset, keyed by feature name
pub type DatasetStatistics = BTreeMap<String, FeatureStatistics>;

/// Distributional statistics of one feature
///
/// `min`, `max`, `mean`, `std` and every quantile tensor share the
/// feature's per-dimension shape. `count` is the number of samples
/// (frames, rows or elements, depending on the reduction) behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStatistics {
    pub min: ArrayD<f64>,
    pub max: ArrayD<f64>,
    pub mean: ArrayD<f64>,
    pub std: ArrayD<f64>,
    pub count: u64,
    /// Quantile label (`q01`, `q50`, ...) to estimate
    pub quantiles: BTreeMap<String, ArrayD<f64>>,
}

impl FeatureStatistics {
    /// Shape shared by all tensors of this record
    pub fn shape(&self) -> &[usize] {
        self.mean.shape()
    }

    /// Look up a quantile estimate by label
    pub fn quantile(&self, label: &str) -> Option<&ArrayD<f64>> {
        self.quantiles.get(label)
    }

    /// Iterate every tensor-valued statistic with its key
    pub fn tensors(&self) -> impl Iterator<Item = (&str, &ArrayD<f64>)> {
        [
            ("min", &self.min),
            ("max", &self.max),
            ("mean", &self.mean),
            ("std", &self.std),
        ]
        .into_iter()
        .chain(self.quantiles.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Apply `f` to every tensor-valued statistic, leaving `count` alone
    pub fn try_map_tensors<F>(self, mut f: F) -> Result<Self>
    where
        F: FnMut(ArrayD<f64>) -> Result<ArrayD<f64>>,
    {
        let mut quantiles = BTreeMap::new();
        for (label, value) in self.quantiles {
            quantiles.insert(label, f(value)?);
        }
        Ok(Self {
            min: f(self.min)?,
            max: f(self.max)?,
            mean: f(self.mean)?,
            std: f(self.std)?,
            count: self.count,
            quantiles,
        })
    }

    /// Infallible variant of [`try_map_tensors`](Self::try_map_tensors)
    pub fn map_tensors<F>(self, mut f: F) -> Self
    where
        F: FnMut(ArrayD<f64>) -> ArrayD<f64>,
    {
        let quantiles = self
            .quantiles
            .into_iter()
            .map(|(label, value)| (label, f(value)))
            .collect();
        Self {
            min: f(self.min),
            max: f(self.max),
            mean: f(self.mean),
            std: f(self.std),
            count: self.count,
            quantiles,
        }
    }

    /// Dictionary view: statistic key to tensor, with `count` as a `(1,)` tensor
    pub fn to_entries(&self) -> BTreeMap<String, ArrayD<f64>> {
        let mut entries: BTreeMap<String, ArrayD<f64>> = self
            .tensors()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        entries.insert(
            "count".to_string(),
            ArrayD::from_elem(IxDyn(&[1]), self.count as f64),
        );
        entries
    }

    /// Rebuild a record from its dictionary view
    ///
    /// `feature` is only used to name the offending feature in errors.
    pub fn from_entries(feature: &str, mut entries: BTreeMap<String, ArrayD<f64>>) -> Result<Self> {
        let count = entries
            .remove("count")
            .ok_or_else(|| Error::InvalidInput(format!("feature '{feature}' has no 'count'")))?;
        let count = parse_count(feature, &count)?;

        let mut take = |key: &str| {
            entries
                .remove(key)
                .ok_or_else(|| Error::InvalidInput(format!("feature '{feature}' has no '{key}'")))
        };
        let min = take("min")?;
        let max = take("max")?;
        let mean = take("mean")?;
        let std = take("std")?;

        let mut quantiles = BTreeMap::new();
        for (key, value) in entries {
            if !is_quantile_label(&key) {
                return Err(Error::type_mismatch(feature, &key, "unknown statistic"));
            }
            quantiles.insert(key, value);
        }

        let stats = Self {
            min,
            max,
            mean,
            std,
            count,
            quantiles,
        };
        stats.check_consistent_shapes(feature)?;
        Ok(stats)
    }

    /// Ensure every tensor has rank at least one and the same shape as `mean`
    pub fn check_consistent_shapes(&self, feature: &str) -> Result<()> {
        let expected = self.shape();
        for (key, value) in self.tensors() {
            if value.ndim() == 0 {
                return Err(Error::shape_mismatch(feature, key, &[1], value.shape()));
            }
            if value.shape() != expected {
                return Err(Error::shape_mismatch(feature, key, expected, value.shape()));
            }
        }
        Ok(())
    }
}

fn parse_count(feature: &str, count: &ArrayD<f64>) -> Result<u64> {
    if count.shape() != [1] {
        return Err(Error::shape_mismatch(feature, "count", &[1], count.shape()));
    }
    let value = count.iter().copied().next().unwrap_or(f64::NAN);
    if !(value.is_finite() && value >= 1.0 && value.fract() == 0.0) {
        return Err(Error::type_mismatch(
            feature,
            "count",
            format!("must be a positive integer, got {value}"),
        ));
    }
    Ok(value as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    fn sample() -> FeatureStatistics {
        let mut quantiles = BTreeMap::new();
        quantiles.insert("q50".to_string(), arr1(&[2.0, 20.0]).into_dyn());
        FeatureStatistics {
            min: arr1(&[1.0, 10.0]).into_dyn(),
            max: arr1(&[3.0, 30.0]).into_dyn(),
            mean: arr1(&[2.0, 20.0]).into_dyn(),
            std: arr1(&[0.5, 5.0]).into_dyn(),
            count: 4,
            quantiles,
        }
    }

    #[test]
    fn test_entries_round_trip() {
        let stats = sample();
        let entries = stats.to_entries();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries["count"].shape(), &[1]);
        assert_eq!(entries["count"].as_slice().unwrap(), &[4.0]);

        let rebuilt = FeatureStatistics::from_entries("action", entries).unwrap();
        assert_eq!(rebuilt, stats);
    }

    #[test]
    fn test_from_entries_count_shape() {
        let mut entries = sample().to_entries();
        entries.insert("count".to_string(), arr1(&[4.0, 4.0]).into_dyn());
        let err = FeatureStatistics::from_entries("action", entries).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { ref key, .. } if key == "count"));
    }

    #[test]
    fn test_from_entries_count_type() {
        let mut entries = sample().to_entries();
        entries.insert("count".to_string(), arr1(&[2.5]).into_dyn());
        let err = FeatureStatistics::from_entries("action", entries).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));

        let mut entries = sample().to_entries();
        entries.insert("count".to_string(), arr1(&[0.0]).into_dyn());
        assert!(matches!(
            FeatureStatistics::from_entries("action", entries),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_from_entries_unknown_key() {
        let mut entries = sample().to_entries();
        entries.insert("median".to_string(), arr1(&[2.0, 20.0]).into_dyn());
        assert!(matches!(
            FeatureStatistics::from_entries("action", entries),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_from_entries_missing_key() {
        let mut entries = sample().to_entries();
        entries.remove("std");
        assert!(matches!(
            FeatureStatistics::from_entries("action", entries),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_entries_inconsistent_shape() {
        let mut entries = sample().to_entries();
        entries.insert("q50".to_string(), arr1(&[2.0]).into_dyn());
        let err = FeatureStatistics::from_entries("action", entries).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { ref key, .. } if key == "q50"));
    }

    #[test]
    fn test_map_tensors_keeps_count() {
        let scaled = sample().map_tensors(|t| t * 2.0);
        assert_eq!(scaled.count, 4);
        assert_eq!(scaled.mean, arr1(&[4.0, 40.0]).into_dyn());
        assert_eq!(scaled.quantiles["q50"], arr1(&[4.0, 40.0]).into_dyn());
    }
}
