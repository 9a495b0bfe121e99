//! Incremental aggregation, one episode at a time

use crate::combine::aggregate_feature_stats;
use crate::validate::validate_feature;
use episode_core::{DatasetStatistics, EpisodeStatistics, Error, Result};
use tracing::trace;

/// Folds episode statistics into running dataset statistics
///
/// Useful when episodes are recorded or converted one after another and the
/// per-episode statistics are not all kept around. Each pushed episode is
/// merged pairwise into the running result; the count-weighted combination is
/// associative, so [`finish`](Self::finish) matches
/// [`aggregate_stats`](crate::aggregate_stats) over the same episodes up to
/// floating-point summation order.
///
/// # Examples
///
/// ```rust
/// use episode_aggregate::StatsAccumulator;
/// use episode_core::{EpisodeStatistics, FeatureStatistics};
/// use ndarray::arr1;
/// use std::collections::BTreeMap;
///
/// let episode = |mean: f64| -> EpisodeStatistics {
///     let stats = FeatureStatistics {
///         min: arr1(&[mean]).into_dyn(),
///         max: arr1(&[mean]).into_dyn(),
///         mean: arr1(&[mean]).into_dyn(),
///         std: arr1(&[0.0]).into_dyn(),
///         count: 10,
///         quantiles: BTreeMap::new(),
///     };
///     [("reward".to_string(), stats)].into_iter().collect()
/// };
///
/// let mut acc = StatsAccumulator::new();
/// acc.push(&episode(1.0)).unwrap();
/// acc.push(&episode(3.0)).unwrap();
///
/// let stats = acc.finish();
/// assert_eq!(stats["reward"].count, 20);
/// assert_eq!(stats["reward"].mean[[0]], 2.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatsAccumulator {
    merged: DatasetStatistics,
    num_episodes: usize,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `episode` and merge it into the running statistics
    ///
    /// A rejected episode leaves the accumulator unchanged.
    pub fn push(&mut self, episode: &EpisodeStatistics) -> Result<()> {
        for (feature, stats) in episode {
            validate_feature(feature, stats)?;
            if let Some(current) = self.merged.get(feature) {
                if current.shape() != stats.shape() {
                    return Err(Error::shape_mismatch(
                        feature,
                        "mean",
                        current.shape(),
                        stats.shape(),
                    ));
                }
            }
        }

        let mut updates = Vec::with_capacity(episode.len());
        for (feature, stats) in episode {
            let merged = match self.merged.get(feature) {
                Some(current) => aggregate_feature_stats(feature, [current, stats])?,
                None => stats.clone(),
            };
            updates.push((feature.clone(), merged));
        }
        self.merged.extend(updates);
        self.num_episodes += 1;
        trace!(episodes = self.num_episodes, features = self.merged.len(), "accumulated episode");
        Ok(())
    }

    /// Number of episodes merged so far
    pub fn num_episodes(&self) -> usize {
        self.num_episodes
    }

    pub fn is_empty(&self) -> bool {
        self.num_episodes == 0
    }

    /// Running statistics without consuming the accumulator
    pub fn current(&self) -> &DatasetStatistics {
        &self.merged
    }

    /// Final dataset statistics; empty if nothing was pushed
    pub fn finish(self) -> DatasetStatistics {
        self.merged
    }
}
