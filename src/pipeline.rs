//! Dataset-level statistics: every episode, then the merge

use episode_aggregate::aggregate_stats;
use episode_core::{DatasetStatistics, EpisodeStatistics, Result, StatsConfig};
use episode_features::{compute_episode_stats, EpisodeData, FeatureSchema};
use episode_frames::FrameLoader;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Compute the statistics of every episode independently
///
/// With the `parallel` feature episodes are processed on the rayon pool;
/// results keep the order of `episodes` either way. The first failing episode
/// aborts the whole computation with its error.
#[instrument(level = "debug", skip_all, fields(episodes = episodes.len()))]
pub fn compute_all_episode_stats<L>(
    episodes: &[EpisodeData],
    schema: &FeatureSchema,
    loader: &L,
    config: &StatsConfig,
) -> Result<Vec<EpisodeStatistics>>
where
    L: FrameLoader + Sync + ?Sized,
{
    config.validate()?;
    let per_episode = |episode: &EpisodeData| compute_episode_stats(episode, schema, loader, config);

    #[cfg(feature = "parallel")]
    let stats = episodes.par_iter().map(per_episode).collect();
    #[cfg(not(feature = "parallel"))]
    let stats = episodes.iter().map(per_episode).collect();

    stats
}

/// Compute per-episode statistics and merge them into dataset statistics
///
/// # Examples
///
/// ```rust
/// use episode_stats::prelude::*;
/// use ndarray::{array, Array3};
/// use std::path::Path;
///
/// let mut schema = FeatureSchema::new();
/// schema.insert("action".into(), FeatureSpec::new("float32", vec![1]));
///
/// let episodes: Vec<EpisodeData> = [array![1.0, 2.0, 3.0], array![4.0, 5.0]]
///     .into_iter()
///     .map(|values| -> EpisodeData {
///         [("action".to_string(), FeatureData::from(values.into_dyn()))]
///             .into_iter()
///             .collect()
///     })
///     .collect();
///
/// let loader = |_: &Path| -> Result<Array3<u8>> { Ok(Array3::zeros((3, 1, 1))) };
/// let stats = compute_dataset_stats(&episodes, &schema, &loader, &StatsConfig::default()).unwrap();
///
/// assert_eq!(stats["action"].count, 5);
/// assert!((stats["action"].mean[[0]] - 3.0).abs() < 1e-12);
/// ```
#[instrument(level = "debug", skip_all, fields(episodes = episodes.len()))]
pub fn compute_dataset_stats<L>(
    episodes: &[EpisodeData],
    schema: &FeatureSchema,
    loader: &L,
    config: &StatsConfig,
) -> Result<DatasetStatistics>
where
    L: FrameLoader + Sync + ?Sized,
{
    let episode_stats = compute_all_episode_stats(episodes, schema, loader, config)?;
    let dataset = aggregate_stats(&episode_stats)?;
    debug!(features = dataset.len(), "dataset statistics ready");
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use episode_core::{Error, SampleBudget};
    use episode_features::{FeatureData, FeatureSpec};
    use ndarray::{array, Array3};
    use std::path::{Path, PathBuf};

    fn loader(path: &Path) -> Result<Array3<u8>> {
        let shade = if path.starts_with("bright") { 200 } else { 20 };
        Ok(Array3::from_elem((3, 2, 2), shade))
    }

    fn schema() -> FeatureSchema {
        [
            ("observation.images.cam".to_string(), FeatureSpec::new("video", vec![2, 2, 3])),
            ("action".to_string(), FeatureSpec::new("float32", vec![2])),
        ]
        .into_iter()
        .collect()
    }

    fn episode(dir: &str, frames: usize, actions: ndarray::ArrayD<f64>) -> EpisodeData {
        let paths: Vec<PathBuf> = (0..frames).map(|i| Path::new(dir).join(format!("{i}.png"))).collect();
        [
            ("observation.images.cam".to_string(), FeatureData::Frames(paths)),
            ("action".to_string(), FeatureData::Array(actions)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_dataset_merges_episodes() {
        let episodes = vec![
            episode("dark", 3, array![[0.0, 1.0], [2.0, 3.0]].into_dyn()),
            episode("bright", 1, array![[4.0, 5.0], [6.0, 7.0]].into_dyn()),
        ];
        let stats = compute_dataset_stats(&episodes, &schema(), &loader, &StatsConfig::default()).unwrap();

        let image = &stats["observation.images.cam"];
        assert_eq!(image.count, 4);
        assert_eq!(image.shape(), &[3, 1, 1]);
        let expected = (3.0 * 20.0 + 200.0) / 4.0 / 255.0;
        assert!((image.mean[[0, 0, 0]] - expected).abs() < 1e-12);
        assert!((image.max[[1, 0, 0]] - 200.0 / 255.0).abs() < 1e-12);

        let action = &stats["action"];
        assert_eq!(action.count, 4);
        assert_eq!(action.mean.as_slice().unwrap(), &[3.0, 4.0]);
    }

    #[test]
    fn test_episode_order_preserved() {
        let episodes = vec![
            episode("dark", 2, array![[1.0, 1.0], [1.0, 1.0]].into_dyn()),
            episode("bright", 2, array![[9.0, 9.0], [9.0, 9.0]].into_dyn()),
        ];
        let per_episode =
            compute_all_episode_stats(&episodes, &schema(), &loader, &StatsConfig::default()).unwrap();
        assert_eq!(per_episode.len(), 2);
        assert_eq!(per_episode[0]["action"].mean[[0]], 1.0);
        assert_eq!(per_episode[1]["action"].mean[[0]], 9.0);
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let config = StatsConfig {
            sampling: SampleBudget {
                min_samples: 10,
                max_samples: 5,
                power: 0.75,
            },
            ..StatsConfig::default()
        };
        let result = compute_dataset_stats(&[], &schema(), &loader, &config);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_episode_error_aborts() {
        let mut bad = episode("dark", 2, array![[1.0, 1.0]].into_dyn());
        bad.insert("unknown".into(), FeatureData::Array(array![1.0].into_dyn()));
        let result = compute_dataset_stats(&[bad], &schema(), &loader, &StatsConfig::default());
        assert!(matches!(result, Err(Error::MissingFeature(_))));
    }
}
