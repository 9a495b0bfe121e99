//! # Episode Stats
//!
//! Streaming per-feature statistics for robot demonstration datasets, and
//! their aggregation into dataset-wide statistics.
//!
//! Each episode is summarized on its own: numeric features are reduced over
//! their samples, image and video features over a bounded sample of frames.
//! Summaries carry min, max, mean, std, count and histogram-based quantile
//! estimates, and merge into dataset statistics with exact moments and
//! approximate quantiles.
//!
//! ## Crates
//!
//! - [`episode_core`]: error type, statistics record, configuration
//! - [`episode_histogram`]: the single-pass quantile estimator
//! - [`episode_frames`]: frame sampling, loading and downsampling
//! - [`episode_features`]: per-feature dispatch and episode statistics
//! - [`episode_aggregate`]: validation and merging of episode statistics
//!
//! ## Quick Start
//!
//! ```rust
//! use episode_stats::prelude::*;
//! use ndarray::array;
//!
//! let mut schema = FeatureSchema::new();
//! schema.insert("observation.state".into(), FeatureSpec::new("float32", vec![2]));
//!
//! let mut episode = EpisodeData::new();
//! episode.insert(
//!     "observation.state".into(),
//!     FeatureData::from(array![[0.0, 1.0], [0.5, 1.5], [1.0, 2.0]].into_dyn()),
//! );
//!
//! let stats = compute_episode_stats(&episode, &schema, &ImageFileLoader, &StatsConfig::default()).unwrap();
//! let dataset = aggregate_stats(&[stats.clone(), stats]).unwrap();
//!
//! assert_eq!(dataset["observation.state"].count, 6);
//! ```

pub mod pipeline;

// Re-export all workspace crates
pub use episode_aggregate;
pub use episode_core;
pub use episode_features;
pub use episode_frames;
pub use episode_histogram;

pub use episode_aggregate::{
    aggregate_feature_stats, aggregate_stats, flatten_stats, quantile_bounds, unflatten_stats,
    StatsAccumulator,
};
pub use episode_core::{
    DatasetStatistics, EpisodeStatistics, Error, FeatureStatistics, QuantileSet, Result,
    StatsConfig,
};
pub use episode_features::{compute_episode_stats, get_feature_stats, ReductionAxis};
pub use episode_frames::{estimate_num_samples, sample_indices, FrameLoader, ImageFileLoader};
pub use episode_histogram::RunningQuantileStats;
pub use pipeline::{compute_all_episode_stats, compute_dataset_stats};

/// Prelude module for convenient imports
pub mod prelude {
    pub use episode_core::prelude::*;
    pub use episode_core::{DownsampleConfig, HistogramRange, SampleBudget};

    pub use episode_aggregate::{aggregate_feature_stats, aggregate_stats, StatsAccumulator};
    pub use episode_features::{
        compute_episode_stats, get_feature_stats, EpisodeData, FeatureData, FeatureKind,
        FeatureSchema, FeatureSpec, ReductionAxis,
    };
    pub use episode_frames::{FrameLoader, ImageFileLoader};
    pub use episode_histogram::RunningQuantileStats;

    pub use crate::pipeline::{compute_all_episode_stats, compute_dataset_stats};
}
