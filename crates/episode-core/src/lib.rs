//! Core types for episode statistics
//!
//! This crate provides the pieces shared by every stage of the statistics
//! engine: the error taxonomy, the per-feature statistics record, the set
//! of requested quantiles and the engine configuration.
//!
//! # Architecture Overview
//!
//! The engine is organized leaf-first:
//!
//! 1. **Sampling** (`episode-frames`) - bounded frame selection and loading
//! 2. **Estimation** (`episode-histogram`) - single-pass moments and adaptive histograms
//! 3. **Dispatch** (`episode-features`) - per-feature reshaping and episode statistics
//! 4. **Aggregation** (`episode-aggregate`) - exact mean/variance merge across shards
//!
//! # Example
//!
//! ```rust
//! use episode_core::{QuantileSet, StatsConfig};
//!
//! let config = StatsConfig::default()
//!     .with_quantiles(QuantileSet::new(vec![0.25, 0.5, 0.75]).unwrap())
//!     .with_num_quantile_bins(1000);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.quantiles.labels(), vec!["q25", "q50", "q75"]);
//! ```

pub mod config;
pub mod error;
pub mod quantiles;
pub mod stats;
pub mod utils;

// Re-export core types
pub use error::{Error, Result};

pub use config::{
    DownsampleConfig, HistogramRange, SampleBudget, StatsConfig, DEFAULT_NUM_QUANTILE_BINS,
};
pub use quantiles::{is_quantile_label, quantile_label, QuantileSet, DEFAULT_QUANTILES};
pub use stats::{DatasetStatistics, EpisodeStatistics, FeatureStatistics};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        DatasetStatistics, EpisodeStatistics, Error, FeatureStatistics, QuantileSet, Result,
        StatsConfig,
    };
}
