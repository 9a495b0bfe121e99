//! Dataset-wide statistics from per-episode statistics
//!
//! Episodes are summarized independently; this crate merges those summaries.
//!
//! # Key Features
//!
//! - **Validation first**: shards with inconsistent shapes or counts are
//!   rejected before any numbers are combined
//! - **Exact moments**: count-weighted mean and pooled variance reproduce the
//!   statistics of the concatenated data
//! - **Approximate quantiles**: count-weighted averages of the per-episode
//!   estimates, bounded by [`quantile_bounds`]
//! - **Incremental**: [`StatsAccumulator`] merges episodes as they arrive
//! - **Parallel**: with the `parallel` feature, features are merged on the rayon pool
//!
//! # Examples
//!
//! ```rust
//! use episode_aggregate::aggregate_stats;
//! use episode_core::{EpisodeStatistics, FeatureStatistics};
//! use ndarray::arr1;
//! use std::collections::BTreeMap;
//!
//! let episode = |mean: f64, count: u64| -> EpisodeStatistics {
//!     let stats = FeatureStatistics {
//!         min: arr1(&[mean - 1.0]).into_dyn(),
//!         max: arr1(&[mean + 1.0]).into_dyn(),
//!         mean: arr1(&[mean]).into_dyn(),
//!         std: arr1(&[1.0]).into_dyn(),
//!         count,
//!         quantiles: BTreeMap::new(),
//!     };
//!     [("observation.state".to_string(), stats)].into_iter().collect()
//! };
//!
//! let dataset = aggregate_stats(&[episode(2.0, 10), episode(4.0, 30)]).unwrap();
//! let state = &dataset["observation.state"];
//! assert_eq!(state.count, 40);
//! assert_eq!(state.mean[[0]], 3.5);
//! assert_eq!(state.min[[0]], 1.0);
//! assert_eq!(state.max[[0]], 5.0);
//! ```

pub mod accumulator;
pub mod combine;
pub mod flatten;
pub mod validate;

pub use accumulator::StatsAccumulator;
pub use combine::{aggregate_feature_stats, aggregate_stats, quantile_bounds, QuantileBounds};
pub use flatten::{flatten_stats, unflatten_stats};
pub use validate::{assert_type_and_shape, validate_entries, validate_feature};

pub use episode_core::Result;
