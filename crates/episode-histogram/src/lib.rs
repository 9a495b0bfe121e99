//! Single-pass statistics with adaptive histograms
//!
//! This crate provides the online estimator behind every per-episode
//! statistic: running moments, exact min/max, and approximate quantiles read
//! from fixed-bin-count histograms whose edges follow the observed range.
//!
//! # Key Features
//!
//! - **Single pass**: batches are folded in as they arrive, nothing is retained
//! - **Adaptive edges**: histograms are rebuilt when the range expands, without rescanning data
//! - **Fixed edges**: optionally lay the bins out once over a known value range
//! - **Bounded cost**: re-binning is `O(num_bins)` per dimension
//!
//! # Examples
//!
//! ```rust
//! use episode_histogram::RunningQuantileStats;
//! use episode_core::QuantileSet;
//! use ndarray::array;
//!
//! let quantiles = QuantileSet::new(vec![0.1, 0.5, 0.9]).unwrap();
//! let mut stats = RunningQuantileStats::new(quantiles, 1000).unwrap();
//!
//! stats.update(array![[0.0, 10.0], [1.0, 11.0]].view()).unwrap();
//! stats.update(array![[2.0, 12.0], [3.0, 13.0]].view()).unwrap();
//!
//! let result = stats.get_statistics().unwrap();
//! assert_eq!(result.count, 4);
//! assert_eq!(result.shape(), &[2]);
//! assert!(result.quantiles["q10"][[0]] <= result.quantiles["q90"][[0]]);
//! ```

pub mod estimator;
pub mod ops;
pub mod types;

// Re-export main types and traits
pub use estimator::RunningQuantileStats;
pub use ops::{HistogramOps, OutOfRange};
pub use types::{DimensionHistogram, HistogramBin};

pub use episode_core::Result;
