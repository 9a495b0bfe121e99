//! Configuration types for statistics computation
//!
//! Every tunable of the engine lives here as plain data. The structs
//! deserialize with defaults filled in, so a partial document such as
//! `{"num_quantile_bins": 1000}` is a complete configuration.

use crate::error::{Error, Result};
use crate::quantiles::QuantileSet;
use serde::{Deserialize, Serialize};

/// Default number of bins in each per-dimension histogram
pub const DEFAULT_NUM_QUANTILE_BINS: usize = 5000;

/// How the estimator chooses its histogram edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistogramRange {
    /// Edges follow the observed min/max and are rebuilt when the range expands
    Adaptive,
    /// Edges are built once over a known value range and never rebuilt
    Fixed { min: f64, max: f64 },
}

impl Default for HistogramRange {
    fn default() -> Self {
        Self::Adaptive
    }
}

/// Bounds on how many frames are sampled from an episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleBudget {
    pub min_samples: usize,
    pub max_samples: usize,
    /// Growth exponent; values below 1 grow sub-linearly with episode length
    pub power: f64,
}

impl Default for SampleBudget {
    fn default() -> Self {
        Self {
            min_samples: 100,
            max_samples: 10_000,
            power: 0.75,
        }
    }
}

impl SampleBudget {
    pub fn validate(&self) -> Result<()> {
        if self.min_samples > self.max_samples {
            return Err(Error::InvalidParameter(format!(
                "min_samples ({}) must not exceed max_samples ({})",
                self.min_samples, self.max_samples
            )));
        }
        if !(self.power.is_finite() && self.power > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "sampling power must be positive, got {}",
                self.power
            )));
        }
        Ok(())
    }
}

/// Strided downsampling of large frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownsampleConfig {
    /// Approximate size of the larger side after downsampling
    pub target_size: usize,
    /// Frames whose larger side is below this are left untouched
    pub threshold: usize,
}

impl Default for DownsampleConfig {
    fn default() -> Self {
        Self {
            target_size: 150,
            threshold: 300,
        }
    }
}

impl DownsampleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.target_size == 0 {
            return Err(Error::InvalidParameter(
                "downsample target_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Full configuration of the statistics engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub quantiles: QuantileSet,
    pub num_quantile_bins: usize,
    pub histogram_range: HistogramRange,
    pub sampling: SampleBudget,
    pub downsample: DownsampleConfig,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            quantiles: QuantileSet::default(),
            num_quantile_bins: DEFAULT_NUM_QUANTILE_BINS,
            histogram_range: HistogramRange::default(),
            sampling: SampleBudget::default(),
            downsample: DownsampleConfig::default(),
        }
    }
}

impl StatsConfig {
    /// Replace the requested quantiles
    pub fn with_quantiles(mut self, quantiles: QuantileSet) -> Self {
        self.quantiles = quantiles;
        self
    }

    /// Replace the histogram resolution
    pub fn with_num_quantile_bins(mut self, num_bins: usize) -> Self {
        self.num_quantile_bins = num_bins;
        self
    }

    /// Replace the histogram range policy
    pub fn with_histogram_range(mut self, range: HistogramRange) -> Self {
        self.histogram_range = range;
        self
    }

    /// Check every parameter for values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.num_quantile_bins == 0 {
            return Err(Error::InvalidParameter(
                "num_quantile_bins must be positive".to_string(),
            ));
        }
        if let HistogramRange::Fixed { min, max } = self.histogram_range {
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(Error::InvalidParameter(format!(
                    "fixed histogram range [{min}, {max}] must be finite and non-empty"
                )));
            }
        }
        self.sampling.validate()?;
        self.downsample.validate()
    }
}
