//! Single-pass running statistics with adaptive histograms
//!
//! [`RunningQuantileStats`] keeps, per output dimension, a running mean,
//! mean of squares, min, max and a fixed-bin-count histogram. Quantiles are
//! read back from the cumulative histogram with linear interpolation inside
//! the matching bin.
//!
//! An estimator belongs to exactly one shard: construct it, feed it any
//! number of batches, read its statistics, and drop it.

use crate::ops::{HistogramOps, OutOfRange};
use crate::types::DimensionHistogram;
use episode_core::utils::{column_max, column_mean, column_mean_of_squares, column_min, linspace};
use episode_core::{
    Error, FeatureStatistics, HistogramRange, QuantileSet, Result, StatsConfig,
    DEFAULT_NUM_QUANTILE_BINS,
};
use ndarray::{Array1, ArrayView2, ArrayViewD, Axis, Zip};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Padding around the first batch's extremes so they land strictly inside the outer bins
const INITIAL_EDGE_PADDING: f64 = 1e-10;

/// Relative padding applied to the range when edges are rebuilt
const REBIN_PADDING_FACTOR: f64 = 1e-10;

/// Running mean/variance/min/max and histogram quantiles over batches of vectors
///
/// # Example
///
/// ```rust
/// use episode_histogram::RunningQuantileStats;
/// use ndarray::array;
///
/// let mut stats = RunningQuantileStats::default();
/// stats.update(array![[1.0], [2.0], [3.0]].view()).unwrap();
/// stats.update(array![[4.0], [5.0]].view()).unwrap();
///
/// let result = stats.get_statistics().unwrap();
/// assert_eq!(result.count, 5);
/// assert!((result.mean[[0]] - 3.0).abs() < 1e-12);
/// assert!((result.quantiles["q50"][[0]] - 3.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct RunningQuantileStats {
    quantiles: QuantileSet,
    num_bins: usize,
    range: HistogramRange,
    state: Option<RunningState>,
}

/// State created by the first non-empty batch
#[derive(Debug, Clone)]
struct RunningState {
    count: u64,
    mean: Array1<f64>,
    mean_of_squares: Array1<f64>,
    min: Array1<f64>,
    max: Array1<f64>,
    histograms: Vec<DimensionHistogram>,
}

impl Default for RunningQuantileStats {
    fn default() -> Self {
        Self {
            quantiles: QuantileSet::default(),
            num_bins: DEFAULT_NUM_QUANTILE_BINS,
            range: HistogramRange::Adaptive,
            state: None,
        }
    }
}

impl RunningQuantileStats {
    /// Create an estimator with adaptive histograms of `num_bins` bins
    pub fn new(quantiles: QuantileSet, num_bins: usize) -> Result<Self> {
        if num_bins == 0 {
            return Err(Error::InvalidParameter(
                "num_quantile_bins must be positive".to_string(),
            ));
        }
        Ok(Self {
            quantiles,
            num_bins,
            range: HistogramRange::Adaptive,
            state: None,
        })
    }

    /// Create an estimator from the engine configuration
    pub fn from_config(config: &StatsConfig) -> Result<Self> {
        Self::new(config.quantiles.clone(), config.num_quantile_bins)?
            .with_range(config.histogram_range)
    }

    /// Choose how histogram edges are laid out
    ///
    /// With [`HistogramRange::Fixed`] the edges are built once over the given
    /// range and never rebuilt; samples outside it are counted in the outer
    /// bins. Must be called before the first batch.
    pub fn with_range(mut self, range: HistogramRange) -> Result<Self> {
        if self.state.is_some() {
            return Err(Error::InvalidParameter(
                "histogram range cannot change after the first batch".to_string(),
            ));
        }
        if let HistogramRange::Fixed { min, max } = range {
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(Error::InvalidParameter(format!(
                    "fixed histogram range [{min}, {max}] must be finite and non-empty"
                )));
            }
        }
        self.range = range;
        Ok(self)
    }

    /// Number of samples seen so far
    pub fn count(&self) -> u64 {
        self.state.as_ref().map_or(0, |s| s.count)
    }

    /// Feature width fixed by the first batch, if any
    pub fn width(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.mean.len())
    }

    /// Per-dimension histograms, once the first batch has been seen
    pub fn histograms(&self) -> Option<&[DimensionHistogram]> {
        self.state.as_ref().map(|s| s.histograms.as_slice())
    }

    /// Update the running statistics with a `(N, D)` batch
    ///
    /// Every batch after the first must have the same width `D`.
    /// An empty batch leaves the estimator unchanged.
    ///
    /// With adaptive ranges only the dimensions whose min or max grew are
    /// re-binned; the others keep their edges. Quantiles can therefore differ
    /// slightly from statistics built by re-binning every dimension at once.
    pub fn update(&mut self, batch: ArrayView2<'_, f64>) -> Result<()> {
        let (num_rows, width) = batch.dim();
        if width == 0 {
            return Err(Error::InvalidInput(
                "batch must have at least one column".to_string(),
            ));
        }
        if let Some(expected) = self.width() {
            if expected != width {
                return Err(Error::DimensionMismatch {
                    expected,
                    actual: width,
                });
            }
        }
        if num_rows == 0 {
            return Ok(());
        }
        if batch.iter().any(|x| !x.is_finite()) {
            return Err(Error::non_finite("batch"));
        }

        let batch_min = column_min(batch);
        let batch_max = column_max(batch);

        let policy = match self.range {
            HistogramRange::Adaptive => OutOfRange::Drop,
            HistogramRange::Fixed { .. } => OutOfRange::Clamp,
        };

        match self.state.as_mut() {
            None => {
                let histograms = (0..width)
                    .map(|d| match self.range {
                        HistogramRange::Adaptive => DimensionHistogram::spanning(
                            batch_min[d] - INITIAL_EDGE_PADDING,
                            batch_max[d] + INITIAL_EDGE_PADDING,
                            self.num_bins,
                        ),
                        HistogramRange::Fixed { min, max } => {
                            DimensionHistogram::spanning(min, max, self.num_bins)
                        }
                    })
                    .collect();
                debug!(width, num_bins = self.num_bins, "initialized running histograms");
                self.state = Some(RunningState {
                    count: 0,
                    mean: column_mean(batch),
                    mean_of_squares: column_mean_of_squares(batch),
                    min: batch_min,
                    max: batch_max,
                    histograms,
                });
            }
            Some(state) => {
                let adaptive = self.range == HistogramRange::Adaptive;
                for d in 0..width {
                    let expanded = batch_min[d] < state.min[d] || batch_max[d] > state.max[d];
                    state.min[d] = state.min[d].min(batch_min[d]);
                    state.max[d] = state.max[d].max(batch_max[d]);
                    if expanded && adaptive {
                        state.rebin(d);
                    }
                }
            }
        }

        let state = match self.state.as_mut() {
            Some(state) => state,
            None => return Ok(()),
        };

        state.count += num_rows as u64;
        let weight = num_rows as f64 / state.count as f64;

        let batch_mean = column_mean(batch);
        let batch_mean_of_squares = column_mean_of_squares(batch);
        Zip::from(&mut state.mean)
            .and(&batch_mean)
            .for_each(|m, &b| *m += (b - *m) * weight);
        Zip::from(&mut state.mean_of_squares)
            .and(&batch_mean_of_squares)
            .for_each(|m, &b| *m += (b - *m) * weight);

        for (hist, column) in state.histograms.iter_mut().zip(batch.axis_iter(Axis(1))) {
            hist.accumulate(column.iter().copied(), policy);
        }

        Ok(())
    }

    /// Update with a tensor whose trailing axis is the feature width
    ///
    /// All leading axes are flattened into the sample axis.
    pub fn update_flattened(&mut self, batch: ArrayViewD<'_, f64>) -> Result<()> {
        let width = match batch.shape().last() {
            Some(&w) if w > 0 => w,
            _ => {
                return Err(Error::InvalidInput(
                    "batch must have a non-empty trailing dimension".to_string(),
                ))
            }
        };
        let rows = batch.len() / width;
        let standard = batch.as_standard_layout();
        let matrix = standard
            .view()
            .into_shape_with_order((rows, width))
            .map_err(|e| Error::InvalidInput(format!("cannot flatten batch: {e}")))?;
        self.update(matrix)
    }

    /// Compute the statistics of everything seen so far
    ///
    /// Requires at least two samples. Variance is `E[x²] - E[x]²`, clamped at
    /// zero to absorb floating-point cancellation.
    pub fn get_statistics(&self) -> Result<FeatureStatistics> {
        let state = match self.state.as_ref() {
            Some(state) if state.count >= 2 => state,
            _ => {
                return Err(Error::InsufficientSamples {
                    expected: 2,
                    actual: self.count() as usize,
                })
            }
        };

        let std = Zip::from(&state.mean_of_squares)
            .and(&state.mean)
            .map_collect(|&sq, &m| (sq - m * m).max(0.0).sqrt());

        let total = state.count as f64;
        let width = state.histograms.len();
        let mut estimates: Vec<Array1<f64>> = vec![Array1::zeros(width); self.quantiles.len()];
        for (d, hist) in state.histograms.iter().enumerate() {
            let cumulative = hist.cumulative();
            for (qi, &q) in self.quantiles.probabilities().iter().enumerate() {
                estimates[qi][d] = if q <= 0.0 {
                    hist.lower()
                } else if q >= 1.0 {
                    hist.upper()
                } else {
                    hist.value_at_count(&cumulative, q * total)
                };
            }
        }

        let quantiles: BTreeMap<String, _> = self
            .quantiles
            .labels()
            .into_iter()
            .zip(estimates)
            .map(|(label, values)| (label, values.into_dyn()))
            .collect();

        Ok(FeatureStatistics {
            min: state.min.clone().into_dyn(),
            max: state.max.clone().into_dyn(),
            mean: state.mean.clone().into_dyn(),
            std: std.into_dyn(),
            count: state.count,
            quantiles,
        })
    }

    /// Consume the estimator and return its statistics
    pub fn into_statistics(self) -> Result<FeatureStatistics> {
        self.get_statistics()
    }
}

impl RunningState {
    /// Rebuild dimension `d`'s edges over the current min/max and move the old counts over
    fn rebin(&mut self, d: usize) {
        let (min, max) = (self.min[d], self.max[d]);
        let padding = (max - min) * REBIN_PADDING_FACTOR;
        let num_bins = self.histograms[d].num_bins();
        let new_edges = linspace(min - padding, max + padding, num_bins + 1);
        trace!(dimension = d, min, max, "re-binning histogram");
        self.histograms[d] = self.histograms[d].redistribute(new_edges);
    }
}
