//! Core types for per-dimension histogram state

use episode_core::utils::linspace;

/// A single bin of a [`DimensionHistogram`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    /// Left edge of the bin (inclusive)
    pub left: f64,
    /// Right edge of the bin (exclusive, except for the last bin)
    pub right: f64,
    /// Number of values in this bin
    pub count: f64,
}

impl HistogramBin {
    /// Get the center point of the bin
    pub fn center(&self) -> f64 {
        (self.left + self.right) / 2.0
    }
}

/// Fixed-bin-count histogram over one output dimension
///
/// `edges` always has one more entry than `counts` and is non-decreasing.
/// Counts are stored as `f64` so redistributed and accumulated counts share
/// one representation with the cumulative sums used for quantile lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionHistogram {
    counts: Vec<f64>,
    edges: Vec<f64>,
}

impl DimensionHistogram {
    /// Create an empty histogram with `num_bins` equal-width bins over `[lo, hi]`
    pub fn spanning(lo: f64, hi: f64, num_bins: usize) -> Self {
        let num_bins = num_bins.max(1);
        Self {
            counts: vec![0.0; num_bins],
            edges: linspace(lo, hi, num_bins + 1),
        }
    }

    /// Assemble a histogram from existing counts and edges
    ///
    /// Returns `None` unless `edges.len() == counts.len() + 1` and there is at least one bin.
    pub fn from_parts(counts: Vec<f64>, edges: Vec<f64>) -> Option<Self> {
        if counts.is_empty() || edges.len() != counts.len() + 1 {
            return None;
        }
        Some(Self { counts, edges })
    }

    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    pub(crate) fn counts_mut(&mut self) -> &mut [f64] {
        &mut self.counts
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Lowest edge
    pub fn lower(&self) -> f64 {
        self.edges[0]
    }

    /// Highest edge
    pub fn upper(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Sum of all bin counts
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Iterate the bins from left to right
    pub fn bins(&self) -> impl Iterator<Item = HistogramBin> + '_ {
        self.counts.iter().enumerate().map(|(i, &count)| HistogramBin {
            left: self.edges[i],
            right: self.edges[i + 1],
            count,
        })
    }

    /// Running sum of the counts, one entry per bin
    pub fn cumulative(&self) -> Vec<f64> {
        self.counts
            .iter()
            .scan(0.0, |acc, &c| {
                *acc += c;
                Some(*acc)
            })
            .collect()
    }
}
