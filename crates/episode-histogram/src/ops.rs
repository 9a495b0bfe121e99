//! Operations on per-dimension histograms

use crate::types::DimensionHistogram;
use episode_core::utils::search_sorted_left;

/// How values outside the histogram edges are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRange {
    /// Values outside `[lower, upper]` are not counted
    Drop,
    /// Values below/above the edges are counted in the first/last bin
    Clamp,
}

/// Operations that can be performed on histograms
pub trait HistogramOps {
    /// Index of the bin holding `value`
    ///
    /// Bins are half-open `[e_i, e_{i+1})` except the last one, which also
    /// holds its right edge.
    fn bin_index(&self, value: f64, policy: OutOfRange) -> Option<usize>;

    /// Count every value into its bin
    fn accumulate<I>(&mut self, values: I, policy: OutOfRange)
    where
        I: IntoIterator<Item = f64>;

    /// Move the counts onto new edges without revisiting raw samples
    ///
    /// Each old bin's count is assigned whole to the new bin containing the
    /// old bin's center. This is an approximation that costs `O(num_bins)`.
    fn redistribute(&self, new_edges: Vec<f64>) -> DimensionHistogram;

    /// Value below which `target` of the counted samples fall
    fn value_at_count(&self, cumulative: &[f64], target: f64) -> f64;
}

impl HistogramOps for DimensionHistogram {
    fn bin_index(&self, value: f64, policy: OutOfRange) -> Option<usize> {
        let n = self.num_bins();
        let edges = self.edges();
        let (lower, upper) = (self.lower(), self.upper());

        if value < lower {
            return (policy == OutOfRange::Clamp).then_some(0);
        }
        if value > upper {
            return (policy == OutOfRange::Clamp).then_some(n - 1);
        }

        // Equal-width guess, then correct against the actual edges
        let span = upper - lower;
        let mut idx = if span > 0.0 {
            (((value - lower) / span) * n as f64) as usize
        } else {
            n - 1
        };
        idx = idx.min(n - 1);
        while idx > 0 && value < edges[idx] {
            idx -= 1;
        }
        while idx + 1 < n && value >= edges[idx + 1] {
            idx += 1;
        }
        Some(idx)
    }

    fn accumulate<I>(&mut self, values: I, policy: OutOfRange)
    where
        I: IntoIterator<Item = f64>,
    {
        for value in values {
            if let Some(idx) = self.bin_index(value, policy) {
                self.counts_mut()[idx] += 1.0;
            }
        }
    }

    fn redistribute(&self, new_edges: Vec<f64>) -> DimensionHistogram {
        let num_bins = new_edges.len().saturating_sub(1).max(1);
        let mut counts = vec![0.0; num_bins];

        for bin in self.bins().filter(|b| b.count > 0.0) {
            let idx = search_sorted_left(&new_edges, bin.center()).saturating_sub(1);
            counts[idx.min(num_bins - 1)] += bin.count;
        }

        DimensionHistogram::from_parts(counts, new_edges)
            .unwrap_or_else(|| self.clone())
    }

    fn value_at_count(&self, cumulative: &[f64], target: f64) -> f64 {
        let edges = self.edges();
        let idx = search_sorted_left(cumulative, target);

        if idx == 0 {
            return edges[0];
        }
        if idx >= cumulative.len() {
            return edges[edges.len() - 1];
        }

        let count_before = cumulative[idx - 1];
        let count_in_bin = cumulative[idx] - count_before;
        if count_in_bin == 0.0 {
            return edges[idx];
        }

        // Linear interpolation within the bin
        let fraction = (target - count_before) / count_in_bin;
        edges[idx] + fraction * (edges[idx + 1] - edges[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_bins() -> DimensionHistogram {
        DimensionHistogram::spanning(0.0, 4.0, 4)
    }

    #[test]
    fn test_bin_index_half_open() {
        let hist = unit_bins();
        assert_eq!(hist.bin_index(0.0, OutOfRange::Drop), Some(0));
        assert_eq!(hist.bin_index(0.999, OutOfRange::Drop), Some(0));
        assert_eq!(hist.bin_index(1.0, OutOfRange::Drop), Some(1));
        assert_eq!(hist.bin_index(4.0, OutOfRange::Drop), Some(3)); // Last bin includes right edge
        assert_eq!(hist.bin_index(-0.1, OutOfRange::Drop), None);
        assert_eq!(hist.bin_index(4.1, OutOfRange::Drop), None);
        assert_eq!(hist.bin_index(-7.0, OutOfRange::Clamp), Some(0));
        assert_eq!(hist.bin_index(9.0, OutOfRange::Clamp), Some(3));
    }

    #[test]
    fn test_bin_index_degenerate_edges() {
        let hist = DimensionHistogram::spanning(5.0, 5.0, 10);
        assert_eq!(hist.bin_index(5.0, OutOfRange::Drop), Some(9));
    }

    #[test]
    fn test_accumulate() {
        let mut hist = unit_bins();
        hist.accumulate([0.5, 1.5, 1.7, 3.9, 4.0, 10.0], OutOfRange::Drop);
        assert_eq!(hist.counts(), &[1.0, 2.0, 0.0, 2.0]);

        hist.accumulate([10.0], OutOfRange::Clamp);
        assert_eq!(hist.counts(), &[1.0, 2.0, 0.0, 3.0]);
    }

    #[test]
    fn test_redistribute_preserves_total() {
        let mut hist = unit_bins();
        hist.accumulate([0.5, 1.5, 2.5, 2.6, 3.5], OutOfRange::Drop);

        let wider = hist.redistribute(vec![-4.0, 0.0, 4.0, 8.0]);
        assert_eq!(wider.num_bins(), 3);
        assert_eq!(wider.total(), hist.total());
        assert_eq!(wider.counts(), &[0.0, 5.0, 0.0]);
    }

    #[test]
    fn test_redistribute_clamps_centers() {
        let mut hist = unit_bins();
        hist.accumulate([0.2, 3.8], OutOfRange::Drop);

        // Old centers 0.5 and 3.5 fall outside the new range and are clamped
        let narrow = hist.redistribute(vec![1.0, 2.0, 3.0]);
        assert_eq!(narrow.counts(), &[1.0, 1.0]);
    }

    #[test]
    fn test_value_at_count_policies() {
        let hist =
            DimensionHistogram::from_parts(vec![2.0, 0.0, 2.0], vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let cumsum = hist.cumulative();

        // First bin already reaches the target
        assert_eq!(hist.value_at_count(&cumsum, 1.0), 0.0);
        // Interpolated inside the third bin
        assert_relative_eq!(hist.value_at_count(&cumsum, 3.0), 2.5, epsilon = 1e-12);
        // Beyond the total
        assert_eq!(hist.value_at_count(&cumsum, 5.0), 3.0);

        // Empty bin hit by the search
        let hist =
            DimensionHistogram::from_parts(vec![0.0, 0.0, 2.0], vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let cumsum = hist.cumulative();
        assert_eq!(hist.value_at_count(&cumsum, 0.0), 0.0);
    }
}
