//! Utility functions for working with data slices and arrays

use ndarray::{Array1, ArrayView2, Axis};

/// Evenly spaced values over `[start, stop]`
///
/// The last value is exactly `stop`, which the histogram code relies on
/// to keep the observed maximum inside the last bin.
///
/// # Examples
///
/// ```rust
/// use episode_core::utils::linspace;
///
/// assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
/// assert!(linspace(0.0, 1.0, 0).is_empty());
/// ```
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            values[num - 1] = stop;
            values
        }
    }
}

/// First index `i` such that `sorted[i] >= value` (numpy `searchsorted`, left side)
///
/// # Examples
///
/// ```rust
/// use episode_core::utils::search_sorted_left;
///
/// let edges = [0.0, 1.0, 2.0, 3.0];
/// assert_eq!(search_sorted_left(&edges, 1.0), 1);
/// assert_eq!(search_sorted_left(&edges, 1.5), 2);
/// assert_eq!(search_sorted_left(&edges, 9.0), 4);
/// ```
pub fn search_sorted_left(sorted: &[f64], value: f64) -> usize {
    sorted.partition_point(|&x| x < value)
}

/// Column-wise minimum of a `(rows, D)` matrix
pub fn column_min(data: ArrayView2<'_, f64>) -> Array1<f64> {
    data.fold_axis(Axis(0), f64::INFINITY, |&acc, &x| acc.min(x))
}

/// Column-wise maximum of a `(rows, D)` matrix
pub fn column_max(data: ArrayView2<'_, f64>) -> Array1<f64> {
    data.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &x| acc.max(x))
}

/// Column-wise mean; zeros for a matrix without rows
pub fn column_mean(data: ArrayView2<'_, f64>) -> Array1<f64> {
    data.mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(data.ncols()))
}

/// Column-wise mean of squared values; zeros for a matrix without rows
pub fn column_mean_of_squares(data: ArrayView2<'_, f64>) -> Array1<f64> {
    let rows = data.nrows();
    if rows == 0 {
        return Array1::zeros(data.ncols());
    }
    data.fold_axis(Axis(0), 0.0, |&acc, &x| acc + x * x) / rows as f64
}

/// Column-wise population standard deviation
pub fn column_std(data: ArrayView2<'_, f64>) -> Array1<f64> {
    if data.nrows() == 0 {
        return Array1::zeros(data.ncols());
    }
    data.std_axis(Axis(0), 0.0)
}
