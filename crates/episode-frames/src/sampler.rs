//! Evenly spaced frame sampling with a sub-linear budget
//!
//! Statistics over image features are computed on a bounded subset of
//! frames so their cost does not grow linearly with episode length.

use episode_core::utils::linspace;
use episode_core::SampleBudget;

/// Number of samples to draw from a sequence of `dataset_len` items
///
/// `dataset_len^power` clamped to `[min_samples, max_samples]`, where the
/// lower bound drops to `dataset_len` for sequences shorter than
/// `min_samples`. With the default budget:
///
/// | length | samples |
/// |---|---|
/// | 1 to ~500 | 100 (or the length, if shorter) |
/// | 1000 | 177 |
/// | 5000 | 594 |
/// | 10000 | 1000 |
/// | 20000 | 1681 |
pub fn estimate_num_samples_with(dataset_len: usize, budget: &SampleBudget) -> usize {
    let min_samples = budget.min_samples.min(dataset_len);
    // Guard so exact powers such as 10000^0.75 are not floored to 999
    let grown = ((dataset_len as f64).powf(budget.power) + 1e-9).floor() as usize;
    grown.min(budget.max_samples).max(min_samples)
}

/// [`estimate_num_samples_with`] using the default budget
///
/// # Examples
///
/// ```rust
/// use episode_frames::estimate_num_samples;
///
/// assert_eq!(estimate_num_samples(50), 50);
/// assert_eq!(estimate_num_samples(300), 100);
/// assert_eq!(estimate_num_samples(10_000), 1000);
/// ```
pub fn estimate_num_samples(dataset_len: usize) -> usize {
    estimate_num_samples_with(dataset_len, &SampleBudget::default())
}

/// Evenly spaced indices over `[0, data_len - 1]`
///
/// The first and last index are always included. Interpolated positions are
/// rounded half-to-even, so duplicates only appear when the budget asks for
/// at least as many samples as there are items.
pub fn sample_indices_with(data_len: usize, budget: &SampleBudget) -> Vec<usize> {
    let num_samples = estimate_num_samples_with(data_len, budget);
    if data_len == 0 || num_samples == 0 {
        return Vec::new();
    }
    linspace(0.0, (data_len - 1) as f64, num_samples)
        .into_iter()
        .map(|x| x.round_ties_even() as usize)
        .collect()
}

/// [`sample_indices_with`] using the default budget
///
/// # Examples
///
/// ```rust
/// use episode_frames::sample_indices;
///
/// let indices = sample_indices(1000);
/// assert_eq!(indices.len(), 177);
/// assert_eq!(indices[0], 0);
/// assert_eq!(*indices.last().unwrap(), 999);
/// ```
pub fn sample_indices(data_len: usize) -> Vec<usize> {
    sample_indices_with(data_len, &SampleBudget::default())
}
