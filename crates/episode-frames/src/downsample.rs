//! Strided downsampling of channel-first frames

use episode_core::DownsampleConfig;
use ndarray::{s, Array3, ArrayView3};

/// Stride applied to both spatial axes of a `(C, H, W)` frame
///
/// `1` when the larger side is below the threshold. Otherwise the larger side
/// divided by the target size, rounded down and never below `1`.
pub fn downsample_factor(height: usize, width: usize, config: &DownsampleConfig) -> usize {
    if height.max(width) < config.threshold {
        return 1;
    }
    let larger = if width > height { width } else { height };
    (larger / config.target_size.max(1)).max(1)
}

/// Subsample a `(C, H, W)` frame by keeping every `factor`-th row and column
///
/// This is a strided pick, not an interpolating resize: it only bounds the
/// per-frame cost of statistics and discards the skipped pixels.
///
/// # Examples
///
/// ```rust
/// use episode_core::DownsampleConfig;
/// use episode_frames::auto_downsample;
/// use ndarray::Array3;
///
/// let frame = Array3::<u8>::zeros((3, 480, 640));
/// let small = auto_downsample(frame.view(), &DownsampleConfig::default());
/// assert_eq!(small.shape(), &[3, 120, 160]);
/// ```
pub fn auto_downsample<A: Clone>(frame: ArrayView3<'_, A>, config: &DownsampleConfig) -> Array3<A> {
    let (_, height, width) = frame.dim();
    let factor = downsample_factor(height, width, config);
    if factor == 1 {
        return frame.to_owned();
    }
    let step = factor as isize;
    frame.slice(s![.., ..;step, ..;step]).to_owned()
}
