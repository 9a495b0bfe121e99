//! Frame loading and stacking
//!
//! Decoding is abstracted behind [`FrameLoader`] so the statistics engine can
//! be driven from files, in-memory buffers or test fixtures alike.

use crate::downsample::auto_downsample;
use crate::sampler::sample_indices_with;
use episode_core::{DownsampleConfig, Error, Result, SampleBudget};
use ndarray::{Array3, Array4, Axis};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Source of channel-first `(C, H, W)` `u8` frames
pub trait FrameLoader {
    /// Load the frame stored at `path`
    fn load(&self, path: &Path) -> Result<Array3<u8>>;
}

impl<F> FrameLoader for F
where
    F: Fn(&Path) -> Result<Array3<u8>>,
{
    fn load(&self, path: &Path) -> Result<Array3<u8>> {
        self(path)
    }
}

/// Decodes image files with the `image` crate, converting every frame to RGB
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileLoader;

impl ImageFileLoader {
    pub fn new() -> Self {
        Self
    }
}

impl FrameLoader for ImageFileLoader {
    fn load(&self, path: &Path) -> Result<Array3<u8>> {
        let image_error = |message: String| Error::Image {
            path: path.display().to_string(),
            message,
        };

        let rgb = image::open(path)
            .map_err(|e| image_error(e.to_string()))?
            .to_rgb8();
        let (width, height) = rgb.dimensions();

        // Decoded pixels are interleaved (H, W, C)
        let interleaved =
            Array3::from_shape_vec((height as usize, width as usize, 3), rgb.into_raw())
                .map_err(|e| image_error(e.to_string()))?;

        Ok(interleaved
            .permuted_axes([2, 0, 1])
            .as_standard_layout()
            .into_owned())
    }
}

/// Sample, load, downsample and stack frames into `(S, C, H, W)`
///
/// Indices are drawn with [`sample_indices_with`], so the first and last frame
/// are always part of the stack. Every frame must have the same shape after
/// downsampling.
///
/// # Errors
///
/// - [`Error::InsufficientSamples`] if `paths` is empty
/// - [`Error::ShapeMismatch`] if a frame disagrees with the first one
/// - whatever the loader returns for an unreadable frame
pub fn load_sampled_frames<L>(
    paths: &[PathBuf],
    loader: &L,
    sampling: &SampleBudget,
    downsample: &DownsampleConfig,
) -> Result<Array4<u8>>
where
    L: FrameLoader + ?Sized,
{
    let indices = sample_indices_with(paths.len(), sampling);
    if indices.is_empty() {
        return Err(Error::InsufficientSamples {
            expected: 1,
            actual: 0,
        });
    }
    debug!(
        total = paths.len(),
        sampled = indices.len(),
        "Loading sampled frames"
    );

    let mut stack: Option<Array4<u8>> = None;
    for (slot, &index) in indices.iter().enumerate() {
        let path = &paths[index];
        let frame = loader.load(path)?;
        let frame = auto_downsample(frame.view(), downsample);
        trace!(index, shape = ?frame.shape(), "Loaded frame");

        let stack = stack.get_or_insert_with(|| {
            let (c, h, w) = frame.dim();
            Array4::zeros((indices.len(), c, h, w))
        });
        let expected = &stack.shape()[1..];
        if frame.shape() != expected {
            return Err(Error::shape_mismatch(
                &path.display().to_string(),
                "frame",
                expected,
                frame.shape(),
            ));
        }
        stack.index_axis_mut(Axis(0), slot).assign(&frame);
    }

    stack.ok_or(Error::InsufficientSamples {
        expected: 1,
        actual: 0,
    })
}
