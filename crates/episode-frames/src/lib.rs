//! Bounded frame sampling for image and video features
//!
//! Image statistics are computed over a sub-linear number of evenly spaced
//! frames, each strided down when it is large. This crate provides the three
//! pieces of that path:
//!
//! - **Sampler**: [`estimate_num_samples`] and [`sample_indices`]
//! - **Downsampler**: [`auto_downsample`], a lossy strided pick
//! - **Loader**: the [`FrameLoader`] seam, an `image`-backed
//!   [`ImageFileLoader`], and [`load_sampled_frames`] which stacks the sampled
//!   frames into a `(S, C, H, W)` array
//!
//! # Examples
//!
//! ```rust
//! use episode_core::{DownsampleConfig, SampleBudget};
//! use episode_frames::load_sampled_frames;
//! use ndarray::Array3;
//! use std::path::{Path, PathBuf};
//!
//! let paths: Vec<PathBuf> = (0..500).map(|i| format!("frame_{i}.png").into()).collect();
//! let loader = |_: &Path| -> episode_core::Result<Array3<u8>> {
//!     Ok(Array3::zeros((3, 480, 640)))
//! };
//!
//! let stack = load_sampled_frames(
//!     &paths,
//!     &loader,
//!     &SampleBudget::default(),
//!     &DownsampleConfig::default(),
//! )
//! .unwrap();
//! assert_eq!(stack.shape(), &[105, 3, 120, 160]);
//! ```

pub mod downsample;
pub mod loader;
pub mod sampler;

pub use downsample::{auto_downsample, downsample_factor};
pub use loader::{load_sampled_frames, FrameLoader, ImageFileLoader};
pub use sampler::{estimate_num_samples, estimate_num_samples_with, sample_indices, sample_indices_with};

pub use episode_core::Result;
