//! Reduction axes and the reshaping conventions attached to them

use episode_core::{Error, Result};
use ndarray::{Array2, ArrayD, ArrayViewD, IxDyn};
use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The axis configurations statistics can be reduced over
///
/// Each variant fixes how the input is laid out as `(rows, width)` for the
/// estimator and how the resulting per-dimension tensors are shaped back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionAxis {
    /// `(0, 2, 3)` over an `(N, C, H, W)` image batch: one statistic per channel
    Image,
    /// `0`: one statistic per trailing element, reduced over samples
    Vector,
    /// `(1,)` over an `(N, D)` matrix: one statistic per row
    Featurewise,
    /// `None`: a single statistic over every element
    Global,
}

impl ReductionAxis {
    /// Parse a numpy-style axis argument
    ///
    /// # Examples
    ///
    /// ```rust
    /// use episode_features::ReductionAxis;
    ///
    /// assert_eq!(ReductionAxis::from_axes(Some(&[0, 2, 3])).unwrap(), ReductionAxis::Image);
    /// assert_eq!(ReductionAxis::from_axes(None).unwrap(), ReductionAxis::Global);
    /// assert!(ReductionAxis::from_axes(Some(&[2])).is_err());
    /// ```
    pub fn from_axes(axes: Option<&[usize]>) -> Result<Self> {
        match axes {
            None => Ok(Self::Global),
            Some([0]) => Ok(Self::Vector),
            Some([1]) => Ok(Self::Featurewise),
            Some([0, 2, 3]) => Ok(Self::Image),
            Some(other) => Err(Error::UnsupportedAxis(other.to_vec())),
        }
    }

    /// The numpy-style spelling of this axis
    pub fn axes(&self) -> Option<&'static [usize]> {
        match self {
            Self::Image => Some(&[0, 2, 3]),
            Self::Vector => Some(&[0]),
            Self::Featurewise => Some(&[1]),
            Self::Global => None,
        }
    }

    /// Lay `array` out as `(rows, width)` and report the sample count
    ///
    /// The sample count is what ends up in `count`: images for an image
    /// batch, rows for vector data, columns for feature-wise statistics and
    /// elements for global statistics. Axes are rearranged on the view, so
    /// the values are converted to `f64` exactly once.
    pub fn prepare<T>(&self, array: ArrayViewD<'_, T>) -> Result<(Array2<f64>, u64)>
    where
        T: AsPrimitive<f64>,
    {
        let shape = array.shape().to_vec();
        match self {
            Self::Image => {
                let [n, c, h, w] = shape[..] else {
                    return Err(rank_error(self, "4", &shape));
                };
                let channels_last = array.permuted_axes(IxDyn(&[0, 2, 3, 1]));
                let flat = to_matrix(channels_last, n * h * w, c)?;
                Ok((flat, n as u64))
            }
            Self::Vector => {
                let Some(&n) = shape.first() else {
                    return Err(rank_error(self, "at least 1", &shape));
                };
                let width: usize = shape[1..].iter().product();
                let flat = to_matrix(array, n, width)?;
                Ok((flat, n as u64))
            }
            Self::Featurewise => {
                let [_, d] = shape[..] else {
                    return Err(rank_error(self, "2", &shape));
                };
                let transposed = array.reversed_axes();
                let flat = to_matrix(transposed, shape[1], shape[0])?;
                Ok((flat, d as u64))
            }
            Self::Global => {
                let m = array.len();
                let flat = to_matrix(array, m, 1)?;
                Ok((flat, m.max(1) as u64))
            }
        }
    }

    /// Shape a per-dimension result back to numpy reduction conventions
    ///
    /// `value` is the width-length vector the estimator produced for an input
    /// of shape `original_shape`.
    pub fn restore(
        &self,
        value: ArrayD<f64>,
        keepdims: bool,
        original_shape: &[usize],
    ) -> Result<ArrayD<f64>> {
        let target: Vec<usize> = match self {
            Self::Image if keepdims => vec![1, value.len(), 1, 1],
            Self::Image => vec![value.len()],
            Self::Vector => {
                let trailing = if original_shape.len() > 1 {
                    original_shape[1..].to_vec()
                } else {
                    vec![value.len()]
                };
                if keepdims && original_shape.len() > 1 {
                    std::iter::once(1).chain(trailing).collect()
                } else {
                    trailing
                }
            }
            Self::Featurewise if keepdims => vec![value.len(), 1],
            Self::Featurewise => vec![value.len()],
            Self::Global if keepdims => vec![1; original_shape.len().max(1)],
            Self::Global => vec![1],
        };
        value
            .into_shape_with_order(IxDyn(&target))
            .map_err(|e| Error::InvalidInput(format!("cannot reshape statistic to {target:?}: {e}")))
    }
}

impl fmt::Display for ReductionAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.axes() {
            Some(axes) => write!(f, "{axes:?}"),
            None => write!(f, "None"),
        }
    }
}

fn rank_error(axis: &ReductionAxis, expected: &str, shape: &[usize]) -> Error {
    Error::InvalidInput(format!(
        "axis {axis} expects an input of rank {expected}, got shape {shape:?}"
    ))
}

/// Convert a view to a `(rows, width)` matrix, reading it in logical order
fn to_matrix<T>(array: ArrayViewD<'_, T>, rows: usize, width: usize) -> Result<Array2<f64>>
where
    T: AsPrimitive<f64>,
{
    let values: Vec<f64> = array.iter().map(|v| v.as_()).collect();
    Array2::from_shape_vec((rows, width), values)
        .map_err(|e| Error::InvalidInput(format!("cannot flatten to ({rows}, {width}): {e}")))
}
