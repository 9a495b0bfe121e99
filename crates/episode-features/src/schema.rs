//! Feature descriptions and raw episode data

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// How a feature is stored, derived from its declared dtype
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Still frames stored as image files
    Image,
    /// Frames decoded from a video stream, stored as image files
    Video,
    /// Free text, never summarized
    String,
    /// Audio, never summarized
    Audio,
    /// Any numeric dtype (`float32`, `int64`, `bool`, ...)
    Numeric(String),
}

impl FeatureKind {
    pub fn from_dtype(dtype: &str) -> Self {
        match dtype {
            "image" => Self::Image,
            "video" => Self::Video,
            "string" => Self::String,
            "audio" => Self::Audio,
            other => Self::Numeric(other.to_string()),
        }
    }

    /// Whether the feature's data is a list of frame paths
    pub fn is_visual(&self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }

    /// Whether no statistics are computed for this feature
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::String | Self::Audio)
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::String => write!(f, "string"),
            Self::Audio => write!(f, "audio"),
            Self::Numeric(dtype) => write!(f, "{dtype}"),
        }
    }
}

/// Declared type and per-frame shape of one feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub dtype: String,
    #[serde(default)]
    pub shape: Vec<usize>,
    /// Optional names of the feature's dimensions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
}

impl FeatureSpec {
    pub fn new(dtype: impl Into<String>, shape: Vec<usize>) -> Self {
        Self {
            dtype: dtype.into(),
            shape,
            names: None,
        }
    }

    pub fn kind(&self) -> FeatureKind {
        FeatureKind::from_dtype(&self.dtype)
    }
}

/// Feature name to its description
pub type FeatureSchema = BTreeMap<String, FeatureSpec>;

/// Raw data of one feature over a whole episode
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureData {
    /// Ordered frame file paths of an image or video feature
    Frames(Vec<PathBuf>),
    /// Materialized numeric values, samples along the first axis
    Array(ArrayD<f64>),
}

impl FeatureData {
    /// Number of samples in the episode
    pub fn len(&self) -> usize {
        match self {
            Self::Frames(paths) => paths.len(),
            Self::Array(array) => array.shape().first().copied().unwrap_or(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the variant, used in error messages
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Frames(_) => "frame paths",
            Self::Array(_) => "numeric array",
        }
    }
}

impl From<Vec<PathBuf>> for FeatureData {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self::Frames(paths)
    }
}

impl From<ArrayD<f64>> for FeatureData {
    fn from(array: ArrayD<f64>) -> Self {
        Self::Array(array)
    }
}

/// Feature name to its raw data for one episode
pub type EpisodeData = BTreeMap<String, FeatureData>;
