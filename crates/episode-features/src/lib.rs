//! Per-feature statistics for robot demonstration episodes
//!
//! This crate sits between raw episode data and the estimator: it decides how
//! each feature is laid out for reduction and how results are shaped back.
//!
//! # Architecture
//!
//! - [`ReductionAxis`]: the four supported reduction conventions, with their
//!   `(rows, width)` layout and numpy-style output shapes
//! - [`get_feature_stats`]: statistics of one array along one axis
//! - [`compute_episode_stats`]: dtype-driven dispatch over every feature of an
//!   episode, including frame sampling for image and video features
//!
//! # Examples
//!
//! ```rust
//! use episode_core::StatsConfig;
//! use episode_features::{compute_episode_stats, EpisodeData, FeatureSchema, FeatureSpec};
//! use episode_frames::ImageFileLoader;
//! use ndarray::array;
//!
//! let mut schema = FeatureSchema::new();
//! schema.insert("action".into(), FeatureSpec::new("float32", vec![2]));
//!
//! let mut episode = EpisodeData::new();
//! episode.insert("action".into(), array![[0.0, 1.0], [1.0, 2.0], [2.0, 3.0]].into_dyn().into());
//!
//! let stats = compute_episode_stats(&episode, &schema, &ImageFileLoader, &StatsConfig::default()).unwrap();
//! assert_eq!(stats["action"].count, 3);
//! assert_eq!(stats["action"].mean.as_slice().unwrap(), &[1.0, 2.0]);
//! ```

pub mod axis;
pub mod dispatch;
pub mod episode;
pub mod schema;

pub use axis::ReductionAxis;
pub use dispatch::get_feature_stats;
pub use episode::compute_episode_stats;
pub use schema::{EpisodeData, FeatureData, FeatureKind, FeatureSchema, FeatureSpec};

pub use episode_core::Result;
