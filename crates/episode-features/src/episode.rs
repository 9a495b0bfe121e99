//! Statistics of every feature of one episode

use crate::axis::ReductionAxis;
use crate::dispatch::get_feature_stats;
use crate::schema::{EpisodeData, FeatureData, FeatureSchema};
use episode_core::{EpisodeStatistics, Error, FeatureStatistics, Result, StatsConfig};
use episode_frames::{load_sampled_frames, FrameLoader};
use ndarray::Axis;
use tracing::{debug, instrument, trace};

/// Pixel value that maps to `1.0` in normalized image statistics
const PIXEL_SCALE: f64 = 255.0;

/// Compute statistics for every feature present in `episode`
///
/// Each feature is dispatched on the dtype declared in `schema`:
///
/// - `string` and `audio` features are skipped and produce no entry
/// - `image` and `video` features are sampled, loaded through `loader`,
///   reduced per channel, scaled to `[0, 1]` and shaped `(C, 1, 1)`
/// - anything else is reduced over its first axis
///
/// # Errors
///
/// - [`Error::MissingFeature`] if `episode` holds a feature `schema` does not describe
/// - [`Error::TypeMismatch`] if a feature's data does not fit its dtype
/// - any error from frame loading or the estimator
#[instrument(level = "debug", skip_all, fields(features = episode.len()))]
pub fn compute_episode_stats<L>(
    episode: &EpisodeData,
    schema: &FeatureSchema,
    loader: &L,
    config: &StatsConfig,
) -> Result<EpisodeStatistics>
where
    L: FrameLoader + ?Sized,
{
    let mut episode_stats = EpisodeStatistics::new();

    for (name, data) in episode {
        let spec = schema
            .get(name)
            .ok_or_else(|| Error::MissingFeature(name.clone()))?;
        let kind = spec.kind();

        if kind.is_skipped() {
            trace!(feature = %name, dtype = %kind, "skipping feature");
            continue;
        }

        let stats = if kind.is_visual() {
            let FeatureData::Frames(paths) = data else {
                return Err(data_mismatch(name, "frame paths", data));
            };
            visual_stats(paths, loader, config)?
        } else {
            let FeatureData::Array(array) = data else {
                return Err(data_mismatch(name, "a numeric array", data));
            };
            get_feature_stats(
                array.view(),
                ReductionAxis::Vector,
                array.ndim() == 1,
                config,
            )?
        };

        debug!(feature = %name, dtype = %kind, count = stats.count, shape = ?stats.shape(), "computed feature statistics");
        episode_stats.insert(name.clone(), stats);
    }

    Ok(episode_stats)
}

/// Per-channel statistics of sampled frames, normalized to `[0, 1]`
fn visual_stats<L>(
    paths: &[std::path::PathBuf],
    loader: &L,
    config: &StatsConfig,
) -> Result<FeatureStatistics>
where
    L: FrameLoader + ?Sized,
{
    let frames = load_sampled_frames(paths, loader, &config.sampling, &config.downsample)?;
    let stats = get_feature_stats(frames.view().into_dyn(), ReductionAxis::Image, true, config)?;

    // Histogram edges are padded past the observed range, so extreme quantiles
    // can land a hair outside [0, 255]. (1, C, 1, 1) -> (C, 1, 1)
    Ok(stats.map_tensors(|value| {
        value
            .mapv(|v| (v / PIXEL_SCALE).clamp(0.0, 1.0))
            .index_axis_move(Axis(0), 0)
    }))
}

fn data_mismatch(feature: &str, expected: &str, data: &FeatureData) -> Error {
    Error::type_mismatch(
        feature,
        "data",
        format!("expected {expected}, got {}", data.variant_name()),
    )
}
