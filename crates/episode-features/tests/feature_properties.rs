//! Properties of feature statistics over arbitrary inputs

use episode_core::{Result, StatsConfig};
use episode_features::{
    compute_episode_stats, get_feature_stats, EpisodeData, FeatureSchema, FeatureSpec,
    ReductionAxis,
};
use ndarray::{Array2, Array3, Axis};
use proptest::prelude::*;
use std::path::{Path, PathBuf};

proptest! {
    // Property: vector statistics match direct column reductions
    #[test]
    fn prop_vector_moments_match_columns(
        values in prop::collection::vec(-100.0f64..100.0, 3..120),
    ) {
        let rows = values.len() / 3;
        let data = Array2::from_shape_vec((rows, 3), values[..rows * 3].to_vec()).unwrap();
        let stats = get_feature_stats(
            data.view().into_dyn(),
            ReductionAxis::Vector,
            false,
            &StatsConfig::default(),
        ).unwrap();

        let mean = data.mean_axis(Axis(0)).unwrap();
        prop_assert_eq!(stats.shape(), &[3]);
        prop_assert_eq!(stats.count as usize, rows);
        for d in 0..3 {
            prop_assert!((stats.mean[[d]] - mean[d]).abs() <= 1e-9 * (1.0 + mean[d].abs()));
            prop_assert!(stats.min[[d]] <= stats.quantiles["q01"][[d]] + 1e-9);
            prop_assert!(stats.quantiles["q99"][[d]] <= stats.max[[d]] + 1e-9);
        }
    }

    // Property: normalized image statistics stay within [0, 1] for any pixel content
    #[test]
    fn prop_image_stats_within_unit_interval(
        pixels in prop::collection::vec(any::<u8>(), 3 * 4 * 4),
        num_frames in 1usize..30,
    ) {
        let frame = Array3::from_shape_vec((3, 4, 4), pixels).unwrap();
        let loader = move |_: &Path| -> Result<Array3<u8>> { Ok(frame.clone()) };

        let mut schema = FeatureSchema::new();
        schema.insert("observation.image".into(), FeatureSpec::new("image", vec![4, 4, 3]));
        let mut episode = EpisodeData::new();
        let paths: Vec<PathBuf> = (0..num_frames).map(|i| format!("{i}.png").into()).collect();
        episode.insert("observation.image".into(), paths.into());

        let stats = compute_episode_stats(&episode, &schema, &loader, &StatsConfig::default()).unwrap();
        let image = &stats["observation.image"];
        prop_assert_eq!(image.count as usize, num_frames);
        for (_, value) in image.tensors() {
            prop_assert_eq!(value.shape(), &[3, 1, 1]);
            prop_assert!(value.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }
}

#[test]
fn test_unsupported_axis_from_numpy_spelling() {
    let result = ReductionAxis::from_axes(Some(&[0, 1, 2]));
    assert!(matches!(
        result,
        Err(episode_core::Error::UnsupportedAxis(axes)) if axes == vec![0, 1, 2]
    ));
}
