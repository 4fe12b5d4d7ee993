//! Pipeline entry points.
//!
//! ```text
//! points -> markers -> bounds -> lookup -> FeatureStore -> ClassifiedMap -> FilteredResult
//! ```
//!
//! The feature lookup is the only await point. Every stage after it is
//! sequential and runs to completion.

use log::{info, warn};
use std::time::Instant;

use crate::classify::classify_markers;
use crate::error::{LandmarkError, Result};
use crate::features::{FeatureSource, FeatureStore};
use crate::filter::{filter_landmarks, FilteredResult};
use crate::geo_utils::compute_bounds;
use crate::progress::LandmarkObserver;
use crate::sampler::{sample_markers, DistanceMarker};
use crate::{Bounds, GpsPoint, LandmarkConfig, TrackPoint};

/// Fewest points a track needs to be annotated.
pub const MIN_TRACK_POINTS: usize = 2;

fn check_input(points: &[TrackPoint]) -> Result<()> {
    if points.len() < MIN_TRACK_POINTS {
        return Err(LandmarkError::InsufficientPoints {
            point_count: points.len(),
            minimum_required: MIN_TRACK_POINTS,
        });
    }
    Ok(())
}

/// Query box for the feature lookup: the marker positions plus a margin.
pub fn lookup_bounds(
    points: &[TrackPoint],
    markers: &[DistanceMarker],
    margin_deg: f64,
) -> Option<Bounds> {
    let positions: Vec<GpsPoint> = markers
        .iter()
        .filter_map(|m| points.get(m.point_index))
        .map(TrackPoint::position)
        .collect();
    compute_bounds(&positions).map(|b| b.expand(margin_deg))
}

/// Annotate a track, fetching features from `source`.
///
/// Fails when the track has fewer than two points, or when `source` returns
/// an error that [`LandmarkError::is_recoverable`] rejects. A failed lookup
/// (bad payload, HTTP failure, timeout) is logged and treated as an empty
/// feature set, in which case the result is empty. `observer` receives one
/// progress update per marker and exactly one completion.
pub async fn annotate_route<S>(
    points: &[TrackPoint],
    source: &S,
    config: &LandmarkConfig,
    observer: &dyn LandmarkObserver,
) -> Result<FilteredResult>
where
    S: FeatureSource,
{
    check_input(points)?;

    let start = Instant::now();
    let markers = sample_markers(points, config.marker_interval_km);

    let store = match lookup_bounds(points, &markers, config.bbox_margin_deg) {
        Some(bounds) => match source.lookup(bounds).await {
            Ok(elements) => {
                info!(
                    "[Landmarks] Lookup returned {} elements in {:?}",
                    elements.len(),
                    start.elapsed()
                );
                FeatureStore::from_elements(&elements)
            }
            Err(e) if e.is_recoverable() => {
                warn!("[Landmarks] {}, continuing without features", e);
                FeatureStore::empty()
            }
            Err(e) => return Err(e),
        },
        None => FeatureStore::empty(),
    };

    Ok(run_pipeline(points, &markers, &store, config, observer, start))
}

/// Annotate a track against an already-fetched feature store.
pub fn annotate_route_with_store(
    points: &[TrackPoint],
    store: &FeatureStore,
    config: &LandmarkConfig,
    observer: &dyn LandmarkObserver,
) -> Result<FilteredResult> {
    check_input(points)?;

    let start = Instant::now();
    let markers = sample_markers(points, config.marker_interval_km);
    Ok(run_pipeline(points, &markers, store, config, observer, start))
}

fn run_pipeline(
    points: &[TrackPoint],
    markers: &[DistanceMarker],
    store: &FeatureStore,
    config: &LandmarkConfig,
    observer: &dyn LandmarkObserver,
    start: Instant,
) -> FilteredResult {
    let classified = classify_markers(markers, store, points, config, observer);
    let result = filter_landmarks(&classified, markers, config);

    info!(
        "[Landmarks] {} points -> {} markers -> {} classified -> {} landmarks in {:?}",
        points.len(),
        markers.len(),
        classified.len(),
        result.len(),
        start.elapsed()
    );

    observer.on_complete(&result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{OsmElement, StaticFeatureSource};
    use crate::progress::{NoopObserver, ProgressRecorder};
    use std::future::Future;
    use std::sync::atomic::Ordering;

    struct FailingSource(LandmarkError);

    impl FeatureSource for FailingSource {
        fn lookup(&self, _bounds: Bounds) -> impl Future<Output = Result<Vec<OsmElement>>> + Send {
            let err = self.0.clone();
            async move { Err(err) }
        }
    }

    fn track(count: usize) -> Vec<TrackPoint> {
        (0..count)
            .map(|i| TrackPoint::new(46.0 + i as f64 * 0.009, 8.0, 300.0))
            .collect()
    }

    #[test]
    fn test_rejects_short_track() {
        let err = annotate_route_with_store(
            &track(1),
            &FeatureStore::empty(),
            &LandmarkConfig::default(),
            &NoopObserver,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LandmarkError::InsufficientPoints { point_count: 1, minimum_required: 2 }
        ));
    }

    #[test]
    fn test_lookup_bounds_uses_marker_positions() {
        let points = track(4);
        let markers = sample_markers(&points, 1.0);
        let bounds = lookup_bounds(&points, &markers, 0.01).unwrap();
        assert!((bounds.min_lat - 45.99).abs() < 1e-9);
        assert!((bounds.max_lat - (46.027 + 0.01)).abs() < 1e-9);
        assert!((bounds.min_lng - 7.99).abs() < 1e-9);
    }

    #[test]
    fn test_short_track_single_marker() {
        // ~0.5 km: only the origin marker
        let points = vec![TrackPoint::new(46.0, 8.0, 0.0), TrackPoint::new(46.0045, 8.0, 0.0)];
        let recorder = ProgressRecorder::new();
        let store = FeatureStore::empty();
        let result =
            annotate_route_with_store(&points, &store, &LandmarkConfig::default(), &recorder)
                .unwrap();
        assert!(result.is_empty());
        assert_eq!(recorder.history(), vec![(1, 1)]);
        assert_eq!(recorder.completions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_lookup_yields_empty_result() {
        let recorder = ProgressRecorder::new();
        let source = FailingSource(LandmarkError::Timeout { seconds: 30 });
        let result = annotate_route(&track(12), &source, &LandmarkConfig::default(), &recorder)
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(recorder.history().len(), 12);
        assert_eq!(recorder.completions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unrecoverable_source_error_is_returned() {
        let recorder = ProgressRecorder::new();
        let source = FailingSource(LandmarkError::Gpx {
            message: "not a lookup failure".to_string(),
        });
        let err = annotate_route(&track(12), &source, &LandmarkConfig::default(), &recorder)
            .await
            .unwrap_err();
        assert!(matches!(err, LandmarkError::Gpx { .. }));
        assert!(recorder.history().is_empty());
        assert_eq!(recorder.completions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_static_source_round_trip() {
        let source = StaticFeatureSource::new(vec![OsmElement::node(
            1,
            46.045,
            8.0,
            &[("mountain_pass", "yes"), ("name", "Pass")],
        )]);
        let result = annotate_route(&track(12), &source, &LandmarkConfig::default(), &NoopObserver)
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[&5].name, "Pass");
    }
}
