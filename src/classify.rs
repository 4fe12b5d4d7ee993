//! Marker classification.
//!
//! Each marker is labelled by the nearest feature within the match radius,
//! checking kinds in a fixed order:
//!
//! 1. pass
//! 2. river
//! 3. town, reported as a pass when the marker sits on a local elevation peak
//!
//! The first kind with a match wins; markers with no match get no entry.

use log::debug;
use std::collections::BTreeMap;

use crate::features::FeatureStore;
use crate::progress::LandmarkObserver;
use crate::sampler::DistanceMarker;
use crate::{LandmarkConfig, LandmarkEntry, LandmarkKind, TrackPoint, PEAK_TOWN_PLACEHOLDER};

/// A classified marker together with the matched feature's population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLandmark {
    pub entry: LandmarkEntry,
    /// Population of the matched feature, zero when absent or unparseable
    pub population: u64,
}

/// Classified markers keyed by kilometre. Unmatched markers are absent.
pub type ClassifiedMap = BTreeMap<u32, ClassifiedLandmark>;

/// Check whether the point at `index` is a local elevation maximum.
///
/// Looks `window` points to each side, clipped at the track ends. Equal
/// neighbours do not disqualify a peak, so a flat ridge can yield several.
pub fn is_local_peak(points: &[TrackPoint], index: usize, window: usize) -> bool {
    let Some(center) = points.get(index) else {
        return false;
    };

    let start = index.saturating_sub(window);
    let end = (index + window).min(points.len() - 1);

    points[start..=end]
        .iter()
        .all(|p| p.elevation <= center.elevation)
}

/// Classify a single marker.
pub fn classify_marker(
    marker: &DistanceMarker,
    store: &FeatureStore,
    points: &[TrackPoint],
    config: &LandmarkConfig,
) -> Option<ClassifiedLandmark> {
    let position = points.get(marker.point_index)?.position();
    let radius = config.match_radius_km;

    let (kind, name, population) = if let Some((pass, _)) =
        store.nearest_within(LandmarkKind::Pass, &position, radius)
    {
        (LandmarkKind::Pass, pass.name.clone(), pass.population)
    } else if let Some((river, _)) = store.nearest_within(LandmarkKind::River, &position, radius)
    {
        (LandmarkKind::River, river.name.clone(), river.population)
    } else if let Some((town, _)) = store.nearest_within(LandmarkKind::Town, &position, radius) {
        if is_local_peak(points, marker.point_index, config.peak_window as usize) {
            let name = town.name.clone().unwrap_or_else(|| PEAK_TOWN_PLACEHOLDER.to_string());
            (LandmarkKind::Pass, Some(name), town.population)
        } else {
            (LandmarkKind::Town, town.name.clone(), town.population)
        }
    } else {
        return None;
    };

    Some(ClassifiedLandmark {
        entry: LandmarkEntry {
            km: marker.km,
            kind,
            name: name.unwrap_or_else(|| kind.placeholder_name().to_string()),
        },
        population,
    })
}

/// Classify every marker in order, reporting progress after each one.
pub fn classify_markers(
    markers: &[DistanceMarker],
    store: &FeatureStore,
    points: &[TrackPoint],
    config: &LandmarkConfig,
    observer: &dyn LandmarkObserver,
) -> ClassifiedMap {
    let total = markers.len() as u32;
    let mut classified = ClassifiedMap::new();

    for (i, marker) in markers.iter().enumerate() {
        if let Some(landmark) = classify_marker(marker, store, points, config) {
            debug!(
                "[Classify] km {} -> {} '{}'",
                marker.km, landmark.entry.kind, landmark.entry.name
            );
            classified.insert(marker.km, landmark);
        }
        observer.on_progress(i as u32 + 1, total);
    }

    classified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::OsmElement;
    use crate::progress::ProgressRecorder;

    fn profile(elevations: &[f64]) -> Vec<TrackPoint> {
        elevations
            .iter()
            .enumerate()
            .map(|(i, &e)| TrackPoint::new(46.0 + i as f64 * 0.009, 8.0, e))
            .collect()
    }

    fn marker_at(index: usize) -> DistanceMarker {
        DistanceMarker { km: index as u32, point_index: index }
    }

    #[test]
    fn test_peak_in_middle_of_hill() {
        let points = profile(&[100.0, 150.0, 200.0, 150.0, 100.0]);
        assert!(is_local_peak(&points, 2, 2));
        assert!(!is_local_peak(&points, 1, 2));
    }

    #[test]
    fn test_peak_at_track_end() {
        let points = profile(&[100.0, 150.0, 200.0, 250.0, 300.0]);
        assert!(is_local_peak(&points, 4, 2));
        assert!(!is_local_peak(&points, 0, 2));
    }

    #[test]
    fn test_flat_ridge_yields_several_peaks() {
        let points = profile(&[100.0, 300.0, 300.0, 300.0, 100.0]);
        assert!(is_local_peak(&points, 1, 2));
        assert!(is_local_peak(&points, 2, 2));
        assert!(is_local_peak(&points, 3, 2));
    }

    #[test]
    fn test_peak_window_is_local() {
        // Higher ground three points away is outside the window
        let points = profile(&[500.0, 100.0, 150.0, 200.0, 150.0, 100.0, 500.0]);
        assert!(is_local_peak(&points, 3, 2));
        assert!(!is_local_peak(&points, 3, 3));
    }

    #[test]
    fn test_peak_out_of_range_index() {
        let points = profile(&[100.0, 200.0]);
        assert!(!is_local_peak(&points, 5, 2));
    }

    #[test]
    fn test_pass_beats_river() {
        let points = profile(&[100.0, 100.0, 100.0]);
        let store = FeatureStore::from_elements(&[
            OsmElement::way(1, 46.009, 8.0, &[("waterway", "river"), ("name", "Reuss")]),
            OsmElement::node(2, 46.0095, 8.0, &[("mountain_pass", "yes"), ("name", "Col")]),
        ]);
        let result = classify_marker(&marker_at(1), &store, &points, &LandmarkConfig::default())
            .unwrap();
        assert_eq!(result.entry.kind, LandmarkKind::Pass);
        assert_eq!(result.entry.name, "Col");
    }

    #[test]
    fn test_river_beats_town() {
        let points = profile(&[100.0, 100.0, 100.0]);
        let store = FeatureStore::from_elements(&[
            OsmElement::node(1, 46.009, 8.0, &[("place", "town"), ("name", "Altdorf")]),
            OsmElement::way(2, 46.0095, 8.0, &[("waterway", "river")]),
        ]);
        let result = classify_marker(&marker_at(1), &store, &points, &LandmarkConfig::default())
            .unwrap();
        assert_eq!(result.entry.kind, LandmarkKind::River);
        assert_eq!(result.entry.name, "Unnamed River");
    }

    #[test]
    fn test_town_on_peak_becomes_pass() {
        let points = profile(&[100.0, 150.0, 200.0, 150.0, 100.0]);
        let store = FeatureStore::from_elements(&[
            OsmElement::node(1, 46.018, 8.0, &[("place", "village"), ("name", "Summit")]),
            OsmElement::node(2, 46.027, 8.0, &[("place", "village")]),
        ]);
        let config = LandmarkConfig::default();

        let on_top = classify_marker(&marker_at(2), &store, &points, &config).unwrap();
        assert_eq!(on_top.entry.kind, LandmarkKind::Pass);
        assert_eq!(on_top.entry.name, "Summit");

        let down = classify_marker(&marker_at(3), &store, &points, &config).unwrap();
        assert_eq!(down.entry.kind, LandmarkKind::Town);
        assert_eq!(down.entry.name, "Unnamed Town");
    }

    #[test]
    fn test_unnamed_town_on_peak_placeholder() {
        let points = profile(&[100.0, 150.0, 200.0, 150.0, 100.0]);
        let town = OsmElement::node(1, 46.018, 8.0, &[("place", "town")]);
        let store = FeatureStore::from_elements(&[town]);
        let result = classify_marker(&marker_at(2), &store, &points, &LandmarkConfig::default())
            .unwrap();
        assert_eq!(result.entry.kind, LandmarkKind::Pass);
        assert_eq!(result.entry.name, PEAK_TOWN_PLACEHOLDER);
        assert!(result.entry.is_placeholder());
    }

    #[test]
    fn test_feature_beyond_radius_is_ignored() {
        let points = profile(&[100.0, 100.0]);
        // ~1.7 km north of point 1
        let store = FeatureStore::from_elements(&[OsmElement::node(
            1,
            46.024,
            8.0,
            &[("mountain_pass", "yes"), ("name", "Far")],
        )]);
        assert!(classify_marker(&marker_at(1), &store, &points, &LandmarkConfig::default())
            .is_none());
    }

    #[test]
    fn test_town_carries_population() {
        let points = profile(&[100.0, 50.0, 100.0]);
        let store = FeatureStore::from_elements(&[OsmElement::node(
            1,
            46.009,
            8.0,
            &[("place", "city"), ("name", "Chur"), ("population", "37,000")],
        )]);
        let result = classify_marker(&marker_at(1), &store, &points, &LandmarkConfig::default())
            .unwrap();
        assert_eq!(result.population, 37_000);
    }

    #[test]
    fn test_classify_markers_reports_every_marker() {
        let points = profile(&[100.0, 100.0, 100.0, 100.0]);
        let markers: Vec<DistanceMarker> = (0..4).map(marker_at).collect();
        let store = FeatureStore::from_elements(&[OsmElement::way(
            1,
            46.018,
            8.0,
            &[("waterway", "river"), ("name", "Rhein")],
        )]);
        let recorder = ProgressRecorder::new();

        let classified =
            classify_markers(&markers, &store, &points, &LandmarkConfig::default(), &recorder);

        assert_eq!(recorder.history(), vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
        assert!(classified.contains_key(&2));
        // Neighbouring markers are ~1.0008 km away, just outside the radius
        assert!(!classified.contains_key(&0));
    }

    #[test]
    fn test_empty_store_classifies_nothing() {
        let points = profile(&[100.0, 100.0, 100.0]);
        let markers: Vec<DistanceMarker> = (0..3).map(marker_at).collect();
        let classified = classify_markers(
            &markers,
            &FeatureStore::empty(),
            &points,
            &LandmarkConfig::default(),
            &crate::progress::NoopObserver,
        );
        assert!(classified.is_empty());
    }
}
