//! Distance sampling.
//!
//! Walks the track once, accumulating haversine distance between consecutive
//! points, and emits a [`DistanceMarker`] every time the running total reaches
//! the previous marker's kilometre plus the configured interval. The pass is
//! greedy: a long gap between two points yields one marker, not several.

use serde::{Deserialize, Serialize};

use crate::geo_utils::haversine_km;
use crate::TrackPoint;

/// A sampled position along the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceMarker {
    /// Cumulative distance from the start, rounded to the nearest kilometre
    pub km: u32,
    /// Index of the track point at which the marker was emitted
    pub point_index: usize,
}

/// Sample a track into kilometre markers.
///
/// The first marker is always `{ km: 0, point_index: 0 }`, even for an empty
/// or single-point track. Both fields increase strictly from one marker to
/// the next. With an interval below 1 km, a crossing that would round onto
/// the previous marker's kilometre is skipped, so sampling is never denser
/// than one marker per rounded kilometre.
pub fn sample_markers(points: &[TrackPoint], interval_km: f64) -> Vec<DistanceMarker> {
    let mut markers = vec![DistanceMarker { km: 0, point_index: 0 }];
    let mut cumulative_km = 0.0;
    let mut last_marker_km = 0.0;

    for (i, pair) in points.windows(2).enumerate() {
        cumulative_km += haversine_km(&pair[0].position(), &pair[1].position());

        if cumulative_km >= last_marker_km + interval_km {
            let km = cumulative_km.round();
            if km <= last_marker_km {
                continue;
            }
            markers.push(DistanceMarker {
                km: km as u32,
                point_index: i + 1,
            });
            last_marker_km = km;
        }
    }

    markers
}
