//! GPX track loading.

use std::io::Read;

use crate::error::{LandmarkError, Result};
use crate::TrackPoint;

fn to_track_point(waypoint: &gpx::Waypoint) -> TrackPoint {
    let point = waypoint.point();
    TrackPoint::new(point.y(), point.x(), waypoint.elevation.unwrap_or(0.0))
}

/// Read track points from GPX content.
///
/// Uses every segment of every track in file order, falling back to route
/// points when the file has no tracks. Missing elevations read as 0 m.
pub fn load_track_points<R: Read>(reader: R) -> Result<Vec<TrackPoint>> {
    let data = gpx::read(reader).map_err(|e| LandmarkError::Gpx {
        message: format!("GPX parse error: {}", e),
    })?;

    let mut points: Vec<TrackPoint> = data
        .tracks
        .iter()
        .flat_map(|track| track.segments.iter())
        .flat_map(|segment| segment.points.iter())
        .map(to_track_point)
        .collect();

    if points.is_empty() {
        points = data
            .routes
            .iter()
            .flat_map(|route| route.points.iter())
            .map(to_track_point)
            .collect();
    }

    if points.is_empty() {
        return Err(LandmarkError::Gpx {
            message: "No track or route points found".to_string(),
        });
    }

    Ok(points)
}
