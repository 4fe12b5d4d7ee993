//! # Geographic Utilities
//!
//! Core geographic computation utilities for landmark annotation.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_km`] | Great-circle distance between two GPS points, in kilometres |
//! | [`compute_bounds`] | Bounding box of a set of GPS points |
//! | [`km_to_degrees`] | Convert kilometres to approximate degrees at a latitude |
//!
//! ## Example
//!
//! ```rust
//! use route_landmarks::{GpsPoint, geo_utils};
//!
//! let track = vec![
//!     GpsPoint::new(46.5000, 8.5000),
//!     GpsPoint::new(46.5090, 8.5000),
//! ];
//!
//! let dist = geo_utils::haversine_km(&track[0], &track[1]);
//! assert!((dist - 1.0).abs() < 0.01);
//!
//! let bounds = geo_utils::compute_bounds(&track).expect("non-empty");
//! assert_eq!(bounds.max_lat, 46.5090);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! Distances use the haversine formula on a sphere of radius 6,371 km.
//!
//! Reference: [Haversine formula (Wikipedia)](https://en.wikipedia.org/wiki/Haversine_formula)
//!
//! ### Coordinate System
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees).

use geo::{BoundingRect, MultiPoint, Point};

use crate::{Bounds, GpsPoint};

/// Mean Earth radius used by all distance computations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two GPS points in kilometres.
///
/// # Example
///
/// ```rust
/// use route_landmarks::{GpsPoint, geo_utils};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_km(&london, &paris);
/// assert!((distance - 343.5).abs() < 1.0);
/// ```
#[inline]
pub fn haversine_km(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlat = (p2.latitude - p1.latitude).to_radians();
    let dlng = (p2.longitude - p1.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Convert kilometres to approximate degrees at a given latitude.
///
/// Returns the larger of the latitude and longitude spans, so a square envelope
/// of this half-width always contains the circle of radius `km`. Near the poles
/// the longitude factor is clamped to keep the envelope finite.
#[inline]
pub fn km_to_degrees(km: f64, latitude: f64) -> f64 {
    let km_per_degree = EARTH_RADIUS_KM.to_radians();
    let lat_rad = latitude.to_radians();
    km / (km_per_degree * lat_rad.cos().max(0.1))
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Compute the bounding box of a set of GPS points.
///
/// Returns `None` for empty input.
///
/// # Example
///
/// ```rust
/// use route_landmarks::{GpsPoint, geo_utils};
///
/// let track = vec![
///     GpsPoint::new(51.5000, -0.1300),
///     GpsPoint::new(51.5100, -0.1200),
///     GpsPoint::new(51.5050, -0.1250),
/// ];
///
/// let bounds = geo_utils::compute_bounds(&track).unwrap();
/// assert_eq!(bounds.min_lat, 51.5000);
/// assert_eq!(bounds.max_lng, -0.1200);
/// ```
pub fn compute_bounds(points: &[GpsPoint]) -> Option<Bounds> {
    let multi: MultiPoint<f64> = points
        .iter()
        .map(|p| Point::new(p.longitude, p.latitude))
        .collect();

    multi.bounding_rect().map(|rect| Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
