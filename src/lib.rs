//! # Route Landmarks
//!
//! Annotate a GPS track with a sparse list of notable landmarks (mountain passes,
//! rivers, towns) encountered along the route.
//!
//! This library provides:
//! - Distance sampling of a track into roughly one marker per kilometre
//! - Nearest-feature classification with pass > river > town precedence
//! - Local elevation peak detection (a town on a summit counts as a pass)
//! - Block deduplication and proximity collapsing into a presentation-ready set
//!
//! ## Features
//!
//! - **`http`** - Enable the Overpass backend for feature lookup
//! - **`gpx`** - Enable GPX track loading
//! - **`cli`** - Build the `route-landmarks` command line tool
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use route_landmarks::{
//!     annotate_route_with_store, FeatureStore, LandmarkConfig, NoopObserver, OsmElement,
//!     TrackPoint,
//! };
//!
//! let points: Vec<TrackPoint> = (0..30)
//!     .map(|i| TrackPoint::new(46.0 + i as f64 * 0.009, 8.0, 500.0))
//!     .collect();
//!
//! let pass = OsmElement::node(1, 46.072, 8.0, &[("mountain_pass", "yes"), ("name", "Col")]);
//! let store = FeatureStore::from_elements(&[pass]);
//!
//! let config = LandmarkConfig::default();
//! let result = annotate_route_with_store(&points, &store, &config, &NoopObserver)
//!     .expect("enough points");
//! assert_eq!(result.get(&8).map(|e| e.name.as_str()), Some("Col"));
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{LandmarkError, Result};

// Geographic utilities (distance, bounds)
pub mod geo_utils;

// Distance sampling into kilometre markers
pub mod sampler;
pub use sampler::{sample_markers, DistanceMarker};

// Feature model, store and lookup capability
pub mod features;
pub use features::{
    parse_population, Feature, FeatureSource, FeatureStore, OsmElement, StaticFeatureSource,
};

// Marker classification (nearest feature + peak override)
pub mod classify;
pub use classify::{
    classify_marker, classify_markers, is_local_peak, ClassifiedLandmark, ClassifiedMap,
};

// Block deduplication and proximity collapse
pub mod filter;
pub use filter::{collapse_close_entries, filter_landmarks, FilteredResult};

// Progress and completion reporting
pub mod progress;
pub use progress::{FnObserver, LandmarkObserver, NoopObserver, ProgressRecorder};

// Pipeline entry points
pub mod engine;
pub use engine::{annotate_route, annotate_route_with_store, lookup_bounds};

// Overpass backend for feature lookup
#[cfg(feature = "http")]
pub mod overpass;

#[cfg(feature = "http")]
pub use overpass::{OverpassConfig, OverpassSource};

// GPX input
#[cfg(feature = "gpx")]
pub mod gpx_input;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

#[cfg(feature = "ffi")]
pub mod ffi;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A recorded track point. Order along the track is significant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in metres
    pub elevation: f64,
}

impl TrackPoint {
    /// Create a new track point.
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self { latitude, longitude, elevation }
    }

    /// The horizontal position of this point.
    pub fn position(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }
}

/// Bounding box for a track or a feature query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Grow the box by `margin_deg` degrees on every side.
    pub fn expand(&self, margin_deg: f64) -> Self {
        Self {
            min_lat: self.min_lat - margin_deg,
            max_lat: self.max_lat + margin_deg,
            min_lng: self.min_lng - margin_deg,
            max_lng: self.max_lng + margin_deg,
        }
    }

    /// Check whether a point lies inside the box (edges inclusive).
    pub fn contains(&self, point: &GpsPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }
}

/// Kind of landmark reported along a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum LandmarkKind {
    Pass,
    River,
    Town,
}

impl LandmarkKind {
    /// Name used when the matched feature carries no `name` tag.
    pub fn placeholder_name(&self) -> &'static str {
        match self {
            LandmarkKind::Pass => "Unnamed Pass",
            LandmarkKind::River => "Unnamed River",
            LandmarkKind::Town => "Unnamed Town",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LandmarkKind::Pass => "pass",
            LandmarkKind::River => "river",
            LandmarkKind::Town => "town",
        }
    }
}

impl std::fmt::Display for LandmarkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Marker shared by every synthesized placeholder name.
pub const PLACEHOLDER_MARKER: &str = "Unnamed";

/// Placeholder for a town matched on a local elevation peak.
pub const PEAK_TOWN_PLACEHOLDER: &str = "Unnamed Town (Peak)";

/// A landmark attached to a kilometre marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct LandmarkEntry {
    /// Rounded cumulative distance from the start, in kilometres
    pub km: u32,
    #[serde(rename = "type")]
    pub kind: LandmarkKind,
    pub name: String,
}

impl LandmarkEntry {
    /// True when the name was synthesized rather than taken from the feature.
    pub fn is_placeholder(&self) -> bool {
        self.name.contains(PLACEHOLDER_MARKER)
    }
}

/// Configuration for landmark annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(default)]
pub struct LandmarkConfig {
    /// Cumulative distance between emitted markers, in kilometres.
    /// Default: 1.0
    pub marker_interval_km: f64,

    /// Features farther than this from a marker are never matched.
    /// Default: 1.0 km for all kinds
    pub match_radius_km: f64,

    /// Margin added on each side of the marker bounding box before lookup.
    /// Default: 0.01 degrees
    pub bbox_margin_deg: f64,

    /// Neighbours checked on each side when testing for a local elevation peak.
    /// Default: 2
    pub peak_window: u32,

    /// Width of a deduplication block. At most one landmark is kept per block.
    /// Default: 10 km
    pub block_size_km: u32,

    /// Consecutive landmarks closer than this are collapsed (the earlier one is dropped).
    /// Default: 5 km
    pub min_separation_km: u32,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            marker_interval_km: 1.0,
            match_radius_km: 1.0,
            bbox_margin_deg: 0.01,
            peak_window: 2,
            block_size_km: 10,
            min_separation_km: 5,
        }
    }
}

impl LandmarkConfig {
    /// Deduplication block index for a kilometre key.
    pub fn block_of(&self, km: u32) -> u32 {
        km / self.block_size_km.max(1)
    }
}

/// Landmarks of a finished run keyed by kilometre, in ascending order.
pub fn ordered_landmarks(result: &FilteredResult) -> Vec<LandmarkEntry> {
    result.values().cloned().collect()
}

// ============================================================================
// Tests
// ============================================================================
