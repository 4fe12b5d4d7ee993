//! Feature model, store and lookup capability.
//!
//! A [`FeatureSource`] returns raw OpenStreetMap elements for a bounding box.
//! [`FeatureStore::from_elements`] splits them into passes, rivers and towns
//! using fixed tag predicates and keeps each kind in source order, since the
//! nearest-feature search breaks distance ties by that order.

use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use crate::error::Result;
use crate::geo_utils::{haversine_km, km_to_degrees};
use crate::{Bounds, GpsPoint, LandmarkKind};

/// Envelope padding so the degree box always covers the great-circle radius.
const ENVELOPE_PADDING: f64 = 1.1;

/// Poleward of this the longitude span of `km_to_degrees` is clamped and an
/// envelope query can miss features, so the layer is scanned in full.
const MAX_ENVELOPE_LATITUDE: f64 = 84.0;

// ============================================================================
// Raw elements
// ============================================================================

/// Centre point attached to way elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementCenter {
    pub lat: f64,
    pub lon: f64,
}

/// One element of an Overpass-style response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsmElement {
    #[serde(rename = "type", default)]
    pub element_type: String,
    #[serde(default)]
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<ElementCenter>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl OsmElement {
    /// Build a point element.
    pub fn node(id: i64, lat: f64, lon: f64, tags: &[(&str, &str)]) -> Self {
        Self {
            element_type: "node".to_string(),
            id,
            lat: Some(lat),
            lon: Some(lon),
            center: None,
            tags: collect_tags(tags),
        }
    }

    /// Build a way element represented by its centre point.
    pub fn way(id: i64, center_lat: f64, center_lon: f64, tags: &[(&str, &str)]) -> Self {
        Self {
            element_type: "way".to_string(),
            id,
            lat: None,
            lon: None,
            center: Some(ElementCenter { lat: center_lat, lon: center_lon }),
            tags: collect_tags(tags),
        }
    }

    /// Own coordinates first, then the way centre.
    pub fn position(&self) -> Option<GpsPoint> {
        let point = match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => GpsPoint::new(lat, lon),
            (_, _, Some(c)) => GpsPoint::new(c.lat, c.lon),
            _ => return None,
        };
        point.is_valid().then_some(point)
    }

    fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Whether this element belongs to the given feature kind.
    pub fn is_kind(&self, kind: LandmarkKind) -> bool {
        match kind {
            LandmarkKind::Pass => self.tag("mountain_pass") == Some("yes"),
            LandmarkKind::River => self.tag("waterway") == Some("river"),
            LandmarkKind::Town => matches!(self.tag("place"), Some("town" | "city" | "village")),
        }
    }
}

fn collect_tags(tags: &[(&str, &str)]) -> BTreeMap<String, String> {
    tags.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Parse a free-text population tag.
///
/// All non-digit characters are stripped first, so `"12,000"` parses as 12000.
/// Empty, missing or overflowing values count as zero.
pub fn parse_population(raw: Option<&str>) -> u64 {
    let digits: String = raw
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

// ============================================================================
// Features
// ============================================================================

/// A classification target with a usable position.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: i64,
    pub name: Option<String>,
    pub position: GpsPoint,
    /// Parsed population, zero when absent
    pub population: u64,
}

impl Feature {
    fn from_element(element: &OsmElement) -> Option<Self> {
        Some(Self {
            id: element.id,
            name: element.tag("name").map(str::to_string),
            position: element.position()?,
            population: parse_population(element.tag("population")),
        })
    }
}

/// Feature position indexed by its collection order.
#[derive(Debug, Clone, Copy)]
struct IndexedFeature {
    idx: usize,
    lat: f64,
    lng: f64,
}

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lng])
    }
}

/// Features of one kind, in source order, with a spatial index.
#[derive(Clone, Default)]
struct FeatureLayer {
    features: Vec<Feature>,
    tree: RTree<IndexedFeature>,
}

impl fmt::Debug for FeatureLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureLayer")
            .field("features", &self.features)
            .finish_non_exhaustive()
    }
}

impl FeatureLayer {
    fn new(features: Vec<Feature>) -> Self {
        let indexed: Vec<IndexedFeature> = features
            .iter()
            .enumerate()
            .map(|(idx, f)| IndexedFeature {
                idx,
                lat: f.position.latitude,
                lng: f.position.longitude,
            })
            .collect();

        Self {
            features,
            tree: RTree::bulk_load(indexed),
        }
    }

    fn nearest_within(&self, point: &GpsPoint, radius_km: f64) -> Option<(&Feature, f64)> {
        let half = km_to_degrees(radius_km, point.latitude) * ENVELOPE_PADDING;
        let wraps = point.longitude - half < -180.0 || point.longitude + half > 180.0;

        let best = if wraps || point.latitude.abs() > MAX_ENVELOPE_LATITUDE {
            self.closest(point, 0..self.features.len())
        } else {
            let envelope = AABB::from_corners(
                [point.latitude - half, point.longitude - half],
                [point.latitude + half, point.longitude + half],
            );
            self.closest(point, self.tree.locate_in_envelope(&envelope).map(|c| c.idx))
        };

        best.filter(|&(_, dist)| dist <= radius_km)
            .map(|(idx, dist)| (&self.features[idx], dist))
    }

    /// Closest candidate by haversine distance.
    fn closest(
        &self,
        point: &GpsPoint,
        candidates: impl Iterator<Item = usize>,
    ) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for idx in candidates {
            let dist = haversine_km(point, &self.features[idx].position);
            let better = match best {
                None => true,
                // Earlier collection index wins an exact tie
                Some((best_idx, best_dist)) => {
                    dist < best_dist || (dist == best_dist && idx < best_idx)
                }
            };
            if better {
                best = Some((idx, dist));
            }
        }
        best
    }
}

/// Passes, rivers and towns for one track, held read-only during classification.
#[derive(Debug, Clone, Default)]
pub struct FeatureStore {
    passes: FeatureLayer,
    rivers: FeatureLayer,
    towns: FeatureLayer,
}

impl FeatureStore {
    /// An empty store: every marker falls through to "no landmark".
    pub fn empty() -> Self {
        Self::default()
    }

    /// Split raw elements into the three kinds.
    ///
    /// Each predicate is applied independently, so an element tagged both as a
    /// pass and as a village lands in both layers. Elements without a usable
    /// position are dropped.
    pub fn from_elements(elements: &[OsmElement]) -> Self {
        let layer = |kind: LandmarkKind| {
            FeatureLayer::new(
                elements
                    .iter()
                    .filter(|e| e.is_kind(kind))
                    .filter_map(Feature::from_element)
                    .collect(),
            )
        };

        Self {
            passes: layer(LandmarkKind::Pass),
            rivers: layer(LandmarkKind::River),
            towns: layer(LandmarkKind::Town),
        }
    }

    fn layer(&self, kind: LandmarkKind) -> &FeatureLayer {
        match kind {
            LandmarkKind::Pass => &self.passes,
            LandmarkKind::River => &self.rivers,
            LandmarkKind::Town => &self.towns,
        }
    }

    /// Features of one kind, in source order.
    pub fn features(&self, kind: LandmarkKind) -> &[Feature] {
        &self.layer(kind).features
    }

    /// Nearest feature of `kind` no farther than `radius_km`, with its distance.
    pub fn nearest_within(
        &self,
        kind: LandmarkKind,
        point: &GpsPoint,
        radius_km: f64,
    ) -> Option<(&Feature, f64)> {
        self.layer(kind).nearest_within(point, radius_km)
    }

    pub fn len(&self) -> usize {
        self.passes.features.len() + self.rivers.features.len() + self.towns.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Lookup capability
// ============================================================================

/// External geodata lookup.
///
/// Implementations return every element inside `bounds`, in a stable order.
/// Errors are recovered by the pipeline as an empty result.
pub trait FeatureSource {
    fn lookup(&self, bounds: Bounds) -> impl Future<Output = Result<Vec<OsmElement>>> + Send;
}

/// Deterministic in-memory source.
///
/// Returns the stored elements that fall inside the requested bounds, in
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct StaticFeatureSource {
    elements: Vec<OsmElement>,
}

impl StaticFeatureSource {
    pub fn new(elements: Vec<OsmElement>) -> Self {
        Self { elements }
    }
}

impl FeatureSource for StaticFeatureSource {
    fn lookup(&self, bounds: Bounds) -> impl Future<Output = Result<Vec<OsmElement>>> + Send {
        let found: Vec<OsmElement> = self
            .elements
            .iter()
            .filter(|e| e.position().is_some_and(|p| bounds.contains(&p)))
            .cloned()
            .collect();
        async move { Ok(found) }
    }
}
