//! FFI exports for mobile hosts.

use log::{info, warn};
use tokio::runtime::Builder;

use crate::filter::FilteredResult;
use crate::overpass::{OverpassConfig, OverpassSource};
use crate::progress::LandmarkObserver;
use crate::{
    annotate_route, annotate_route_with_store, ordered_landmarks, FeatureStore, LandmarkConfig,
    LandmarkEntry, TrackPoint,
};

/// Initialize logging for Android (only used in FFI)
#[cfg(target_os = "android")]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("RouteLandmarksRust"),
    );
}

#[cfg(not(target_os = "android"))]
fn init_logging() {
    // No-op on non-Android platforms
}

/// Callback interface for receiving classification progress.
/// Implement this in Kotlin/Swift to receive real-time updates.
#[uniffi::export(callback_interface)]
pub trait AnnotationProgressCallback: Send + Sync {
    /// Called after each marker is classified.
    /// - processed: Number of markers classified so far
    /// - total: Total number of markers
    fn on_progress(&self, processed: u32, total: u32);
}

struct CallbackObserver(Option<Box<dyn AnnotationProgressCallback>>);

impl LandmarkObserver for CallbackObserver {
    fn on_progress(&self, processed: u32, total: u32) {
        if let Some(cb) = &self.0 {
            cb.on_progress(processed, total);
        }
    }

    fn on_complete(&self, result: &FilteredResult) {
        info!("[RouteLandmarksRust] Annotation complete: {} landmarks", result.len());
    }
}

/// Get default configuration.
#[uniffi::export]
pub fn default_landmark_config() -> LandmarkConfig {
    LandmarkConfig::default()
}

/// Annotate a track, fetching features from the public Overpass instance.
///
/// Blocks the calling thread. Returns landmarks in ascending km order; an
/// empty list for tracks with fewer than two points.
#[uniffi::export]
pub fn annotate_track(points: Vec<TrackPoint>, config: LandmarkConfig) -> Vec<LandmarkEntry> {
    init_logging();
    info!("[RouteLandmarksRust] annotate_track called with {} points", points.len());
    annotate_blocking(&points, &config, &CallbackObserver(None))
}

/// Same as annotate_track but reports progress after each marker.
#[uniffi::export]
pub fn annotate_track_with_progress(
    points: Vec<TrackPoint>,
    config: LandmarkConfig,
    callback: Box<dyn AnnotationProgressCallback>,
) -> Vec<LandmarkEntry> {
    init_logging();
    info!(
        "[RouteLandmarksRust] annotate_track_with_progress called with {} points",
        points.len()
    );
    annotate_blocking(&points, &config, &CallbackObserver(Some(callback)))
}

fn annotate_blocking(
    points: &[TrackPoint],
    config: &LandmarkConfig,
    observer: &CallbackObserver,
) -> Vec<LandmarkEntry> {
    let rt = match Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            warn!("Failed to create tokio runtime: {}", e);
            return Vec::new();
        }
    };

    let result = match OverpassSource::new(OverpassConfig::default()) {
        Ok(source) => rt.block_on(annotate_route(points, &source, config, observer)),
        Err(e) => {
            // Same recovery as a failed lookup: classify against nothing
            warn!("[RouteLandmarksRust] {}, continuing without features", e);
            annotate_route_with_store(points, &FeatureStore::empty(), config, observer)
        }
    };

    match result {
        Ok(landmarks) => ordered_landmarks(&landmarks),
        Err(e) => {
            warn!("[RouteLandmarksRust] {}", e);
            Vec::new()
        }
    }
}
