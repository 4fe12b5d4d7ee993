//! Unified error handling for the route-landmarks library.
//!
//! Only [`LandmarkError::InsufficientPoints`] ever reaches the caller of the
//! pipeline. Lookup failures are recovered by treating the feature set as empty.

use thiserror::Error;

/// Unified error type for route-landmarks operations.
#[derive(Debug, Clone, Error)]
pub enum LandmarkError {
    /// Track has too few points to sample
    #[error("Track has {point_count} points, minimum {minimum_required} required")]
    InsufficientPoints {
        point_count: usize,
        minimum_required: usize,
    },

    /// Feature lookup failed or returned an unusable payload
    #[error("Feature lookup failed: {message}")]
    FeatureLookup { message: String },

    /// Feature backend answered with a non-success status
    #[error("{}", http_message(.message, .status_code))]
    Http {
        message: String,
        status_code: Option<u16>,
    },

    /// Feature lookup exceeded its deadline
    #[error("Feature lookup timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Track file could not be read
    #[error("GPX error: {message}")]
    Gpx { message: String },
}

fn http_message(message: &str, status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!("HTTP error ({}): {}", code, message),
        None => format!("HTTP error: {}", message),
    }
}

impl LandmarkError {
    /// Whether the pipeline continues with an empty feature set after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LandmarkError::FeatureLookup { .. }
                | LandmarkError::Http { .. }
                | LandmarkError::Timeout { .. }
        )
    }
}

/// Result type alias for route-landmarks operations.
pub type Result<T> = std::result::Result<T, LandmarkError>;
