//! Overpass API backend for feature lookup.
//!
//! Sends one query per track covering mountain passes, rivers and
//! towns/cities/villages inside the bounding box. Ways are returned with their
//! centre point (`out center`). There is no retry or caching: any failure,
//! including the client timeout, comes back as a recoverable [`LandmarkError`].

use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::{LandmarkError, Result};
use crate::features::{FeatureSource, OsmElement};
use crate::Bounds;

const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Overpass backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverpassConfig {
    /// Interpreter URL.
    /// Default: the public overpass-api.de instance
    pub endpoint: String,
    /// Deadline for the whole request, including the body download.
    /// Default: 30 seconds
    pub timeout_secs: u64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Overpass response envelope
#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OsmElement>,
}

/// Build the Overpass QL query for a bounding box.
pub fn build_query(bounds: &Bounds, timeout_secs: u64) -> String {
    let bbox = format!(
        "{},{},{},{}",
        bounds.min_lat, bounds.min_lng, bounds.max_lat, bounds.max_lng
    );
    format!(
        "[out:json][timeout:{timeout}];\n\
         (\n\
         \x20 node[\"mountain_pass\"=\"yes\"]({bbox});\n\
         \x20 way[\"waterway\"=\"river\"]({bbox});\n\
         \x20 node[\"place\"~\"^(town|city|village)$\"]({bbox});\n\
         );\n\
         out center;",
        timeout = timeout_secs,
        bbox = bbox
    )
}

/// Parse an Overpass JSON body into elements, in response order.
pub fn parse_response(body: &[u8]) -> Result<Vec<OsmElement>> {
    serde_json::from_slice::<OverpassResponse>(body)
        .map(|r| r.elements)
        .map_err(|e| LandmarkError::FeatureLookup {
            message: format!("JSON parse error: {}", e),
        })
}

/// Feature source backed by an Overpass API instance.
pub struct OverpassSource {
    client: Client,
    config: OverpassConfig,
}

impl OverpassSource {
    /// Create a source with the given endpoint and timeout.
    pub fn new(config: OverpassConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("route-landmarks/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LandmarkError::FeatureLookup {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    async fn fetch(&self, bounds: Bounds) -> Result<Vec<OsmElement>> {
        let query = build_query(&bounds, self.config.timeout_secs);
        let req_start = Instant::now();
        debug!("[Overpass] Query:\n{}", query);

        let response = self
            .client
            .post(&self.config.endpoint)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let headers_elapsed = req_start.elapsed();
        let status = response.status();
        if !status.is_success() {
            return Err(LandmarkError::Http {
                message: format!("Overpass answered {}", status),
                status_code: Some(status.as_u16()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.request_error(e))?;
        let elements = parse_response(&bytes)?;

        info!(
            "[Overpass] headers={:?} body={:.1}KB total={:?} elements={}",
            headers_elapsed,
            bytes.len() as f64 / 1024.0,
            req_start.elapsed(),
            elements.len()
        );

        Ok(elements)
    }

    fn request_error(&self, e: reqwest::Error) -> LandmarkError {
        if e.is_timeout() {
            warn!("[Overpass] Timed out after {}s", self.config.timeout_secs);
            LandmarkError::Timeout {
                seconds: self.config.timeout_secs,
            }
        } else {
            LandmarkError::Http {
                message: format!("Request error: {}", e),
                status_code: e.status().map(|s| s.as_u16()),
            }
        }
    }
}

impl FeatureSource for OverpassSource {
    fn lookup(&self, bounds: Bounds) -> impl Future<Output = Result<Vec<OsmElement>>> + Send {
        self.fetch(bounds)
    }
}
