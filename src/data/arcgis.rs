//! ArcGIS World Geocoding Service client
//!
//! This module provides the `Geocoder` abstraction used by the resolver and
//! its implementation on top of the ArcGIS `findAddressCandidates` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::{Candidate, Point};

/// Default `findAddressCandidates` endpoint of the ArcGIS World Geocoding Service
pub const ARCGIS_FIND_URL: &str =
    "https://geocode.arcgis.com/arcgis/rest/services/World/GeocodeServer/findAddressCandidates";

/// Errors that can occur when querying the geocoder
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The request did not complete within the configured timeout
    #[error("Geocoder timed out")]
    Timeout,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The service answered with an error payload
    #[error("Geocoder error {code}: {message}")]
    Service { code: i64, message: String },
}

impl From<reqwest::Error> for GeocodeError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GeocodeError::Timeout
        } else {
            GeocodeError::Http(error)
        }
    }
}

/// Anything that can turn a free-form place name into coordinates
///
/// Implementations return `Ok(None)` when the service has no match, and
/// `Err(GeocodeError::Timeout)` when the request timed out.
#[async_trait]
pub trait Geocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Candidate>, GeocodeError>;
}

/// Response from `findAddressCandidates`
#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    error: Option<ApiError>,
}

/// A single candidate from the API
#[derive(Debug, Deserialize)]
struct ApiCandidate {
    address: Option<String>,
    /// Kept loose so a malformed location reads as "no match" instead of a parse failure
    location: Option<serde_json::Value>,
    score: Option<f64>,
}

/// Error payload ArcGIS returns with a 200 status
#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Client for the ArcGIS geocoding API
#[derive(Debug, Clone)]
pub struct ArcGisClient {
    /// HTTP client carrying the request timeout
    http_client: Client,
    /// Endpoint URL (allows override for testing)
    base_url: String,
}

impl ArcGisClient {
    /// Creates a client whose requests fail with `GeocodeError::Timeout` after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, GeocodeError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: ARCGIS_FIND_URL.to_string(),
        })
    }

    /// Points the client at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Geocoder for ArcGisClient {
    async fn geocode(&self, query: &str) -> Result<Option<Candidate>, GeocodeError> {
        debug!(query, url = %self.base_url, "Querying geocoder");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("SingleLine", query),
                ("f", "json"),
                ("outFields", "Match_addr"),
                ("maxLocations", "1"),
            ])
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;

        parse_response(&text)
    }
}

/// Parses a `findAddressCandidates` body into its first candidate
///
/// # Returns
/// * `Ok(Some(Candidate))` - the first candidate has usable coordinates
/// * `Ok(None)` - no candidates, or the first one has no usable location
/// * `Err(GeocodeError)` - the body is not JSON or carries a service error
pub fn parse_response(body: &str) -> Result<Option<Candidate>, GeocodeError> {
    let response: FindResponse = serde_json::from_str(body)?;

    if let Some(error) = response.error {
        return Err(GeocodeError::Service {
            code: error.code,
            message: error.message,
        });
    }

    let Some(first) = response.candidates.into_iter().next() else {
        return Ok(None);
    };
    let location = first
        .location
        .and_then(|value| serde_json::from_value::<Point>(value).ok());

    Ok(location.map(|location| Candidate {
        location,
        address: first.address,
        score: first.score,
    }))
}
