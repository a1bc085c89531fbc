//! Reverse geocoding against a Nominatim-compatible endpoint.

use crate::models::Coordinate;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Returned when the lookup itself fails.
pub const LOOKUP_FAILED: &str = "Address lookup failed";
/// Returned when the service answered without an address.
pub const ADDRESS_NOT_FOUND: &str = "Address not found";

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";
pub const DEFAULT_USER_AGENT: &str = "PinDropApp/1.0";

/// Turns a coordinate into something a person can read.
///
/// Implementations never fail: problems are folded into a placeholder string.
pub trait Geocoder: Send + Sync {
    fn resolve_address(&self, at: Coordinate) -> String;
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

/// HTTP client for the public Nominatim reverse endpoint.
pub struct NominatimClient {
    client: Client,
    endpoint: String,
}

impl NominatimClient {
    pub fn new(
        endpoint: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn request_url(&self, at: Coordinate) -> Result<Url, GeocodeError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &at.lat.to_string())
            .append_pair("lon", &at.lng.to_string());
        Ok(url)
    }

    fn lookup(&self, at: Coordinate) -> Result<Option<String>, GeocodeError> {
        let url = self.request_url(at)?;
        tracing::debug!("Reverse geocoding {}", url);

        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status()));
        }

        let body: ReverseResponse = response.json()?;
        Ok(body.display_name.filter(|name| !name.trim().is_empty()))
    }
}

impl Geocoder for NominatimClient {
    fn resolve_address(&self, at: Coordinate) -> String {
        match self.lookup(at) {
            Ok(Some(address)) => address,
            Ok(None) => ADDRESS_NOT_FOUND.to_string(),
            Err(e) => {
                tracing::warn!("Error fetching address for {}: {}", at, e);
                LOOKUP_FAILED.to_string()
            }
        }
    }
}
