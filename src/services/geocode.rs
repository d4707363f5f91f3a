//! Reverse-geocoding client.
//!
//! Resolves device coordinates to a postal area via a keyless
//! reverse-geocode endpoint. An unresolvable location is `None`, not an
//! error — the UI falls back to manual postal-code entry either way.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::traits::GeocodeService;
use crate::types::PostalArea;
use crate::{PetMatchError, Result};

/// Default base URL for the reverse-geocode provider.
const DEFAULT_BASE_URL: &str = "https://api.bigdatacloud.net";

/// Client for coordinate-to-postal-code resolution.
pub struct GeocodeClient {
    http: Client,
    base_url: String,
}

impl GeocodeClient {
    /// Create a client against the default provider.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

impl Default for GeocodeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeocodeService for GeocodeClient {
    async fn reverse_lookup(&self, latitude: f64, longitude: f64) -> Result<Option<PostalArea>> {
        let url = format!("{}/data/reverse-geocode-client", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("latitude", latitude), ("longitude", longitude)])
            .query(&[("localityLanguage", "en")])
            .send()
            .await
            .map_err(|e| PetMatchError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PetMatchError::Api {
                status: status.as_u16(),
                message: format!("geocode API error: {status}"),
            });
        }

        let body: ReverseGeocodeResponse = response
            .json()
            .await
            .map_err(|e| PetMatchError::Http(e.to_string()))?;

        Ok(match (body.postcode, body.country_code) {
            (Some(postcode), country_code) if !postcode.is_empty() => Some(PostalArea {
                postal_code: postcode,
                country_code: country_code.unwrap_or_default(),
            }),
            _ => None,
        })
    }
}

#[derive(Deserialize)]
struct ReverseGeocodeResponse {
    postcode: Option<String>,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
}
