//! Google Places Nearby Search client (https://maps.googleapis.com/maps/api/place by default).

use crate::config::PlacesConfig;
use crate::places::{Coordinates, PlaceRecord, PlacesError, PlacesLookup};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Fixed filters sent with every search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearchParams {
    /// Meters.
    pub radius: u32,
    pub language: String,
    pub place_type: String,
}

impl Default for NearbySearchParams {
    fn default() -> Self {
        Self::from(&PlacesConfig::default())
    }
}

impl From<&PlacesConfig> for NearbySearchParams {
    fn from(config: &PlacesConfig) -> Self {
        Self {
            radius: config.radius,
            language: config.language.clone(),
            place_type: config.place_type.clone(),
        }
    }
}

/// Client for the Nearby Search endpoint.
#[derive(Clone)]
pub struct GooglePlacesClient {
    base_url: String,
    api_key: String,
    params: NearbySearchParams,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    name: String,
    #[serde(default)]
    vicinity: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    geometry: RawGeometry,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    location: RawLatLng,
}

#[derive(Debug, Deserialize)]
struct RawLatLng {
    lat: f64,
    lng: f64,
}

impl From<RawPlace> for PlaceRecord {
    fn from(raw: RawPlace) -> Self {
        PlaceRecord {
            name: raw.name,
            address: raw.vicinity.unwrap_or_default(),
            location: Coordinates::new(raw.geometry.location.lat, raw.geometry.location.lng),
            icon_url: raw.icon.unwrap_or_default(),
        }
    }
}

impl GooglePlacesClient {
    pub fn new(
        base_url: Option<String>,
        api_key: impl Into<String>,
        params: NearbySearchParams,
        timeout: Option<Duration>,
    ) -> Result<Self, PlacesError> {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            base_url,
            api_key: api_key.into(),
            params,
            client: builder.build()?,
        })
    }

    /// Build a client from the `places` config section and a resolved API key.
    pub fn from_config(config: &PlacesConfig, api_key: impl Into<String>) -> Result<Self, PlacesError> {
        Self::new(
            Some(config.base_url.clone()),
            api_key,
            NearbySearchParams::from(config),
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    fn query(&self, origin: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("key", self.api_key.clone()),
            ("location", origin.to_string()),
            ("radius", self.params.radius.to_string()),
            ("language", self.params.language.clone()),
            ("opennow", "true".to_string()),
            ("type", self.params.place_type.clone()),
        ]
    }

    /// GET /nearbysearch/json: places open now within the configured radius of `origin`.
    pub async fn nearby_search(&self, origin: Coordinates) -> Result<Vec<PlaceRecord>, PlacesError> {
        let url = format!("{}/nearbysearch/json", self.base_url);
        log::debug!("places search near {} (radius {}m)", origin, self.params.radius);
        let res = self
            .client
            .get(&url)
            .query(&self.query(origin))
            .send()
            .await
            .map_err(redact)?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(PlacesError::Http(format!("{} {}", status, body)));
        }
        let body = res.text().await.map_err(redact)?;
        let places = parse_nearby_response(&body)?;
        log::debug!("places search returned {} result(s)", places.len());
        Ok(places)
    }
}

/// The request URL carries the API key; keep it out of errors and logs.
fn redact(e: reqwest::Error) -> PlacesError {
    PlacesError::Request(e.without_url())
}

/// Parse a Nearby Search body. `OK` and `ZERO_RESULTS` are successes; any other status is an error.
/// Results missing a name or coordinates are skipped.
fn parse_nearby_response(body: &str) -> Result<Vec<PlaceRecord>, PlacesError> {
    let data: NearbySearchResponse = serde_json::from_str(body)?;
    match data.status.as_deref() {
        None | Some("OK") | Some("ZERO_RESULTS") => {}
        Some(other) => {
            return Err(PlacesError::Status {
                status: other.to_string(),
                message: data.error_message.unwrap_or_default(),
            });
        }
    }
    Ok(data
        .results
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<RawPlace>(v) {
            Ok(raw) if !raw.name.trim().is_empty() => Some(PlaceRecord::from(raw)),
            Ok(_) => {
                log::debug!("skipping place result without a name");
                None
            }
            Err(e) => {
                log::debug!("skipping malformed place result: {}", e);
                None
            }
        })
        .collect())
}

#[async_trait]
impl PlacesLookup for GooglePlacesClient {
    async fn nearby(&self, origin: Coordinates) -> Result<Vec<PlaceRecord>, PlacesError> {
        self.nearby_search(origin).await
    }
}
