//! Nearby place search.
//!
//! `PlacesLookup` is the seam the dispatcher calls; `GooglePlacesClient` implements it against
//! the Google Places Nearby Search API.

mod google;

pub use google::{GooglePlacesClient, NearbySearchParams};

use async_trait::async_trait;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinates {
    /// `lat,lng`, the form both the places API and map links expect.
    /// Whole degrees keep their fraction (`35.0`, not `35`).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?},{:?}", self.latitude, self.longitude)
    }
}

/// One search result; a read-only view used to compose a single reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRecord {
    pub name: String,
    pub address: String,
    pub location: Coordinates,
    pub icon_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PlacesError {
    #[error("places request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("places http error: {0}")]
    Http(String),
    #[error("places response malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("places api status {status}: {message}")]
    Status { status: String, message: String },
}

/// Finds open places near a point.
#[async_trait]
pub trait PlacesLookup: Send + Sync {
    async fn nearby(&self, origin: Coordinates) -> Result<Vec<PlaceRecord>, PlacesError>;
}
