//! Address search for the location pickers.
//!
//! [`NominatimClient`] talks to a Nominatim-compatible search service.
//! [`AddressSearch`] sits in front of any [`Geocoder`] and debounces typed
//! queries: a newer query supersedes the one in flight, and closing the
//! search cancels whatever is still pending.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::api::validation::within_bounds;
use crate::config::GeocodingConfig;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed with status {0}")]
    Status(StatusCode),

    #[error("Geocoding transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A search hit: `{ lat, lon, display_name }`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Place {
    #[serde(deserialize_with = "coordinate")]
    pub lat: f64,
    #[serde(deserialize_with = "coordinate")]
    pub lon: f64,
    pub display_name: String,
    #[serde(default)]
    pub address: Option<PlaceAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlaceAddress {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl Place {
    /// `display_name (city)` with state as fallback
    pub fn label(&self) -> String {
        let locality = self
            .address
            .as_ref()
            .and_then(|a| a.city.as_deref().or(a.state.as_deref()))
            .unwrap_or("");
        format!("{} ({})", self.display_name, locality)
    }

    pub fn is_selectable(&self) -> bool {
        within_bounds(self.lat, self.lon)
    }
}

/// Nominatim sends coordinates as strings
fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Coordinates are submitted with six decimals
pub fn format_coordinate(value: f64) -> String {
    format!("{:.6}", value)
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError>;
}

pub struct NominatimClient {
    http: reqwest::Client,
    search_url: String,
    country_codes: String,
}

impl NominatimClient {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            search_url: config.search_url.trim_end_matches('/').to_string(),
            country_codes: config.country_codes.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        let url = format!("{}/search", self.search_url);
        tracing::debug!(query, "Searching address");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("format", "json"),
                ("q", query),
                ("countrycodes", self.country_codes.as_str()),
                ("addressdetails", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Address search failed");
            return Err(GeocodeError::Status(response.status()));
        }

        Ok(response.json().await?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Suggestions(Vec<Place>),
    /// Query shorter than the minimum; nothing was sent
    TooShort,
    /// A newer query replaced this one
    Superseded,
    /// The search was closed
    Cancelled,
}

/// Debounced, cancellable front for a [`Geocoder`]
pub struct AddressSearch {
    geocoder: Arc<dyn Geocoder>,
    debounce: Duration,
    min_query_len: usize,
    closed: CancellationToken,
    current: Mutex<CancellationToken>,
}

impl AddressSearch {
    pub fn new(geocoder: Arc<dyn Geocoder>, config: &GeocodingConfig) -> Self {
        let closed = CancellationToken::new();
        Self {
            geocoder,
            debounce: config.debounce(),
            min_query_len: config.min_query_len,
            current: Mutex::new(closed.child_token()),
            closed,
        }
    }

    /// Cancel the previous query and hand out a token for the next one
    fn begin(&self) -> CancellationToken {
        let mut current = self.current.lock();
        current.cancel();
        *current = self.closed.child_token();
        current.clone()
    }

    fn interrupted(&self) -> SearchOutcome {
        if self.closed.is_cancelled() {
            SearchOutcome::Cancelled
        } else {
            SearchOutcome::Superseded
        }
    }

    pub async fn search(&self, query: &str) -> Result<SearchOutcome, GeocodeError> {
        let token = self.begin();
        if token.is_cancelled() {
            return Ok(SearchOutcome::Cancelled);
        }

        if query.trim().chars().count() < self.min_query_len {
            return Ok(SearchOutcome::TooShort);
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(self.interrupted()),
            _ = tokio::time::sleep(self.debounce) => {}
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => Ok(self.interrupted()),
            result = self.geocoder.search(query.trim()) => result.map(SearchOutcome::Suggestions),
        }
    }

    /// Cancel the pending query and refuse new ones
    pub fn close(&self) {
        self.closed.cancel();
    }
}
