//! Forward geocoding: convert free-text place names to coordinates.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::types::{GeocodeError, Location};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("SkyCast/", env!("CARGO_PKG_VERSION"));

/// A geocoding hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Place {
    pub fn location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
            city_name: Some(short_label(&self.label)),
        }
    }
}

/// An autocomplete entry shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub label: String,
}

impl From<&Place> for Suggestion {
    fn from(place: &Place) -> Self {
        Self {
            id: place.id.clone(),
            label: place.label.clone(),
        }
    }
}

/// Anything that can turn a query into an ordered list of places.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError>;
}

#[derive(Debug, Clone)]
pub struct GeocodeSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for GeocodeSettings {
    fn default() -> Self {
        Self {
            base_url: NOMINATIM_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    place_id: PlaceId,
    display_name: String,
    lat: String,
    lon: String,
}

/// Nominatim sends numeric ids, some mirrors send strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PlaceId {
    Number(u64),
    Text(String),
}

impl TryFrom<NominatimPlace> for Place {
    type Error = GeocodeError;

    fn try_from(raw: NominatimPlace) -> Result<Self, Self::Error> {
        let latitude = raw
            .lat
            .parse::<f64>()
            .map_err(|e| GeocodeError::Parse(format!("latitude {:?}: {}", raw.lat, e)))?;
        let longitude = raw
            .lon
            .parse::<f64>()
            .map_err(|e| GeocodeError::Parse(format!("longitude {:?}: {}", raw.lon, e)))?;
        let id = match raw.place_id {
            PlaceId::Number(n) => n.to_string(),
            PlaceId::Text(s) => s,
        };

        Ok(Self {
            id,
            label: raw.display_name,
            latitude,
            longitude,
        })
    }
}

/// Nominatim `/search` client
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    base_url: String,
}

impl GeocodeClient {
    pub fn new(settings: &GeocodeSettings) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search for places matching `query`, in the geocoder's ranking order.
    ///
    /// An empty result array is `Ok(vec![])`; a non-2xx status is
    /// `GeocodeError::Status`.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let limit = limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", limit.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Geocode search returned status {}", status);
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let raw: Vec<NominatimPlace> =
            serde_json::from_slice(&body).map_err(|e| GeocodeError::Parse(e.to_string()))?;

        raw.into_iter().map(Place::try_from).collect()
    }

    /// Resolve a city name to its best match.
    pub async fn locate(&self, city: &str) -> Result<Place, GeocodeError> {
        let place = self
            .search(city, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NotFound(city.to_string()))?;

        tracing::info!("Geocoded {:?} to {}, {}", city, place.latitude, place.longitude);
        Ok(place)
    }
}

#[async_trait]
impl PlaceLookup for GeocodeClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError> {
        GeocodeClient::search(self, query, limit).await
    }
}

/// Shorten a geocoder label for headings.
///
/// "Paris, Île-de-France, France" becomes "Paris, France": with three or
/// more parts the first and third are kept, otherwise the label is
/// re-joined as is.
pub fn short_label(label: &str) -> String {
    let parts: Vec<&str> = label
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [] => String::new(),
        [city] => (*city).to_string(),
        [city, region] => format!("{}, {}", city, region),
        [city, _, country, ..] => format!("{}, {}", city, country),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_label_single_part() {
        assert_eq!(short_label("Paris"), "Paris");
    }

    #[test]
    fn test_short_label_two_parts() {
        assert_eq!(short_label("Austin ,  Texas"), "Austin, Texas");
    }

    #[test]
    fn test_short_label_keeps_first_and_third() {
        assert_eq!(
            short_label("Paris, Île-de-France, France métropolitaine, France"),
            "Paris, France métropolitaine"
        );
        assert_eq!(short_label("Springfield, Sangamon County, Illinois"), "Springfield, Illinois");
    }

    #[test]
    fn test_short_label_empty() {
        assert_eq!(short_label(" , "), "");
    }

    #[test]
    fn test_place_from_nominatim_numeric_id() {
        let raw: NominatimPlace = serde_json::from_value(serde_json::json!({
            "place_id": 88716,
            "display_name": "Paris, France",
            "lat": "48.8588897",
            "lon": "2.3200410"
        }))
        .unwrap();
        let place = Place::try_from(raw).unwrap();
        assert_eq!(place.id, "88716");
        assert!((place.latitude - 48.8588897).abs() < 1e-9);
    }

    #[test]
    fn test_place_rejects_bad_coordinates() {
        let raw: NominatimPlace = serde_json::from_value(serde_json::json!({
            "place_id": "abc",
            "display_name": "Nowhere",
            "lat": "north",
            "lon": "2.0"
        }))
        .unwrap();
        assert!(matches!(Place::try_from(raw), Err(GeocodeError::Parse(_))));
    }

    #[test]
    fn test_place_location_uses_short_label() {
        let place = Place {
            id: "1".into(),
            label: "Lyon, Métropole de Lyon, Rhône, France".into(),
            latitude: 45.76,
            longitude: 4.83,
        };
        let loc = place.location();
        assert_eq!(loc.city_name.as_deref(), Some("Lyon, Rhône"));
    }
}
