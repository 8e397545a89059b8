//! Nominatim (OpenStreetMap) geocoder.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use urlencoding::encode;

use crate::errors::MarketDataError;
use crate::models::GeoPoint;
use crate::provider::GeocodingProvider;

const PROVIDER_ID: &str = "NOMINATIM";
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Upper bound for a single geocoding request.
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Geocoder backed by the public Nominatim search API.
///
/// Nominatim's usage policy requires an identifying user agent, so one must
/// be supplied by the caller.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn search_url(&self, address: &str) -> String {
        format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url.trim_end_matches('/'),
            encode(address)
        )
    }

    fn parse_places(places: &[NominatimPlace]) -> Result<Option<GeoPoint>, MarketDataError> {
        let Some(place) = places.first() else {
            return Ok(None);
        };
        let parse = |raw: &str, field: &str| {
            raw.parse::<f64>()
                .map_err(|_| MarketDataError::ValidationFailed {
                    message: format!("Invalid {} '{}' in geocoding response", field, raw),
                })
        };
        Ok(Some(GeoPoint {
            lat: parse(&place.lat, "latitude")?,
            lng: parse(&place.lon, "longitude")?,
        }))
    }
}

#[async_trait]
impl GeocodingProvider for NominatimGeocoder {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn geocode(&self, address: &str) -> Result<Option<GeoPoint>, MarketDataError> {
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }

        debug!("Geocoding '{}'", address);
        let response = self
            .client
            .get(self.search_url(address))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    MarketDataError::Network(e)
                }
            })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        Self::parse_places(&places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_address() {
        let geocoder = NominatimGeocoder::new("finboard-tests", DEFAULT_GEOCODE_TIMEOUT)
            .unwrap()
            .with_base_url("http://localhost:8080/");
        assert_eq!(
            geocoder.search_url("Cupertino, California"),
            "http://localhost:8080/search?q=Cupertino%2C%20California&format=json&limit=1"
        );
    }

    #[test]
    fn test_parse_first_place() {
        let places: Vec<NominatimPlace> = serde_json::from_str(
            r#"[{"lat":"37.3228","lon":"-122.0322","display_name":"Cupertino"},
                {"lat":"0","lon":"0"}]"#,
        )
        .unwrap();
        let point = NominatimGeocoder::parse_places(&places).unwrap().unwrap();
        assert!((point.lat - 37.3228).abs() < 1e-9);
        assert!((point.lng + 122.0322).abs() < 1e-9);
    }

    #[test]
    fn test_empty_response_is_a_miss() {
        assert_eq!(NominatimGeocoder::parse_places(&[]).unwrap(), None);
    }

    #[test]
    fn test_malformed_coordinate_fails_validation() {
        let places = vec![NominatimPlace {
            lat: "north".to_string(),
            lon: "1.0".to_string(),
        }];
        assert!(matches!(
            NominatimGeocoder::parse_places(&places),
            Err(MarketDataError::ValidationFailed { .. })
        ));
    }
}
