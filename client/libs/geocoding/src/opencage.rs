//! OpenCage reverse geocoding (https://opencagedata.com/api)
//!
//! GET {base}/geocode/v1/json?q={lat}+{lng}&key={key}
//! The first result's `components.country` / `components.country_code` name the
//! country. Points at sea come back with no results, or with a result whose
//! components only carry `body_of_water`.

use crate::error::{GeocodeError, Result};
use crate::ReverseGeocoder;
use async_trait::async_trait;
use pin_placement::{Country, CountryCode, GeoPoint};
use reqwest::Client as HttpClient;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.opencagedata.com";

pub struct OpenCageGeocoder {
    client: HttpClient,
    base_url: String,
    api_key: SecretString,
}

impl OpenCageGeocoder {
    pub fn new(base_url: &str, api_key: SecretString, timeout: Duration) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeocodeError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OpenCageResponse {
    #[serde(default)]
    results: Vec<OpenCageResult>,
}

#[derive(Debug, Deserialize)]
struct OpenCageResult {
    #[serde(default)]
    components: OpenCageComponents,
}

#[derive(Debug, Default, Deserialize)]
struct OpenCageComponents {
    country: Option<String>,
    country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenCageStatus {
    status: Option<OpenCageStatusBody>,
}

#[derive(Debug, Deserialize)]
struct OpenCageStatusBody {
    message: Option<String>,
}

fn country_from(components: OpenCageComponents) -> Option<Country> {
    let name = components.country.filter(|n| !n.trim().is_empty())?;
    let raw_code = components.country_code?;
    match CountryCode::parse(&raw_code) {
        Ok(code) => Some(Country::new(name, code)),
        Err(e) => {
            warn!(country = %name, error = %e, "geocoder returned an unusable country code");
            None
        }
    }
}

#[async_trait]
impl ReverseGeocoder for OpenCageGeocoder {
    async fn reverse(&self, point: GeoPoint) -> Result<Option<Country>> {
        let url = format!("{}/geocode/v1/json", self.base_url);
        let query = format!("{} {}", point.latitude(), point.longitude());

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("key", self.api_key.expose_secret()),
                ("no_annotations", "1"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenCageStatus>(&body)
                .ok()
                .and_then(|s| s.status)
                .and_then(|s| s.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            return Err(GeocodeError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: OpenCageResponse = response.json().await?;
        let country = body
            .results
            .into_iter()
            .next()
            .and_then(|result| country_from(result.components));

        debug!(
            point = %point,
            country = country.as_ref().map(|c| c.name.as_str()).unwrap_or("-"),
            "reverse geocoded"
        );

        Ok(country)
    }

    fn name(&self) -> &str {
        "opencage"
    }
}
