//! Geographic primitives shared by the placement machine, the geocoder and the
//! wire models.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("Longitude out of range: {0}")]
    Longitude(f64),

    #[error("Latitude out of range: {0}")]
    Latitude(f64),

    #[error("Invalid country code: {0:?}")]
    CountryCode(String),
}

/// A position on the map, in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::Longitude(longitude));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::Latitude(latitude));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// GeoJSON coordinate order: `[lng, lat]`.
    pub fn coordinates(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Planar distance in degrees. Only used for click tolerance, where the
    /// distortion near the poles does not matter.
    pub fn degrees_to(&self, other: &GeoPoint) -> f64 {
        let dx = self.longitude - other.longitude;
        let dy = self.latitude - other.latitude;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.longitude, self.latitude)
    }
}

/// ISO-3166 alpha-2 code, kept lowercase (`"fr"`, `"jp"`) because that is what
/// both the geocoder and the flag CDN use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn parse(raw: &str) -> Result<Self, GeoError> {
        let trimmed = raw.trim();
        if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(GeoError::CountryCode(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercase form for display.
    pub fn iso(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl TryFrom<String> for CountryCode {
    type Error = GeoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved country: what a reverse-geocoding hit yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub code: CountryCode,
}

impl Country {
    pub fn new(name: impl Into<String>, code: CountryCode) -> Self {
        Self {
            name: name.into(),
            code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_bounds() {
        assert!(GeoPoint::new(2.35, 48.85).is_ok());
        assert!(GeoPoint::new(180.0, -90.0).is_ok());
        assert_eq!(
            GeoPoint::new(180.5, 0.0),
            Err(GeoError::Longitude(180.5))
        );
        assert_eq!(GeoPoint::new(0.0, 91.0), Err(GeoError::Latitude(91.0)));
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_coordinates_are_lng_lat() {
        let paris = GeoPoint::new(2.35, 48.85).unwrap();
        assert_eq!(paris.coordinates(), [2.35, 48.85]);
    }

    #[test]
    fn test_country_code_normalization() {
        let code = CountryCode::parse("FR").unwrap();
        assert_eq!(code.as_str(), "fr");
        assert_eq!(code.iso(), "FR");
        assert!(CountryCode::parse("fra").is_err());
        assert!(CountryCode::parse("f1").is_err());
        assert!(CountryCode::parse("").is_err());
    }

    #[test]
    fn test_country_code_serde() {
        let code: CountryCode = serde_json::from_str("\"JP\"").unwrap();
        assert_eq!(code.as_str(), "jp");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"jp\"");
        assert!(serde_json::from_str::<CountryCode>("\"Japan\"").is_err());
    }
}
