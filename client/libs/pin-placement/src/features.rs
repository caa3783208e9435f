//! GeoJSON feature collection fed to the map's vector layer.
//!
//! Point features carry [`PinProperties`]; the map reads them back on click to
//! tell own pins from other users' published pins.

use crate::geo::GeoPoint;
use crate::pin::PinRole;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point([f64; 2]),
    LineString(Vec<[f64; 2]>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinProperties {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(default)]
    pub is_user_post: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<PinRole>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Option<PinProperties>,
}

impl Feature {
    pub fn point(point: &GeoPoint, properties: PinProperties) -> Self {
        Self {
            geometry: Geometry::Point(point.coordinates()),
            properties: Some(properties),
        }
    }

    pub fn line(from: &GeoPoint, to: &GeoPoint) -> Self {
        Self {
            geometry: Geometry::LineString(vec![from.coordinates(), to.coordinates()]),
            properties: None,
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self.geometry, Geometry::Point(_))
    }

    pub fn is_line(&self) -> bool {
        matches!(self.geometry, Geometry::LineString(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter().filter(|f| f.is_point())
    }

    pub fn lines(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter().filter(|f| f.is_line())
    }

    /// Nearest point feature within `tolerance` degrees of `at`. A negative
    /// or non-finite tolerance hits nothing.
    pub fn hit_test(&self, at: &GeoPoint, tolerance: f64) -> Option<&PinProperties> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return None;
        }
        let mut best: Option<(f64, &PinProperties)> = None;

        for feature in &self.features {
            let (Geometry::Point([lng, lat]), Some(props)) =
                (&feature.geometry, feature.properties.as_ref())
            else {
                continue;
            };
            let Ok(point) = GeoPoint::new(*lng, *lat) else {
                continue;
            };
            let distance = point.degrees_to(at);
            if distance > tolerance {
                continue;
            }
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, props));
            }
        }

        best.map(|(_, props)| props)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
