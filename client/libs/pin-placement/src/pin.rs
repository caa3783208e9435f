use crate::geo::{Country, GeoPoint};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Which end of the route a pin marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinRole {
    /// Home country, where the user lived before going abroad.
    Source,
    /// Country the user lives in now.
    Destination,
}

impl PinRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PinRole::Source => "source",
            PinRole::Destination => "destination",
        }
    }
}

impl fmt::Display for PinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinId(Uuid);

impl PinId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PinId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A pin the current user placed and has not published yet.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryPin {
    pub id: PinId,
    pub point: GeoPoint,
    pub country: Country,
    pub owner_id: String,
    pub role: PinRole,
    /// Logical placement order within the session, starting at 1.
    pub placed_at: u64,
}
