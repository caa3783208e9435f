//! Pin placement for the connect-two map
//!
//! Tracks the two countries a user pins on the map (home, then current), the
//! route between them, and the GeoJSON the map layer draws.
//!
//! - `geo`: points, country codes
//! - `pin`: placed pins and their roles
//! - `features`: GeoJSON feature collection and hit testing
//! - `layer`: the map-layer sink the machine redraws through
//! - `machine`: the placement state machine

pub mod features;
pub mod geo;
pub mod layer;
pub mod machine;
pub mod pin;

pub use features::{Feature, FeatureCollection, Geometry, PinProperties};
pub use geo::{Country, CountryCode, GeoError, GeoPoint};
pub use layer::{MapLayer, RecordingLayer};
pub use machine::{
    ClickOutcome, IgnoreReason, PendingPlacement, PlacementError, PlacementMachine,
    PlacementOutcome, PlacementPhase, PublishedRoute, MAX_OWN_PINS,
};
pub use pin::{CountryPin, PinId, PinRole};
