//! Reverse geocoding for map clicks
//!
//! Resolves a clicked point to the country it lies in. `Ok(None)` means the
//! point is not in any country (open ocean); the caller decides how to surface
//! that.

pub mod error;
pub mod opencage;

pub use error::{GeocodeError, Result};
pub use opencage::OpenCageGeocoder;

use async_trait::async_trait;
use pin_placement::{Country, GeoPoint};

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Country containing `point`, or `None` for water.
    async fn reverse(&self, point: GeoPoint) -> Result<Option<Country>>;

    /// Provider name, for logs.
    fn name(&self) -> &str;
}
