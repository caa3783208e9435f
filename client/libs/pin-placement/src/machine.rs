//! Pin-placement state machine.
//!
//! A user places a source pin (home country) then a destination pin (current
//! country). Clicking either own pin clears both. Once the user has published a
//! post the machine is locked and ignores map clicks.
//!
//! Reverse geocoding happens between [`PlacementMachine::click`] and
//! [`PlacementMachine::complete_placement`], outside the machine. Each click that
//! needs a lookup gets a sequence number; only the most recent lookup may land.

use crate::features::{Feature, FeatureCollection, PinProperties};
use crate::geo::{Country, GeoPoint};
use crate::layer::MapLayer;
use crate::pin::{CountryPin, PinId, PinRole};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Own pins allowed at once: one source, one destination.
pub const MAX_OWN_PINS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPhase {
    AwaitingSource,
    AwaitingDestination,
    Ready,
    Locked,
}

impl PlacementPhase {
    /// Role the next placed pin gets in this phase.
    pub fn next_role(&self) -> Option<PinRole> {
        match self {
            PlacementPhase::AwaitingSource => Some(PinRole::Source),
            PlacementPhase::AwaitingDestination => Some(PinRole::Destination),
            PlacementPhase::Ready | PlacementPhase::Locked => None,
        }
    }
}

impl fmt::Display for PlacementPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlacementPhase::AwaitingSource => "awaiting_source",
            PlacementPhase::AwaitingDestination => "awaiting_destination",
            PlacementPhase::Ready => "ready",
            PlacementPhase::Locked => "locked",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("source point missing; reselect source before destination")]
    SourceMissing,

    #[error("pin limit reached: {0} own pins already placed")]
    PinLimit(usize),
}

/// A published post as drawn on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedRoute {
    pub post_id: String,
    pub owner_id: String,
    pub source: GeoPoint,
    pub destination: GeoPoint,
    /// Whether the post belongs to the signed-in user.
    pub is_user_post: bool,
}

/// A click waiting for its reverse-geocoding result.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPlacement {
    seq: u64,
    point: GeoPoint,
    role: PinRole,
}

impl PendingPlacement {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn point(&self) -> GeoPoint {
        self.point
    }

    pub fn role(&self) -> PinRole {
        self.role
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    SignedOut,
    Locked,
    /// Both pins are down; only clicking one of them does anything.
    PlacementComplete,
    /// The click hit a pin that is not one of the user's in-progress pins.
    ForeignPin,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Resolve the point's country, then call `complete_placement`.
    Geocode(PendingPlacement),
    /// An own pin was clicked; all own pins and the route were removed.
    Cleared { removed: usize },
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacementOutcome {
    Placed {
        pin: CountryPin,
        phase: PlacementPhase,
    },
    /// The point resolved to no country. Nothing changed.
    OceanRejected,
    /// A newer click superseded this lookup. Nothing changed.
    Stale,
}

pub struct PlacementMachine<L: MapLayer> {
    owner_id: Option<String>,
    phase: PlacementPhase,
    pins: Vec<CountryPin>,
    published: Vec<PublishedRoute>,
    features: FeatureCollection,
    layer: L,
    last_seq: u64,
    pending: Option<u64>,
    placement_order: u64,
}

impl<L: MapLayer> PlacementMachine<L> {
    /// Signed-out machine. Map clicks are ignored until [`Self::sign_in`].
    pub fn new(layer: L) -> Self {
        let mut machine = Self {
            owner_id: None,
            phase: PlacementPhase::AwaitingSource,
            pins: Vec::new(),
            published: Vec::new(),
            features: FeatureCollection::new(),
            layer,
            last_seq: 0,
            pending: None,
            placement_order: 0,
        };
        machine.sync();
        machine
    }

    pub fn phase(&self) -> PlacementPhase {
        self.phase
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub fn pins(&self) -> &[CountryPin] {
        &self.pins
    }

    pub fn source(&self) -> Option<&CountryPin> {
        self.pin_with_role(PinRole::Source)
    }

    pub fn destination(&self) -> Option<&CountryPin> {
        self.pin_with_role(PinRole::Destination)
    }

    /// The route between own pins, source first. Present only while both exist.
    pub fn route(&self) -> Option<(GeoPoint, GeoPoint)> {
        match (self.source(), self.destination()) {
            (Some(src), Some(dest)) => Some((src.point, dest.point)),
            _ => None,
        }
    }

    pub fn features(&self) -> &FeatureCollection {
        &self.features
    }

    pub fn published_routes(&self) -> &[PublishedRoute] {
        &self.published
    }

    pub fn layer(&self) -> &L {
        &self.layer
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a placement flow for `owner_id`, locked if they already posted.
    pub fn sign_in(&mut self, owner_id: impl Into<String>, has_posted: bool) {
        self.owner_id = Some(owner_id.into());
        self.clear_own();
        self.phase = if has_posted {
            PlacementPhase::Locked
        } else {
            PlacementPhase::AwaitingSource
        };
        self.sync();
    }

    pub fn sign_out(&mut self) {
        self.owner_id = None;
        self.clear_own();
        self.phase = PlacementPhase::AwaitingSource;
        self.sync();
    }

    /// Called once the user's post is published.
    pub fn lock(&mut self) {
        self.clear_own();
        self.phase = PlacementPhase::Locked;
        self.sync();
    }

    /// Reopens placement after the user's only post was deleted.
    /// No effect unless locked.
    pub fn unlock(&mut self) {
        if self.phase != PlacementPhase::Locked {
            return;
        }
        self.clear_own();
        self.phase = PlacementPhase::AwaitingSource;
        debug!("placement unlocked");
        self.sync();
    }

    /// Restart the flow from `awaiting_source`, dropping own pins and any
    /// in-flight lookup. No effect on a locked machine.
    pub fn reset(&mut self) {
        if self.phase == PlacementPhase::Locked {
            return;
        }
        self.clear_own();
        self.phase = PlacementPhase::AwaitingSource;
        self.sync();
    }

    pub fn set_published_routes(&mut self, routes: Vec<PublishedRoute>) {
        self.published = routes;
        self.sync();
    }

    /// Routes a map click. `hit` is the pin under the cursor, if any.
    pub fn click(&mut self, at: GeoPoint, hit: Option<&PinProperties>) -> ClickOutcome {
        let Some(owner) = self.owner_id.as_deref() else {
            return ClickOutcome::Ignored(IgnoreReason::SignedOut);
        };
        if self.phase == PlacementPhase::Locked {
            return ClickOutcome::Ignored(IgnoreReason::Locked);
        }

        if let Some(props) = hit {
            if !self.is_own_pin(owner, props) {
                return ClickOutcome::Ignored(IgnoreReason::ForeignPin);
            }
            let removed = self.pins.len();
            self.pins.clear();
            self.phase = PlacementPhase::AwaitingSource;
            debug!(pin_id = %props.id, removed, "own pin clicked; placement reset");
            self.sync();
            return ClickOutcome::Cleared { removed };
        }

        let Some(role) = self.phase.next_role() else {
            return ClickOutcome::Ignored(IgnoreReason::PlacementComplete);
        };

        self.last_seq += 1;
        self.pending = Some(self.last_seq);
        debug!(seq = self.last_seq, %role, point = %at, "placement awaiting geocode");

        ClickOutcome::Geocode(PendingPlacement {
            seq: self.last_seq,
            point: at,
            role,
        })
    }

    /// Applies the reverse-geocoding result of a pending click.
    ///
    /// `None` means the point is not on land. A destination whose source pin was
    /// cleared in the meantime fails with [`PlacementError::SourceMissing`] and
    /// leaves the machine untouched.
    pub fn complete_placement(
        &mut self,
        pending: PendingPlacement,
        country: Option<Country>,
    ) -> Result<PlacementOutcome, PlacementError> {
        if self.pending != Some(pending.seq) {
            debug!(seq = pending.seq, "dropping superseded geocode result");
            return Ok(PlacementOutcome::Stale);
        }
        self.pending = None;

        let Some(country) = country else {
            return Ok(PlacementOutcome::OceanRejected);
        };

        // A clear between click and result changes the phase under the lookup.
        if self.phase.next_role() != Some(pending.role) {
            if pending.role == PinRole::Destination && self.source().is_none() {
                return Err(PlacementError::SourceMissing);
            }
            return Ok(PlacementOutcome::Stale);
        }
        if pending.role == PinRole::Destination && self.source().is_none() {
            return Err(PlacementError::SourceMissing);
        }
        if self.pins.len() >= MAX_OWN_PINS {
            return Err(PlacementError::PinLimit(self.pins.len()));
        }

        let owner_id = self.owner_id.clone().unwrap_or_default();
        self.placement_order += 1;
        let pin = CountryPin {
            id: PinId::new(),
            point: pending.point,
            country,
            owner_id,
            role: pending.role,
            placed_at: self.placement_order,
        };
        self.pins.push(pin.clone());
        self.phase = match pending.role {
            PinRole::Source => PlacementPhase::AwaitingDestination,
            PinRole::Destination => PlacementPhase::Ready,
        };
        debug!(
            role = %pin.role,
            country = %pin.country.name,
            phase = %self.phase,
            "pin placed"
        );
        self.sync();

        Ok(PlacementOutcome::Placed {
            pin,
            phase: self.phase,
        })
    }

    fn pin_with_role(&self, role: PinRole) -> Option<&CountryPin> {
        self.pins.iter().find(|pin| pin.role == role)
    }

    fn is_own_pin(&self, owner: &str, props: &PinProperties) -> bool {
        props.user_id == owner
            && props.post_id.is_none()
            && self.pins.iter().any(|pin| pin.id.to_string() == props.id)
    }

    fn clear_own(&mut self) {
        self.pins.clear();
        self.pending = None;
    }

    fn render(&self) -> FeatureCollection {
        let mut fc = FeatureCollection::new();

        for route in &self.published {
            fc.push(Feature::line(&route.source, &route.destination));
            for (role, point) in [
                (PinRole::Source, &route.source),
                (PinRole::Destination, &route.destination),
            ] {
                fc.push(Feature::point(
                    point,
                    PinProperties {
                        id: format!("{}-{}", route.post_id, role),
                        user_id: route.owner_id.clone(),
                        post_id: Some(route.post_id.clone()),
                        is_user_post: route.is_user_post,
                        role: Some(role),
                    },
                ));
            }
        }

        for pin in &self.pins {
            fc.push(Feature::point(
                &pin.point,
                PinProperties {
                    id: pin.id.to_string(),
                    user_id: pin.owner_id.clone(),
                    post_id: None,
                    is_user_post: false,
                    role: Some(pin.role),
                },
            ));
        }

        if let Some((from, to)) = self.route() {
            fc.push(Feature::line(&from, &to));
        }

        fc
    }

    fn sync(&mut self) {
        self.features = self.render();
        self.layer.set_data(&self.features);
    }
}
