//! Home screen controller
//!
//! Built once in `main` and passed to the front-end. Owns the placement
//! machine, the stores and the geocoder; nothing here is global.
//!
//! A map click runs two paths: the placement path (pins for the signed-in
//! user's own route) and the post-detail path (clicking a published pin opens
//! that post). Locks are never held across an `.await`.

use connect_common::models::{CreatePostRequest, Post, RegisterForm, RouteEnd, User};
use connect_common::{ApiClient, ApiError, Result};
use geocoding::ReverseGeocoder;
use parking_lot::Mutex;
use pin_placement::{
    ClickOutcome, Country, CountryPin, GeoPoint, IgnoreReason, MapLayer, PinProperties, PinRole,
    PlacementError, PlacementMachine, PlacementOutcome, PlacementPhase, PublishedRoute,
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::MapConfig;
use crate::mentor::MentorPanel;
use crate::notify::{NotificationCenter, Toast, ToastVariant};
use crate::sequence::RequestSequencer;
use crate::session::SessionStore;
use crate::stores::{CommentStore, PostStore};
use crate::views::{flag_url, ComposeSheet, PostSheet, RegionAlert, DEFAULT_FLAG_CDN};

/// Click radius for surfaces without their own hit testing. A few
/// kilometres, well below the distance between neighbouring capitals.
pub const DEFAULT_HIT_TOLERANCE_DEG: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct HomeOptions {
    pub flag_cdn: String,
    /// Used to hit-test clicks that arrive without pin properties.
    pub hit_tolerance_deg: f64,
}

impl Default for HomeOptions {
    fn default() -> Self {
        Self {
            flag_cdn: DEFAULT_FLAG_CDN.to_string(),
            hit_tolerance_deg: DEFAULT_HIT_TOLERANCE_DEG,
        }
    }
}

impl From<&MapConfig> for HomeOptions {
    fn from(map: &MapConfig) -> Self {
        Self {
            flag_cdn: map.flag_cdn_url.clone(),
            hit_tolerance_deg: map.hit_tolerance_deg,
        }
    }
}

/// A click as delivered by the map surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MapClick {
    pub point: GeoPoint,
    /// Properties of the rendered pin under the cursor, when the surface
    /// hit-tests itself.
    pub hit: Option<PinProperties>,
}

impl MapClick {
    pub fn at(point: GeoPoint) -> Self {
        Self { point, hit: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacementReport {
    Placed {
        role: PinRole,
        country: Country,
        phase: PlacementPhase,
    },
    OceanRejected,
    Cleared {
        removed: usize,
    },
    Ignored(IgnoreReason),
    /// A newer click superseded this one while it was being geocoded.
    Stale,
    /// The geocoder failed; logged and otherwise ignored.
    LookupFailed,
    Rejected(PlacementError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClickReport {
    pub placement: PlacementReport,
    /// Post opened by the post-detail path, if the click hit a published pin.
    pub opened_post: Option<String>,
}

pub struct HomeController<L: MapLayer> {
    machine: Mutex<PlacementMachine<L>>,
    geocoder: Arc<dyn ReverseGeocoder>,
    notifier: Arc<NotificationCenter>,
    session: Arc<SessionStore>,
    posts: PostStore,
    comments: CommentStore,
    mentors: MentorPanel,
    options: HomeOptions,
}

impl<L: MapLayer> HomeController<L> {
    pub fn new(
        layer: L,
        api: ApiClient,
        geocoder: Arc<dyn ReverseGeocoder>,
        options: HomeOptions,
    ) -> Self {
        let notifier = Arc::new(NotificationCenter::new());
        let sequencer = Arc::new(RequestSequencer::new());
        let session = Arc::new(SessionStore::new(
            api.clone(),
            notifier.clone(),
            sequencer.clone(),
        ));

        Self {
            machine: Mutex::new(PlacementMachine::new(layer)),
            geocoder,
            posts: PostStore::new(api.clone(), notifier.clone(), sequencer.clone()),
            comments: CommentStore::new(api.clone(), notifier.clone(), sequencer.clone()),
            mentors: MentorPanel::new(api, notifier.clone(), sequencer, session.clone()),
            notifier,
            session,
            options,
        }
    }

    pub fn notifier(&self) -> &NotificationCenter {
        &self.notifier
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn posts(&self) -> &PostStore {
        &self.posts
    }

    pub fn comments(&self) -> &CommentStore {
        &self.comments
    }

    pub fn mentors(&self) -> &MentorPanel {
        &self.mentors
    }

    pub fn phase(&self) -> PlacementPhase {
        self.machine.lock().phase()
    }

    /// Read access to the placement machine.
    pub fn with_machine<R>(&self, f: impl FnOnce(&PlacementMachine<L>) -> R) -> R {
        f(&self.machine.lock())
    }

    /// Starts the placement flow over. No effect once the user has posted.
    pub fn reset_placement(&self) {
        self.machine.lock().reset();
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    pub async fn register(&self, form: RegisterForm) -> Result<()> {
        self.session.register(form).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let user = self.session.login(username, password).await?;
        self.machine.lock().sign_in(user.id.clone(), user.has_posted);
        self.publish_routes();
        Ok(user)
    }

    /// Resumes a stored session.
    pub async fn restore(&self, token: SecretString) -> Result<User> {
        let user = self.session.restore(token).await?;
        self.machine.lock().sign_in(user.id.clone(), user.has_posted);
        self.publish_routes();
        Ok(user)
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.logout().await?;
        self.machine.lock().sign_out();
        self.publish_routes();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Map
    // ------------------------------------------------------------------

    /// Rendered pin within the hit tolerance of `point`, if any.
    pub fn hit_test(&self, point: &GeoPoint) -> Option<PinProperties> {
        self.machine
            .lock()
            .features()
            .hit_test(point, self.options.hit_tolerance_deg)
            .cloned()
    }

    pub async fn on_map_click(&self, click: MapClick) -> ClickReport {
        let hit = click.hit.or_else(|| self.hit_test(&click.point));

        let outcome = self.machine.lock().click(click.point, hit.as_ref());
        let placement = match outcome {
            ClickOutcome::Geocode(pending) => {
                let role = pending.role();
                match self.geocoder.reverse(pending.point()).await {
                    Ok(country) => {
                        let result = self.machine.lock().complete_placement(pending, country);
                        self.report_placement(role, result)
                    }
                    Err(e) => {
                        warn!(
                            provider = self.geocoder.name(),
                            error = %e,
                            point = %click.point,
                            "reverse geocoding failed"
                        );
                        PlacementReport::LookupFailed
                    }
                }
            }
            ClickOutcome::Cleared { removed } => PlacementReport::Cleared { removed },
            ClickOutcome::Ignored(reason) => PlacementReport::Ignored(reason),
        };

        let mut opened_post = None;
        if let Some(post_id) = hit.and_then(|props| props.post_id) {
            if self.open_post(&post_id).await.is_ok() {
                opened_post = Some(post_id);
            }
        }

        ClickReport {
            placement,
            opened_post,
        }
    }

    fn report_placement(
        &self,
        role: PinRole,
        result: std::result::Result<PlacementOutcome, PlacementError>,
    ) -> PlacementReport {
        match result {
            Ok(PlacementOutcome::Placed { pin, phase }) => {
                self.notifier.push(
                    Toast::new(format!("Setting {} country:", role), ToastVariant::Default)
                        .with_description(pin.country.name.clone())
                        .with_flag(flag_url(&self.options.flag_cdn, &pin.country.code)),
                );
                PlacementReport::Placed {
                    role,
                    country: pin.country,
                    phase,
                }
            }
            Ok(PlacementOutcome::OceanRejected) => {
                self.notifier.warning("You can't pick regions of the ocean.");
                PlacementReport::OceanRejected
            }
            Ok(PlacementOutcome::Stale) => PlacementReport::Stale,
            Err(e) => {
                warn!(error = %e, "placement rejected");
                self.notifier.warning(e.to_string());
                PlacementReport::Rejected(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------

    /// Re-fetches posts and redraws the published routes.
    pub async fn refresh_posts(&self) -> Result<usize> {
        self.posts.refresh().await?;
        Ok(self.publish_routes())
    }

    /// Publishes the user's story along the route between their two pins.
    /// On failure the pins stay so the user can try again.
    pub async fn submit_post(&self, message: &str) -> Result<()> {
        let Some((source, destination)) = self.ready_route() else {
            let err = ApiError::Validation(
                "Pick the country you came from and the one you live in first.".into(),
            );
            self.notifier.warning(err.user_message());
            return Err(err);
        };

        let request = CreatePostRequest::new(message, &source, &destination);
        self.posts.create(&request).await?;

        self.machine.lock().lock();
        info!(
            source = %source.country.name,
            destination = %destination.country.name,
            "placement locked after publishing"
        );
        let _ = self.session.refresh_user().await;
        self.publish_routes();
        Ok(())
    }

    /// Loads a post and its comments into the detail panel.
    pub async fn open_post(&self, post_id: &str) -> Result<Post> {
        let post = self.posts.open(post_id).await?;
        // The sheet still opens when comments fail; the store has notified.
        let _ = self.comments.load(post_id).await;
        debug!(post_id, "post opened");
        Ok(post)
    }

    pub fn close_post(&self) {
        self.posts.close();
        self.comments.clear();
    }

    /// Deletes the open post. Deleting the viewer's own post reopens
    /// placement once the server confirms they have no post left.
    pub async fn delete_post(&self) -> Result<()> {
        let post = self.open_post_record()?;
        self.posts.delete(&post.id).await?;
        self.comments.clear();

        let own = self
            .session
            .current_user()
            .is_some_and(|user| user.id == post.author.id);
        if own {
            if let Ok(user) = self.session.refresh_user().await {
                if !user.has_posted {
                    self.machine.lock().unlock();
                    info!(post_id = %post.id, "own post deleted; placement reopened");
                }
            }
        }
        self.publish_routes();
        Ok(())
    }

    pub async fn post_comment(&self, message: &str) -> Result<()> {
        let post = self.open_post_record()?;
        self.comments.create(&post.id, message).await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        self.comments.delete(comment_id).await
    }

    /// Loads mentor candidates for the open post.
    pub async fn load_mentors(&self) -> Result<()> {
        let post = self.open_post_record()?;
        self.mentors.load_candidates(&post.id).await.map(|_| ())
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn region_alert(&self) -> RegionAlert {
        let user = self.session.current_user();
        RegionAlert::new(user.as_ref(), self.phase())
    }

    pub fn compose_sheet(&self) -> ComposeSheet {
        let machine = self.machine.lock();
        ComposeSheet::new(
            machine.source(),
            machine.destination(),
            &self.options.flag_cdn,
        )
    }

    pub fn post_sheet(&self) -> Option<PostSheet> {
        let post = self.posts.current()?;
        let viewer = self.session.current_user();
        let candidates = if self.mentors.candidates_post_id().as_deref() == Some(post.id.as_str()) {
            self.mentors.candidates()
        } else {
            Vec::new()
        };
        Some(PostSheet::new(
            &post,
            &self.comments.comments(),
            viewer.as_ref(),
            &candidates,
            &self.options.flag_cdn,
        ))
    }

    fn ready_route(&self) -> Option<(RouteEnd, RouteEnd)> {
        let machine = self.machine.lock();
        if machine.phase() != PlacementPhase::Ready {
            return None;
        }
        let source = route_end(machine.source()?);
        let destination = route_end(machine.destination()?);
        Some((source, destination))
    }

    fn open_post_record(&self) -> Result<Post> {
        match self.posts.current() {
            Some(post) => Ok(post),
            None => {
                let err = ApiError::Validation("Open a post first.".into());
                self.notifier.warning(err.user_message());
                Err(err)
            }
        }
    }

    /// Rewrites the published layer from the post store. Returns the route count.
    fn publish_routes(&self) -> usize {
        let viewer = self.session.current_user().map(|u| u.id);
        let routes: Vec<PublishedRoute> = self
            .posts
            .posts()
            .into_iter()
            .map(|post| PublishedRoute {
                is_user_post: viewer.as_deref() == Some(post.author.id.as_str()),
                post_id: post.id,
                owner_id: post.author.id,
                source: post.source.point,
                destination: post.destination.point,
            })
            .collect();
        let count = routes.len();
        self.machine.lock().set_published_routes(routes);
        count
    }
}

fn route_end(pin: &CountryPin) -> RouteEnd {
    RouteEnd {
        point: pin.point,
        country: pin.country.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use geocoding::GeocodeError;
    use pin_placement::{CountryCode, RecordingLayer};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Resolves by longitude: east of 100 is Japan, west of -100 is ocean,
    /// anything else France. Points north of 80 are slow.
    struct TableGeocoder;

    #[async_trait]
    impl ReverseGeocoder for TableGeocoder {
        async fn reverse(&self, point: GeoPoint) -> geocoding::Result<Option<Country>> {
            if point.latitude() > 80.0 {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            if point.latitude() < -80.0 {
                return Err(GeocodeError::Transport("connection reset".into()));
            }
            let country = match point.longitude() {
                lng if lng > 100.0 => Some(("Japan", "jp")),
                lng if lng < -100.0 => None,
                _ => Some(("France", "fr")),
            };
            Ok(country.map(|(name, code)| Country::new(name, CountryCode::parse(code).unwrap())))
        }

        fn name(&self) -> &str {
            "table"
        }
    }

    fn pt(lng: f64, lat: f64) -> GeoPoint {
        GeoPoint::new(lng, lat).unwrap()
    }

    async fn signed_in(server: &MockServer) -> HomeController<RecordingLayer> {
        Mock::given(method("POST"))
            .and(path("/user/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok-1",
                "user": {"id": 1, "username": "arkan", "has_posted": false}
            })))
            .mount(server)
            .await;

        let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let home = HomeController::new(
            RecordingLayer::new(),
            api,
            Arc::new(TableGeocoder),
            HomeOptions::default(),
        );
        home.login("arkan", "pw").await.unwrap();
        home
    }

    #[tokio::test]
    async fn test_superseded_lookup_is_discarded() {
        let server = MockServer::start().await;
        let home = signed_in(&server).await;

        let (slow, fast) = tokio::join!(
            home.on_map_click(MapClick::at(pt(2.0, 85.0))),
            home.on_map_click(MapClick::at(pt(139.69, 35.68))),
        );

        assert_eq!(slow.placement, PlacementReport::Stale);
        assert!(matches!(fast.placement, PlacementReport::Placed { .. }));
        home.with_machine(|m| {
            assert_eq!(m.pins().len(), 1);
            assert_eq!(m.source().unwrap().country.name, "Japan");
        });
    }

    #[tokio::test]
    async fn test_geocoder_failure_is_swallowed() {
        let server = MockServer::start().await;
        let home = signed_in(&server).await;
        home.notifier().drain();

        let report = home.on_map_click(MapClick::at(pt(2.0, -85.0))).await;

        assert_eq!(report.placement, PlacementReport::LookupFailed);
        assert_eq!(home.phase(), PlacementPhase::AwaitingSource);
        assert!(home.notifier().is_empty());
    }

    #[tokio::test]
    async fn test_placement_toast_carries_flag() {
        let server = MockServer::start().await;
        let home = signed_in(&server).await;
        home.notifier().drain();

        home.on_map_click(MapClick::at(pt(2.35, 48.85))).await;

        let toast = home.notifier().latest().unwrap();
        assert_eq!(toast.title, "Setting source country:");
        assert_eq!(toast.description.as_deref(), Some("France"));
        assert_eq!(toast.flag.as_deref(), Some("https://flagcdn.com/48x36/fr.png"));
    }

    #[tokio::test]
    async fn test_submit_requires_ready() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/post/add/"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        let home = signed_in(&server).await;
        home.on_map_click(MapClick::at(pt(2.35, 48.85))).await;

        assert!(matches!(
            home.submit_post("hello").await,
            Err(ApiError::Validation(_))
        ));
        assert_eq!(home.phase(), PlacementPhase::AwaitingDestination);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_pins() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/post/add/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let home = signed_in(&server).await;
        home.on_map_click(MapClick::at(pt(2.35, 48.85))).await;
        home.on_map_click(MapClick::at(pt(139.69, 35.68))).await;

        assert!(home.submit_post("hello").await.is_err());
        assert_eq!(home.phase(), PlacementPhase::Ready);
        assert_eq!(home.with_machine(|m| m.pins().len()), 2);
        assert!(home.compose_sheet().can_submit());
    }

    #[tokio::test]
    async fn test_logout_resets_machine() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/logout/"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        let home = signed_in(&server).await;
        home.on_map_click(MapClick::at(pt(2.35, 48.85))).await;

        home.logout().await.unwrap();

        assert_eq!(home.phase(), PlacementPhase::AwaitingSource);
        assert!(home.with_machine(|m| m.owner_id().is_none() && m.pins().is_empty()));
        assert_eq!(
            home.region_alert().title,
            "Login to experience a different way of interacting."
        );
    }
}
