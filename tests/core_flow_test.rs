//! Core Flow Integration Tests
//!
//! Purpose: Verify the pin-placement and publishing flows end to end
//! Dependencies: none (remote API and geocoder are mock servers)
//!
//! Test Coverage:
//! 1. Two land clicks place source then destination and draw the route
//! 2. Ocean clicks are rejected with a warning
//! 3. Clicking an own pin clears the placement
//! 4. Over-long posts are rejected before any request
//! 5. A created comment shows up exactly once after re-fetching
//! 6. A stale post-list response does not overwrite a newer one
//!
//! Run: cargo test --test core_flow_test

use connect_web::home::{MapClick, PlacementReport};
use pin_placement::{GeoPoint, Geometry, PlacementPhase};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod test_harness;
use test_harness::{comment_json, post_json, TestEnvironment};

fn pt(lng: f64, lat: f64) -> GeoPoint {
    GeoPoint::new(lng, lat).unwrap()
}

async fn place_route(env: &TestEnvironment) {
    env.land("48.85 2.35", "France", "fr").await;
    env.land("35.68 139.69", "Japan", "jp").await;
    env.home.on_map_click(MapClick::at(pt(2.35, 48.85))).await;
    env.home.on_map_click(MapClick::at(pt(139.69, 35.68))).await;
}

#[tokio::test]
async fn test_two_land_clicks_draw_route() {
    let env = TestEnvironment::new().await;
    env.sign_in().await;
    env.land("48.85 2.35", "France", "fr").await;
    env.land("35.68 139.69", "Japan", "jp").await;

    let first = env.home.on_map_click(MapClick::at(pt(2.35, 48.85))).await;
    assert!(matches!(
        first.placement,
        PlacementReport::Placed { ref country, phase: PlacementPhase::AwaitingDestination, .. }
            if country.name == "France"
    ));

    let second = env.home.on_map_click(MapClick::at(pt(139.69, 35.68))).await;
    assert!(matches!(
        second.placement,
        PlacementReport::Placed { ref country, phase: PlacementPhase::Ready, .. }
            if country.name == "Japan"
    ));

    env.home.with_machine(|m| {
        assert_eq!(m.route(), Some((pt(2.35, 48.85), pt(139.69, 35.68))));
        let lines: Vec<_> = m.features().lines().collect();
        assert_eq!(lines.len(), 1, "exactly one route line");
        assert_eq!(
            lines[0].geometry,
            Geometry::LineString(vec![[2.35, 48.85], [139.69, 35.68]])
        );
        // The layer received the same collection the machine holds.
        assert_eq!(m.layer().latest(), Some(m.features()));
    });

    let sheet = env.home.compose_sheet();
    assert_eq!(sheet.source.unwrap().name, "France");
    assert_eq!(
        sheet.destination.unwrap().flag_url,
        "https://flagcdn.com/48x36/jp.png"
    );
}

#[tokio::test]
async fn test_ocean_click_is_rejected() {
    let env = TestEnvironment::new().await;
    env.sign_in().await;
    env.ocean("0 -150").await;

    let report = env.home.on_map_click(MapClick::at(pt(-150.0, 0.0))).await;

    assert_eq!(report.placement, PlacementReport::OceanRejected);
    assert_eq!(env.home.phase(), PlacementPhase::AwaitingSource);
    assert!(env.home.with_machine(|m| m.pins().is_empty()));

    let toast = env.home.notifier().latest().expect("warning toast");
    assert_eq!(toast.title, "Error!");
    assert_eq!(
        toast.description.as_deref(),
        Some("You can't pick regions of the ocean.")
    );
}

#[tokio::test]
async fn test_clicking_source_pin_clears_placement() {
    let env = TestEnvironment::new().await;
    env.sign_in().await;
    place_route(&env).await;
    assert_eq!(env.home.phase(), PlacementPhase::Ready);

    let source = env.home.hit_test(&pt(2.35, 48.85)).expect("source pin");
    let report = env
        .home
        .on_map_click(MapClick {
            point: pt(2.35, 48.85),
            hit: Some(source),
        })
        .await;

    assert_eq!(report.placement, PlacementReport::Cleared { removed: 2 });
    assert_eq!(env.home.phase(), PlacementPhase::AwaitingSource);
    env.home.with_machine(|m| {
        assert!(m.pins().is_empty());
        assert_eq!(m.features().lines().count(), 0);
    });
}

#[tokio::test]
async fn test_long_post_rejected_before_network() {
    let env = TestEnvironment::new().await;
    env.sign_in().await;
    place_route(&env).await;
    Mock::given(method("POST"))
        .and(path("/post/add/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&env.api)
        .await;

    let result = env.home.submit_post(&"a".repeat(1001)).await;

    assert!(result.is_err());
    assert_eq!(env.home.phase(), PlacementPhase::Ready);
    assert_eq!(env.home.with_machine(|m| m.pins().len()), 2);
}

#[tokio::test]
async fn test_comment_round_trip() {
    let env = TestEnvironment::new().await;
    env.sign_in().await;
    Mock::given(method("GET"))
        .and(path("/post/5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"post": post_json("5", 2)})))
        .mount(&env.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/post/5/comment/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"comments": []})))
        .up_to_n_times(1)
        .mount(&env.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/post/5/comment/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "comments": [comment_json(1, "Welcome to Tokyo!", 1)]
        })))
        .mount(&env.api)
        .await;
    Mock::given(method("POST"))
        .and(path("/post/5/comment/add/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&env.api)
        .await;

    env.home.open_post("5").await.unwrap();
    assert!(env.home.comments().comments().is_empty());

    env.home.post_comment("Welcome to Tokyo!").await.unwrap();
    env.home.comments().load("5").await.unwrap();
    env.home.comments().load("5").await.unwrap();

    let sheet = env.home.post_sheet().unwrap();
    assert_eq!(sheet.comments.len(), 1);
    assert_eq!(sheet.comments[0].message, "Welcome to Tokyo!");
    assert!(sheet.comments[0].can_delete);
}

#[tokio::test]
async fn test_stale_post_list_is_discarded() {
    let env = TestEnvironment::new().await;
    Mock::given(method("GET"))
        .and(path("/post/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"posts": [post_json("old", 2)]}))
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(&env.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/post/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [post_json("new-1", 2), post_json("new-2", 3)]
        })))
        .mount(&env.api)
        .await;

    let (slow, fast) = tokio::join!(env.home.refresh_posts(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        env.home.refresh_posts().await
    });
    slow.unwrap();
    fast.unwrap();

    let ids: Vec<String> = env.home.posts().posts().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["new-1", "new-2"]);
    assert_eq!(env.home.with_machine(|m| m.published_routes().len()), 2);
}
