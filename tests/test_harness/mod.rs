//! Test Harness Module
//!
//! Provides infrastructure for end-to-end tests:
//! - A mock remote API server
//! - A mock OpenCage server
//! - A home controller wired to both, drawing into a recording layer

use connect_common::ApiClient;
use connect_web::home::{HomeController, HomeOptions};
use geocoding::OpenCageGeocoder;
use pin_placement::RecordingLayer;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test Environment
pub struct TestEnvironment {
    pub api: MockServer,
    pub geocoder: MockServer,
    pub home: HomeController<RecordingLayer>,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        let api = MockServer::start().await;
        let geocoder = MockServer::start().await;

        let client = ApiClient::new(&api.uri(), Duration::from_secs(5))
            .expect("Failed to build API client");
        let opencage = OpenCageGeocoder::new(
            &geocoder.uri(),
            SecretString::from("test-key".to_string()),
            Duration::from_secs(5),
        )
        .expect("Failed to build geocoder");

        let home = HomeController::new(
            RecordingLayer::new(),
            client,
            Arc::new(opencage),
            HomeOptions::default(),
        );

        Self {
            api,
            geocoder,
            home,
        }
    }

    /// Signs in user 1, who has not posted yet.
    pub async fn sign_in(&self) {
        Mock::given(method("POST"))
            .and(path("/user/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok-1",
                "user": user_json(1, false)
            })))
            .mount(&self.api)
            .await;

        self.home
            .login("user1", "pw")
            .await
            .expect("Failed to sign in");
        self.home.notifier().drain();
    }

    /// Resolves `"{lat} {lng}"` to a country.
    pub async fn land(&self, query: &str, country: &str, code: &str) {
        Mock::given(method("GET"))
            .and(path("/geocode/v1/json"))
            .and(query_param("q", query))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "components": { "country": country, "country_code": code }
                }],
                "status": { "code": 200, "message": "OK" }
            })))
            .mount(&self.geocoder)
            .await;
    }

    pub async fn ocean(&self, query: &str) {
        Mock::given(method("GET"))
            .and(path("/geocode/v1/json"))
            .and(query_param("q", query))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "components": { "body_of_water": "Pacific Ocean" } }],
                "status": { "code": 200, "message": "OK" }
            })))
            .mount(&self.geocoder)
            .await;
    }
}

pub fn user_json(id: u64, has_posted: bool) -> Value {
    json!({
        "id": id,
        "username": format!("user{}", id),
        "email": format!("user{}@example.com", id),
        "is_mentor": false,
        "profile_photo_url": "",
        "has_posted": has_posted
    })
}

pub fn post_json(id: &str, user_id: u64) -> Value {
    json!({
        "id": id,
        "message": "Came here to study.",
        "source_latitude": 48.85,
        "source_longitude": 2.35,
        "source_country": "France",
        "source_country_code": "fr",
        "destination_latitude": 35.68,
        "destination_longitude": 139.69,
        "destination_country": "Japan",
        "destination_country_code": "jp",
        "created_at": "2023-10-01T12:00:00Z",
        "user": user_json(user_id, true)
    })
}

pub fn comment_json(id: u64, message: &str, user_id: u64) -> Value {
    json!({
        "id": id,
        "message": message,
        "created_at": "2023-10-02T08:30:00Z",
        "user": user_json(user_id, false)
    })
}
