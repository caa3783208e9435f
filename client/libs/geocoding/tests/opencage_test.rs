/// OpenCage client against a mock HTTP server
use geocoding::{GeocodeError, OpenCageGeocoder, ReverseGeocoder};
use pin_placement::GeoPoint;
use secrecy::SecretString;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn geocoder(server: &MockServer) -> OpenCageGeocoder {
    OpenCageGeocoder::new(
        &server.uri(),
        SecretString::from("test-key".to_string()),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_land_resolves_to_country() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode/v1/json"))
        .and(query_param("key", "test-key"))
        .and(query_param("q", "48.85 2.35"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "components": {
                    "city": "Paris",
                    "country": "France",
                    "country_code": "fr"
                }
            }],
            "status": { "code": 200, "message": "OK" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let country = geocoder(&server)
        .reverse(GeoPoint::new(2.35, 48.85).unwrap())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(country.name, "France");
    assert_eq!(country.code.as_str(), "fr");
}

#[tokio::test]
async fn test_ocean_resolves_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode/v1/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "components": { "body_of_water": "Pacific Ocean" }
            }]
        })))
        .mount(&server)
        .await;

    let result = geocoder(&server)
        .reverse(GeoPoint::new(-150.0, 0.0).unwrap())
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_empty_results_resolve_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode/v1/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    let result = geocoder(&server)
        .reverse(GeoPoint::new(-150.0, 0.0).unwrap())
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_invalid_key_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode/v1/json"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "results": [],
            "status": { "code": 401, "message": "invalid API key" }
        })))
        .mount(&server)
        .await;

    let err = geocoder(&server)
        .reverse(GeoPoint::new(2.35, 48.85).unwrap())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        GeocodeError::Rejected {
            status: 401,
            message: "invalid API key".to_string()
        }
    );
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_error() {
    // Nothing listens on port 1.
    let geocoder = OpenCageGeocoder::new(
        "http://127.0.0.1:1",
        SecretString::from("test-key".to_string()),
        Duration::from_secs(2),
    )
    .unwrap();
    let err = geocoder
        .reverse(GeoPoint::new(2.35, 48.85).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, GeocodeError::Transport(_)));
}
