//! Integration tests for `OsrmClient::durations_from` against a `wiremock`
//! stand-in for the `table` service.

use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use spotfinder_core::{Coordinate, TravelMode};
use spotfinder_osrm::{OsrmClient, OsrmError};

fn test_client(server: &MockServer) -> OsrmClient {
    OsrmClient::with_base_url(&server.uri(), 5, "spotfinder-test/0.1")
        .expect("failed to build test OsrmClient")
}

fn coord(lat: f64, lon: f64) -> Coordinate {
    Coordinate { lat, lon }
}

/// Answers with a row where destination `i` of the request is `(i + 1)`
/// minutes away.
fn row_by_position(request: &Request) -> ResponseTemplate {
    let coordinates = request
        .url
        .path()
        .rsplit('/')
        .next()
        .map_or(0, |segment| segment.split(';').count());
    let row: Vec<f64> = (0..coordinates).map(|i| i as f64 * 60.0).collect();
    ResponseTemplate::new(200).set_body_json(json!({"code": "Ok", "durations": [row]}))
}

#[tokio::test]
async fn durations_map_cells_to_destinations() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/table/v1/foot/139.7,35.6;139.71,35.61;139.72,35.62"))
        .and(query_param("sources", "0"))
        .and(query_param("annotations", "duration"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": "Ok", "durations": [[0.0, 300.0, null]]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let minutes = client
        .durations_from(
            coord(35.6, 139.7),
            &[coord(35.61, 139.71), coord(35.62, 139.72)],
            TravelMode::Walking,
        )
        .await
        .unwrap();

    assert_eq!(minutes, vec![Some(5.0), None]);
}

#[tokio::test]
async fn durations_are_requested_in_chunks_of_eighty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/table/v1/driving/"))
        .respond_with(row_by_position)
        .expect(2)
        .mount(&server)
        .await;

    let destinations: Vec<Coordinate> = (0..85)
        .map(|i| coord(35.0 + f64::from(i) * 0.001, 139.0))
        .collect();

    let client = test_client(&server);
    let minutes = client
        .durations_from(coord(35.0, 139.0), &destinations, TravelMode::Driving)
        .await
        .unwrap();

    assert_eq!(minutes.len(), 85);
    assert_eq!(minutes[0], Some(1.0));
    assert_eq!(minutes[79], Some(80.0));
    // The second chunk starts counting again from its own origin column.
    assert_eq!(minutes[80], Some(1.0));
    assert_eq!(minutes[84], Some(5.0));
}

#[tokio::test]
async fn server_error_fails_the_whole_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .durations_from(coord(35.0, 139.0), &[coord(35.1, 139.1)], TravelMode::Walking)
        .await
        .unwrap_err();

    assert!(
        matches!(err, OsrmError::UnexpectedStatus { status: 503, .. }),
        "expected UnexpectedStatus, got: {err:?}"
    );
}

#[tokio::test]
async fn non_ok_code_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(
            json!({"code": "InvalidQuery", "message": "Query string malformed"}),
        ))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .durations_from(coord(35.0, 139.0), &[coord(35.1, 139.1)], TravelMode::Walking)
        .await
        .unwrap_err();

    assert!(
        matches!(err, OsrmError::Api { ref code, .. } if code == "InvalidQuery"),
        "expected Api error, got: {err:?}"
    );
}

#[tokio::test]
async fn no_destinations_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let minutes = client
        .durations_from(coord(35.0, 139.0), &[], TravelMode::Walking)
        .await
        .unwrap();
    assert!(minutes.is_empty());
}
