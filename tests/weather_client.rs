//! Integration tests for WeatherClient using wiremock.

use weather_tui::api::WeatherClient;
use weather_tui::config::ApiConfig;
use weather_tui::error::FetchError;
use weather_tui::models::{Coordinates, UNKNOWN_CONDITION};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn paris_body() -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 2.35, "lat": 48.85 },
        "name": "Paris",
        "main": { "temp": 18.2, "feels_like": 17.5, "humidity": 60, "pressure": 1012 },
        "weather": [{ "id": 800, "main": "Clear", "description": "clear sky" }],
        "wind": { "speed": 3.1, "deg": 250 },
        "cod": 200
    })
}

fn client_for(server: &MockServer) -> WeatherClient {
    let config = ApiConfig {
        base_url: format!("{}/data/2.5/weather", server.uri()),
        api_key: "test-key".to_string(),
        timeout_secs: None,
    };
    WeatherClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_fetch_by_city_sends_query_units_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Paris"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).fetch_by_city("Paris").await.unwrap();

    assert_eq!(result.location_name, "Paris");
    assert_eq!(result.temperature, 18.2);
    assert_eq!(result.description, "clear sky");
    assert_eq!(result.feels_like, 17.5);
    assert_eq!(result.humidity, 60.0);
    assert_eq!(result.pressure, 1012.0);
    assert_eq!(result.wind_speed, 3.1);
}

#[tokio::test]
async fn test_fetch_by_city_encodes_spaces() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("q", "New York"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client_for(&server).fetch_by_city("New York").await.is_ok());
}

#[tokio::test]
async fn test_fetch_by_coordinates_sends_lat_lon() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "48.8566"))
        .and(query_param("lon", "2.3522"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
        .expect(1)
        .mount(&server)
        .await;

    let coords = Coordinates::new(48.8566, 2.3522).unwrap();
    let result = client_for(&server)
        .fetch_by_coordinates(coords)
        .await
        .unwrap();
    assert_eq!(result.location_name, "Paris");
}

#[tokio::test]
async fn test_not_found_is_status_error_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(r#"{"cod":"404","message":"city not found"}"#),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_by_city("Nonexistentville")
        .await
        .unwrap_err();

    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("city not found"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_is_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_by_city("Paris").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_malformed_json_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_by_city("Paris").await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn test_missing_wind_is_parse_error() {
    let server = MockServer::start().await;
    let mut body = paris_body();
    body.as_object_mut().unwrap().remove("wind");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_by_city("Paris").await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn test_empty_condition_array_uses_placeholder() {
    let server = MockServer::start().await;
    let mut body = paris_body();
    body["weather"] = serde_json::json!([]);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let result = client_for(&server).fetch_by_city("Paris").await.unwrap();
    assert_eq!(result.description, UNKNOWN_CONDITION);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Grab a free port, then close it so nothing is listening.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = ApiConfig {
        base_url: format!("http://127.0.0.1:{}/data/2.5/weather", port),
        api_key: "test-key".to_string(),
        timeout_secs: Some(5),
    };
    let client = WeatherClient::new(&config).unwrap();

    let err = client.fetch_by_city("Paris").await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
    assert_eq!(err.status(), None);
}
