//! Integration tests for WeatherStore using wiremock.
//!
//! These tests drive the full fetch lifecycle against a mock OpenWeatherMap.

use std::sync::Arc;
use std::time::Duration;

use habitdash_store::MemoryBlobStore;
use habitdash_weather::{FetchStatus, WeatherClient, WeatherStore};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a current-weather body
fn current_body(id: i64, name: &str, temp: f64, description: &str) -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": -0.13, "lat": 51.51},
        "weather": [{"id": 803, "main": "Clouds", "description": description, "icon": "04d"}],
        "main": {"temp": temp, "feels_like": temp - 1.0, "temp_min": temp - 2.0,
                 "temp_max": temp + 2.0, "pressure": 1012, "humidity": 70},
        "wind": {"speed": 3.0, "deg": 200},
        "clouds": {"all": 80},
        "dt": 1760616000,
        "sys": {"country": "GB", "sunrise": 1760595000, "sunset": 1760633000},
        "timezone": 3600,
        "id": id,
        "name": name
    })
}

/// Helper to create a forecast body with two slots per day for `days` days
fn forecast_body(days: i64) -> serde_json::Value {
    // 2025-10-16 00:00:00 UTC
    let day0 = 1_760_572_800_i64;
    let list: Vec<_> = (0..days)
        .flat_map(|d| {
            [9, 15].map(|h| {
                serde_json::json!({
                    "dt": day0 + d * 86_400 + h * 3600,
                    "main": {"temp": 12.0, "temp_max": 10.0 + h as f64, "temp_min": 5.0 + d as f64,
                             "humidity": 65},
                    "weather": [{"description": "scattered clouds", "icon": "03d"}],
                    "wind": {"speed": 4.1},
                    "dt_txt": ""
                })
            })
        })
        .collect();
    serde_json::json!({"list": list, "city": {"name": "London", "country": "GB"}})
}

async fn store_for(server: &MockServer) -> WeatherStore {
    let client = WeatherClient::with_base_url("test-key", &server.uri()).unwrap();
    WeatherStore::new(client, Arc::new(MemoryBlobStore::new()))
}

#[tokio::test]
async fn test_fetch_weather_success_lifecycle() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", "test-key"))
        .and(query_param("units", "metric"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body(2643743, "London", 15.0, "cloudy"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(store_for(&mock_server).await);
    let mut rx = store.subscribe();
    assert_eq!(rx.borrow().status, FetchStatus::Idle);

    let fetch = {
        let store = store.clone();
        tokio::spawn(async move { store.fetch_weather("London").await })
    };

    // Loading is observable while the request is in flight
    rx.changed().await.unwrap();
    {
        let state = rx.borrow_and_update();
        assert_eq!(state.status, FetchStatus::Loading);
        assert!(state.is_loading);
        assert!(state.error.is_none());
    }

    fetch.await.unwrap();

    let state = store.state();
    assert_eq!(state.status, FetchStatus::Success);
    assert!(!state.is_loading);
    assert!(state.error.is_none());

    let weather = state.current_weather.unwrap();
    assert_eq!(weather.temperature, 15.0);
    assert_eq!(weather.description, "cloudy");
    assert_eq!(weather.humidity, 70);
    assert_eq!(weather.wind_speed, 3.0);
    assert_eq!(weather.city, "London");
}

#[tokio::test]
async fn test_fetch_weather_not_found_keeps_previous() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(
            2643743, "London", 15.0, "cloudy",
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Atlantis"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server).await;
    store.fetch_weather("London").await;
    let before = store.current_weather();
    assert!(before.is_some());

    store.fetch_weather("Atlantis").await;

    assert_eq!(store.status(), FetchStatus::Failed);
    assert!(!store.is_loading());
    let error = store.error().unwrap();
    assert!(!error.is_empty());
    assert!(error.contains("Atlantis"), "{}", error);
    assert_eq!(store.current_weather(), before);
}

#[tokio::test]
async fn test_fetch_weather_failure_without_previous_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server).await;
    store.fetch_weather("Nowhere").await;

    assert_eq!(store.status(), FetchStatus::Failed);
    assert!(store.current_weather().is_none());
    assert!(store.error().is_some());
}

#[tokio::test]
async fn test_malformed_body_fails() {
    let mock_server = MockServer::start().await;

    let mut body = current_body(1, "London", 15.0, "cloudy");
    body["main"].as_object_mut().unwrap().remove("temp");

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server).await;
    store.fetch_weather("London").await;

    assert_eq!(store.status(), FetchStatus::Failed);
    assert!(store.current_weather().is_none());
    assert_eq!(store.error().as_deref(), Some("Received unexpected weather data."));
}

#[tokio::test]
async fn test_non_json_body_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server).await;
    store.fetch_weather("London").await;

    assert_eq!(store.status(), FetchStatus::Failed);
    assert!(store.error().is_some());
}

#[tokio::test]
async fn test_invalid_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server).await;
    store.fetch_weather("London").await;

    assert!(store.error().unwrap().contains("API key"));
}

#[tokio::test]
async fn test_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server).await;
    store.fetch_forecast("London").await;

    assert_eq!(store.status(), FetchStatus::Failed);
    assert!(store.error().unwrap().contains("unavailable"));
}

#[tokio::test]
async fn test_fetch_forecast_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(6)))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server).await;
    store.fetch_forecast("London").await;

    assert_eq!(store.status(), FetchStatus::Success);
    let forecast = store.forecast();
    assert_eq!(forecast.len(), 5);
    assert_eq!(forecast[0].temp_max, 25.0);
    assert_eq!(forecast[0].temp_min, 5.0);
    assert_eq!(forecast[4].temp_min, 9.0);
    assert_eq!(forecast[0].description, "scattered clouds");
}

#[tokio::test]
async fn test_clear_error_keeps_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(
            1, "London", 11.0, "drizzle",
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Atlantis"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server).await;
    store.fetch_weather("London").await;
    store.fetch_weather("Atlantis").await;
    assert!(store.error().is_some());

    store.clear_error();
    assert!(store.error().is_none());
    assert_eq!(store.current_weather().unwrap().temperature, 11.0);
}

#[tokio::test]
async fn test_concurrent_fetches_last_response_wins() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body(1, "London", 15.0, "cloudy"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Paris"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body(2, "Paris", 19.0, "clear sky"))
                .set_delay(Duration::from_millis(20)),
        )
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server).await;

    // Paris is requested last but London answers last
    tokio::join!(store.fetch_weather("London"), store.fetch_weather("Paris"));

    assert_eq!(store.current_weather().unwrap().city, "London");
    assert_eq!(store.status(), FetchStatus::Success);
}

#[tokio::test]
async fn test_favorite_current_city() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(
            2643743, "London", 15.0, "cloudy",
        )))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server).await;
    store.favorite_current();
    assert!(store.favorite_cities().is_empty());

    store.fetch_weather("London").await;
    store.favorite_current();
    store.favorite_current();

    let favorites = store.favorite_cities();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, "2643743");
    assert_eq!(favorites[0].name, "London");
}
