mod common;

use common::{current_payload, forecast_payload, geocode_payload, now};
use skycast_core::{
    City, Config, Coordinates, ProviderId, WeatherError, WeatherProvider, WeatherService,
    cache::ResponseCache,
    provider::{openweather::OpenWeatherProvider, provider_from_config},
    retry::RetryPolicy,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const SHANGHAI: Coordinates = Coordinates {
    lat: 31.2304,
    lon: 121.4737,
};

fn openweather(server: &MockServer) -> Box<dyn WeatherProvider> {
    Box::new(
        OpenWeatherProvider::new("TEST_KEY".to_string())
            .unwrap()
            .with_base_url(server.uri()),
    )
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(2, 1, 5)
}

async fn mount_ok(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn openweather_sends_metric_query_with_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "31.2304"))
        .and(query_param("lon", "121.4737"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let current = openweather(&server).current(&SHANGHAI).await.unwrap();
    assert_eq!(current.name, "Shanghai");
    assert_eq!(current.timezone, 8 * 3600);
}

#[tokio::test]
async fn unauthorized_maps_to_missing_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"cod":401,"message":"Invalid API key"}"#),
        )
        .mount(&server)
        .await;

    let err = openweather(&server).current(&SHANGHAI).await.unwrap_err();
    assert!(matches!(err, WeatherError::MissingApiKey(ref p) if p == "openweather"));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn rate_limit_and_server_errors_are_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let provider = openweather(&server);
    assert!(matches!(provider.current(&SHANGHAI).await, Err(WeatherError::RateLimited)));
    match provider.forecast(&SHANGHAI).await {
        Err(WeatherError::Http { status, body }) => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected http error, got {other:?}"),
    }
}

#[tokio::test]
async fn schema_change_is_a_decode_error() {
    let server = MockServer::start().await;
    mount_ok(&server, "/data/2.5/weather", serde_json::json!({"unexpected": true})).await;

    let err = openweather(&server).current(&SHANGHAI).await.unwrap_err();
    assert!(matches!(err, WeatherError::Decode { what: "current weather", .. }));
}

#[tokio::test]
async fn transient_failure_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_ok(&server, "/data/2.5/weather", current_payload()).await;
    mount_ok(&server, "/data/2.5/forecast", forecast_payload()).await;

    let service = WeatherService::new(openweather(&server)).with_retry(fast_retry());
    let snap = service.snapshot_for_coordinates(SHANGHAI, now()).await.unwrap();

    assert_eq!(snap.city_name, "Shanghai");
    assert_eq!(snap.weekly_forecast.len(), 3);

    let weather_calls = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/data/2.5/weather")
        .count();
    assert_eq!(weather_calls, 2);
}

#[tokio::test]
async fn forecast_failure_degrades_to_current_only() {
    let server = MockServer::start().await;
    mount_ok(&server, "/data/2.5/weather", current_payload()).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = WeatherService::new(openweather(&server)).with_retry(fast_retry());
    let snap = service.snapshot_for_coordinates(SHANGHAI, now()).await.unwrap();

    assert!(snap.weekly_forecast.is_empty());
    assert!(snap.hourly_forecast.is_empty());
    assert_eq!(snap.precipitation, 0.0);
    // provider's own range, clamped around the current reading
    assert_eq!((snap.temperature_min, snap.temperature_max), (21.9, 24.1));
}

#[tokio::test]
async fn current_failure_is_the_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_string("city not found"))
        .expect(1)
        .mount(&server)
        .await;
    mount_ok(&server, "/data/2.5/forecast", forecast_payload()).await;

    let service = WeatherService::new(openweather(&server)).with_retry(fast_retry());
    let err = service.snapshot_for_coordinates(SHANGHAI, now()).await.unwrap_err();
    assert!(matches!(err, WeatherError::Http { status: 404, .. }));
}

#[tokio::test]
async fn known_city_keeps_its_display_name() {
    let server = MockServer::start().await;
    mount_ok(&server, "/data/2.5/weather", current_payload()).await;
    mount_ok(&server, "/data/2.5/forecast", forecast_payload()).await;

    let service = WeatherService::new(openweather(&server));
    let city = City::new("Home", SHANGHAI.lat, SHANGHAI.lon);
    let snap = service.snapshot_for(&city, now()).await.unwrap();
    assert_eq!(snap.city_name, "Home");
}

#[tokio::test]
async fn city_lookup_geocodes_first_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Springfield"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocode_payload()))
        .mount(&server)
        .await;
    mount_ok(&server, "/data/2.5/weather", current_payload()).await;
    mount_ok(&server, "/data/2.5/forecast", forecast_payload()).await;

    let service = WeatherService::new(openweather(&server));
    let snap = service.snapshot_for_city("Springfield", now()).await.unwrap();
    assert_eq!(snap.city_name, "Springfield, Illinois");
}

#[tokio::test]
async fn unknown_city_is_no_data() {
    let server = MockServer::start().await;
    mount_ok(&server, "/geo/1.0/direct", serde_json::json!([])).await;

    let service = WeatherService::new(openweather(&server));
    let err = service.snapshot_for_city("Atlantis", now()).await.unwrap_err();
    assert!(matches!(err, WeatherError::NoData(ref q) if q == "Atlantis"));
}

#[tokio::test]
async fn search_results_are_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocode_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let service = WeatherService::new(openweather(&server)).with_cache(ResponseCache::in_memory());

    let first = service.search_cities("Springfield").await.unwrap();
    let second = service.search_cities("  springfield ").await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first[1].name, "Springfield, Missouri");
    assert_eq!(
        first.iter().map(|c| &c.name).collect::<Vec<_>>(),
        second.iter().map(|c| &c.name).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn blank_search_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocode_payload()))
        .expect(0)
        .mount(&server)
        .await;

    let service = WeatherService::new(openweather(&server));
    assert!(service.search_cities("   ").await.unwrap().is_empty());
}

#[tokio::test]
async fn weather_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_payload()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let service = WeatherService::new(openweather(&server)).with_cache(ResponseCache::in_memory());
    let first = service.snapshot_for_coordinates(SHANGHAI, now()).await.unwrap();
    let second = service.snapshot_for_coordinates(SHANGHAI, now()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn proxy_relays_without_a_key() {
    let server = MockServer::start().await;
    for (route, body) in [
        ("/api/weather", current_payload()),
        ("/api/forecast", forecast_payload()),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .and(query_param("lat", "31.2304"))
            .and(query_param("lon", "121.4737"))
            .and(query_param("units", "metric"))
            .and(query_param("lang", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("q", "Springfield"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocode_payload()))
        .mount(&server)
        .await;

    let mut config = Config {
        language: "en".to_string(),
        ..Config::default()
    };
    config.upsert_provider_base_url(ProviderId::Proxy, format!("{}/", server.uri()));
    let proxy = provider_from_config(ProviderId::Proxy, &config).unwrap();
    assert_eq!(proxy.id(), ProviderId::Proxy);
    let service = WeatherService::new(proxy);

    let snap = service.snapshot_for_coordinates(SHANGHAI, now()).await.unwrap();
    assert_eq!(snap.weekly_forecast.len(), 3);

    let cities = service.search_cities("Springfield").await.unwrap();
    assert_eq!(cities.len(), 2);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !r.url.query().unwrap_or("").contains("appid")));
}

#[tokio::test]
async fn proxy_forwards_the_configured_language() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .and(query_param("lang", "zh_cn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config {
        language: "zh_cn".to_string(),
        ..Config::default()
    };
    config.upsert_provider_base_url(ProviderId::Proxy, server.uri());
    let proxy = provider_from_config(ProviderId::Proxy, &config).unwrap();

    let current = proxy.current(&SHANGHAI).await.unwrap();
    assert_eq!(current.name, "Shanghai");
}
