//! Integration tests for the forecast pipeline using wiremock.
//!
//! These tests drive the public API end to end: HTTP payload in, derived
//! hourly series and day summaries out.

use std::sync::Arc;
use std::time::Duration;

use skycast_weather::{
    LocationQuery, LocationSources, Outcome, ReportOptions, Units, WeatherError, WeatherProvider,
    WeatherSession,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Sunday 2024-03-03T21:00:00Z
const FIRST_SAMPLE: i64 = 1_709_499_600;
const STEP: i64 = 3 * 3600;

/// Helper to create a forecast entry
fn entry(dt: i64, temp: f64, main: &str, icon: &str) -> serde_json::Value {
    serde_json::json!({
        "dt": dt,
        "main": {"temp": temp, "feels_like": temp - 1.0, "humidity": 75},
        "weather": [{"id": 800, "main": main, "description": main.to_lowercase(), "icon": icon}],
        "dt_txt": ""
    })
}

/// 40 samples starting Sunday 21:00 UTC in a UTC+1 city, so the local
/// series starts Sunday 22:00 and ends Friday 19:00.
fn forecast_payload() -> serde_json::Value {
    let list: Vec<_> = (0..40)
        .map(|i| {
            let dt = FIRST_SAMPLE + i * STEP;
            let (main, icon) = if i % 8 == 1 {
                ("Rain", "10n")
            } else {
                ("Clouds", "04d")
            };
            entry(dt, -1.5 + (i % 8) as f64 * 1.25, main, icon)
        })
        .collect();

    serde_json::json!({
        "cod": "200",
        "cnt": 40,
        "list": list,
        "city": {"id": 3143244, "name": "Oslo", "country": "NO", "timezone": 3600}
    })
}

fn provider(server: &MockServer) -> Result<WeatherProvider, WeatherError> {
    WeatherProvider::with_base_url(
        "it_key",
        Units::Metric,
        &server.uri(),
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn test_report_from_realistic_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", "Oslo"))
        .and(query_param("appid", "it_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_payload()))
        .mount(&mock_server)
        .await;

    let report = provider(&mock_server)
        .unwrap()
        .report("Oslo", &ReportOptions::default())
        .await
        .unwrap();

    // Hourly series: first 8 samples, local time labels
    assert_eq!(report.hourly.len(), 8);
    assert_eq!(report.hourly[0].time, "22:00");
    assert_eq!(report.hourly[1].time, "01:00");
    assert_eq!(report.hourly[0].temperature, -1.5);

    // Chart: first 4 of the hourly series
    assert_eq!(report.chart, report.hourly[..4].to_vec());

    // Sunday (one sample) is dropped; the next three days follow
    let days: Vec<_> = report.days.iter().map(|d| d.day.as_str()).collect();
    assert_eq!(days, ["Monday", "Tuesday", "Wednesday"]);

    for day in &report.days {
        assert!(day.min_temp <= day.max_temp);
    }

    // Monday's first local sample is 01:00 (i = 1), which is a "Rain" sample
    assert_eq!(report.days[0].condition, "Rain");
    assert_eq!(report.days[0].icon, "10n");
    // Monday covers i = 1..=8: temps -0.25 .. 7.25, then -1.5 at i = 8
    assert_eq!(report.days[0].min_temp, -2);
    assert_eq!(report.days[0].max_temp, 7);
}

#[tokio::test]
async fn test_empty_forecast_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "list": [],
            "city": {"name": "Oslo", "timezone": 3600}
        })))
        .mount(&mock_server)
        .await;

    let report = provider(&mock_server)
        .unwrap()
        .report("Oslo", &ReportOptions::default())
        .await
        .unwrap();

    assert!(report.hourly.is_empty());
    assert!(report.chart.is_empty());
    assert!(report.days.is_empty());
}

#[tokio::test]
async fn test_session_lookup_by_resolved_city() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_payload()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Oslo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Oslo",
            "dt": 1_709_640_000,
            "timezone": 3600,
            "main": {"temp": -0.4, "feels_like": -4.0, "temp_min": -2.0, "temp_max": 1.0, "humidity": 80},
            "weather": [{"main": "Snow", "description": "light snow", "icon": "13d"}],
            "wind": {"speed": 3.1},
            "sys": {"sunrise": 1_709_618_000, "sunset": 1_709_656_000}
        })))
        .mount(&mock_server)
        .await;

    let sources = LocationSources {
        default_city: Some("Oslo".to_string()),
        ..Default::default()
    };
    let query = sources.resolve().unwrap();
    assert_eq!(query, LocationQuery::City("Oslo".to_string()));

    let provider = Arc::new(provider(&mock_server).unwrap());
    let session = WeatherSession::new(provider, ReportOptions::default());
    let outcome = session.lookup(&query).await.unwrap();

    match outcome {
        Outcome::Latest(snapshot) => {
            assert_eq!(snapshot.current.condition, "Snow");
            let days = snapshot.report.map(|report| report.days.len());
            assert_eq!(days, Some(3));
        }
        Outcome::Superseded => panic!("single lookup should not be superseded"),
    }
}

#[tokio::test]
async fn test_bad_key_surfaces_as_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key."
        })))
        .mount(&mock_server)
        .await;

    let provider = Arc::new(provider(&mock_server).unwrap());
    let session = WeatherSession::new(provider, ReportOptions::default());
    let result = session.search("Oslo").await;

    assert!(matches!(result, Err(WeatherError::InvalidApiKey)));
}
