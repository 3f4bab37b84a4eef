//! Per-source fetch behavior against mocked proxies.

use crate::mock_infrastructure::{
    fixtures::{
        airport_status, author_feed, outage_detail, outage_list, outage_summary,
        road_incidents, test_config, transit_feed, weather_alerts, IN_AREA, OUT_OF_AREA,
    },
    FeedMockBuilder,
};
use chrono::{Duration, Utc};
use mockito::Matcher;
use pulse_core::{
    alerts::{Alert, AlertMetadata, Severity},
    config::AppConfig,
    sources::{
        AlertSource, AviationSource, PoliceSource, PowerSource, RoadIncidentsSource, SourceDeps,
        SourceError, TransitSource, WeatherSource,
    },
    upstream::{CancelSignal, UpstreamError},
};
use serde_json::json;

fn deps(config: &AppConfig) -> SourceDeps {
    SourceDeps::from_config(config).expect("deps")
}

async fn fetch(source: &dyn AlertSource) -> Result<Vec<Alert>, SourceError> {
    source.fetch(&CancelSignal::new()).await
}

fn power_detail_available(alert: &Alert) -> bool {
    match &alert.metadata {
        AlertMetadata::PowerUtility { detail_available, .. } => *detail_available,
        other => panic!("expected power metadata, got {other:?}"),
    }
}

fn event_query(event: &str) -> Matcher {
    Matcher::UrlEncoded("sourceEventNumber".into(), event.into())
}

#[tokio::test]
async fn test_power_detail_failure_falls_back_to_list_record() {
    let mut mocks = FeedMockBuilder::new().await;
    mocks.mock_json("/duke/outages", &outage_list(&[("E-1", 1_250), ("E-2", 150)])).await;
    mocks
        .mock_json_with_query(
            "/duke/outages/outage",
            event_query("E-1"),
            &outage_detail("E-1", 1_300, "Tree on line"),
        )
        .await;
    mocks
        .mock_proxy_error_with_query(
            "/duke/outages/outage",
            event_query("E-2"),
            404,
            "outage not found",
        )
        .await;

    let config = test_config(&mocks.url());
    let source = PowerSource::new(config.sources.power.clone(), deps(&config));
    let alerts = fetch(&source).await.unwrap();

    assert_eq!(alerts.len(), 2);
    let detailed = alerts.iter().find(|a| a.id == "power-E-1").unwrap();
    assert!(power_detail_available(detailed));
    assert_eq!(detailed.title, "Power outage affecting 1300 customers");
    assert!(detailed.summary.contains("Cause: Tree on line"));
    assert!(detailed.end_time.is_some());

    let fallback = alerts.iter().find(|a| a.id == "power-E-2").unwrap();
    assert!(!power_detail_available(fallback));
    assert_eq!(fallback.title, "Power outage affecting 150 customers");
    assert_eq!(fallback.severity, Severity::Moderate);
    assert!(fallback.summary.contains("Under Investigation"));
}

#[tokio::test]
async fn test_power_outages_outside_area_are_dropped() {
    let mut mocks = FeedMockBuilder::new().await;
    let list = json!({
        "data": [
            outage_summary("E-10", 400, IN_AREA),
            outage_summary("E-11", 9_000, OUT_OF_AREA),
        ],
        "errorMessages": []
    });
    mocks.mock_json("/duke/outages", &list).await;
    let details = mocks
        .mock_json_expect("/duke/outages/outage", &outage_detail("E-10", 400, "Animal"), 1)
        .await;

    let config = test_config(&mocks.url());
    let source = PowerSource::new(config.sources.power.clone(), deps(&config));
    let alerts = fetch(&source).await.unwrap();

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, "power-E-10");
    details.assert_async().await;
}

#[tokio::test]
async fn test_power_detail_fetches_are_capped() {
    let mut mocks = FeedMockBuilder::new().await;
    mocks
        .mock_json("/duke/outages", &outage_list(&[("E-20", 50), ("E-21", 2_000), ("E-22", 700)]))
        .await;
    let details = mocks
        .mock_json_expect("/duke/outages/outage", &outage_detail("E-21", 2_000, "Storm"), 2)
        .await;

    let mut config = test_config(&mocks.url());
    config.sources.power.max_detail_fetches = 2;
    let source = PowerSource::new(config.sources.power.clone(), deps(&config));
    let alerts = fetch(&source).await.unwrap();

    assert_eq!(alerts.len(), 3);
    let smallest = alerts.iter().find(|a| a.id == "power-E-20").unwrap();
    assert!(!power_detail_available(smallest));
    assert_eq!(smallest.severity, Severity::Minor);
    details.assert_async().await;
}

#[tokio::test]
async fn test_proxy_error_body_becomes_source_error() {
    let mut mocks = FeedMockBuilder::new().await;
    mocks.mock_proxy_error("/duke/outages", 400, "jurisdiction must be DEC or DEP").await;

    let config = test_config(&mocks.url());
    let source = PowerSource::new(config.sources.power.clone(), deps(&config));
    let error = fetch(&source).await.unwrap_err();

    assert!(matches!(error, SourceError::Upstream(UpstreamError::HttpError(400, _))));
    assert_eq!(error.to_string(), "HTTP error 400: jurisdiction must be DEC or DEP");
}

#[tokio::test]
async fn test_weather_skips_expired_alerts() {
    let mut mocks = FeedMockBuilder::new().await;
    let mut body = weather_alerts(&[
        ("wx-live", "Flash Flood Warning", "Severe"),
        ("wx-old", "Wind Advisory", "Moderate"),
    ]);
    body["features"][1]["properties"]["expires"] =
        json!((Utc::now() - Duration::hours(1)).to_rfc3339());
    mocks
        .mock_json_with_query(
            "/nws/alerts/active",
            Matcher::UrlEncoded("point".into(), "35.7796,-78.6382".into()),
            &body,
        )
        .await;

    let config = test_config(&mocks.url());
    let source = WeatherSource::new(config.sources.weather.clone(), deps(&config));
    let alerts = fetch(&source).await.unwrap();

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, "weather-wx-live");
    assert_eq!(alerts[0].severity, Severity::Critical);
}

#[tokio::test]
async fn test_malformed_payload_is_decode_error() {
    let mut mocks = FeedMockBuilder::new().await;
    mocks.mock_raw("/nws/alerts/active", 200, "<html>maintenance</html>").await;

    let config = test_config(&mocks.url());
    let source = WeatherSource::new(config.sources.weather.clone(), deps(&config));
    let error = fetch(&source).await.unwrap_err();

    assert!(matches!(error, SourceError::Decode(_)), "unexpected error: {error}");
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    for (status, message) in [(503, "upstream unavailable"), (429, "slow down")] {
        let mut mocks = FeedMockBuilder::new().await;
        let upstream =
            mocks.mock_proxy_error_expect("/nws/alerts/active", status, message, 3).await;

        let config = test_config(&mocks.url());
        let source = WeatherSource::new(config.sources.weather.clone(), deps(&config));
        let error = fetch(&source).await.unwrap_err();

        assert_eq!(error.to_string(), format!("HTTP error {status}: {message}"));
        upstream.assert_async().await;
    }
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let mut mocks = FeedMockBuilder::new().await;
    let upstream = mocks.mock_proxy_error_expect("/nws/alerts/active", 404, "no zone", 1).await;

    let config = test_config(&mocks.url());
    let source = WeatherSource::new(config.sources.weather.clone(), deps(&config));
    let error = fetch(&source).await.unwrap_err();

    assert_eq!(error.to_string(), "HTTP error 404: no zone");
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_aviation_fetches_every_airport() {
    let mut mocks = FeedMockBuilder::new().await;
    mocks.mock_json("/faa/airport/status/RDU", &airport_status("RDU", &[])).await;
    mocks
        .mock_json(
            "/faa/airport/status/CLT",
            &airport_status("CLT", &[("Ground Delay", "thunderstorms", "1 hour 15 minutes")]),
        )
        .await;

    let mut config = test_config(&mocks.url());
    config.sources.aviation.airports = vec!["rdu".into(), "CLT".into()];
    let source = AviationSource::new(config.sources.aviation.clone(), deps(&config));
    let alerts = fetch(&source).await.unwrap();

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, "aviation-clt-ground-delay");
    assert_eq!(alerts[0].severity, Severity::Critical);
}

#[tokio::test]
async fn test_aviation_failing_airport_fails_source() {
    let mut mocks = FeedMockBuilder::new().await;
    mocks.mock_json("/faa/airport/status/RDU", &airport_status("RDU", &[])).await;
    mocks.mock_proxy_error("/faa/airport/status/XYZ", 404, "unknown airport XYZ").await;

    let mut config = test_config(&mocks.url());
    config.sources.aviation.airports = vec!["RDU".into(), "XYZ".into()];
    let source = AviationSource::new(config.sources.aviation.clone(), deps(&config));
    let error = fetch(&source).await.unwrap_err();

    assert_eq!(error.to_string(), "HTTP error 404: unknown airport XYZ");
}

#[tokio::test]
async fn test_road_incidents_merge_counties_without_duplicates() {
    let wake =
        road_incidents(&[("701", "I-440", "Vehicle Crash"), ("702", "US-1", "Stalled Truck")]);
    let johnston = road_incidents(&[("702", "US-1", "Stalled Truck"), ("703", "NC-54", "Debris")]);
    let county = |id: &str| Matcher::UrlEncoded("county".into(), id.into());

    let mut mocks = FeedMockBuilder::new().await;
    mocks.mock_json_with_query("/ncdot/Incidents", county("92"), &wake).await;
    mocks.mock_json_with_query("/ncdot/Incidents", county("63"), &johnston).await;

    let mut config = test_config(&mocks.url());
    config.sources.road_incidents.county_ids = vec![92, 63];
    let source = RoadIncidentsSource::new(config.sources.road_incidents.clone(), deps(&config));
    let alerts = fetch(&source).await.unwrap();

    let mut ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, ["road-incidents-701", "road-incidents-702", "road-incidents-703"]);

    let crash = alerts.iter().find(|a| a.id == "road-incidents-701").unwrap();
    assert_eq!(crash.severity, Severity::Critical);
    assert_eq!(crash.title, "I-440 E: Vehicle Crash");
}

#[tokio::test]
async fn test_transit_tolerates_social_feed_failure() {
    let mut mocks = FeedMockBuilder::new().await;
    mocks
        .mock_json("/transit/alerts", &transit_feed(&[("4411", "Route 7 detour", "DETOUR")]))
        .await;
    mocks.mock_proxy_error("/bsky/app.bsky.feed.getAuthorFeed", 400, "actor not found").await;

    let config = test_config(&mocks.url());
    let source = TransitSource::new(config.sources.transit.clone(), deps(&config));
    let alerts = fetch(&source).await.unwrap();

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, "transit-4411");
}

#[tokio::test]
async fn test_transit_feed_failure_fails_source() {
    let mut mocks = FeedMockBuilder::new().await;
    mocks.mock_proxy_error("/transit/alerts", 401, "missing feed key").await;
    mocks.mock_json("/bsky/app.bsky.feed.getAuthorFeed", &author_feed(&[])).await;

    let config = test_config(&mocks.url());
    let source = TransitSource::new(config.sources.transit.clone(), deps(&config));
    let error = fetch(&source).await.unwrap_err();

    assert_eq!(error.to_string(), "HTTP error 401: missing feed key");
}

#[tokio::test]
async fn test_transit_social_posts_are_filtered() {
    let now = Utc::now();
    let mut mocks = FeedMockBuilder::new().await;
    mocks.mock_json("/transit/alerts", &transit_feed(&[])).await;
    let posts = [
        ("fresh", "Route 15 detour on Hillsborough St due to a crash", now - Duration::hours(1)),
        ("promo", "Job fair this Saturday, we're hiring drivers!", now - Duration::hours(1)),
        ("stale", "Route 4 detour on Glenwood Ave", now - Duration::hours(20)),
    ];
    mocks
        .mock_json_with_query(
            "/bsky/app.bsky.feed.getAuthorFeed",
            Matcher::AllOf(vec![
                Matcher::UrlEncoded("actor".into(), "goraleigh.bsky.social".into()),
                Matcher::UrlEncoded("limit".into(), "30".into()),
            ]),
            &author_feed(&posts),
        )
        .await;

    let config = test_config(&mocks.url());
    let source = TransitSource::new(config.sources.transit.clone(), deps(&config));
    let alerts = fetch(&source).await.unwrap();

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, "transit-social-fresh");
}

#[tokio::test]
async fn test_police_feature_service_error_is_reported() {
    let mut mocks = FeedMockBuilder::new().await;
    let body = json!({ "error": { "code": 400, "message": "Invalid query parameters" } });
    mocks.mock_json("/police/query", &body).await;

    let config = test_config(&mocks.url());
    let source = PoliceSource::new(config.sources.police.clone(), deps(&config));
    let error = fetch(&source).await.unwrap_err();

    assert!(matches!(error, SourceError::Upstream(UpstreamError::HttpError(400, _))));
    assert_eq!(error.to_string(), "HTTP error 400: Invalid query parameters");
}

#[tokio::test]
async fn test_police_query_parameters() {
    let mut mocks = FeedMockBuilder::new().await;
    mocks
        .mock_json_with_query(
            "/police/query",
            Matcher::AllOf(vec![
                Matcher::UrlEncoded("where".into(), "1=1".into()),
                Matcher::UrlEncoded("outFields".into(), "*".into()),
                Matcher::UrlEncoded("f".into(), "json".into()),
            ]),
            &json!({ "features": [] }),
        )
        .await;

    let config = test_config(&mocks.url());
    let source = PoliceSource::new(config.sources.police.clone(), deps(&config));
    assert!(fetch(&source).await.unwrap().is_empty());
}
