//! End-to-end aggregation over all seven feeds.

use crate::mock_infrastructure::{
    fixtures::{
        airport_status, author_feed, flow_payload, outage_detail, outage_list, police_features,
        road_incidents, test_config, transit_feed, weather_alerts,
    },
    FeedMockBuilder,
};
use chrono::{Duration, Utc};
use pulse_core::{
    aggregator::{AggregateError, Aggregator},
    alerts::{Severity, SourceId},
    config::AppConfig,
    sources::{SourceDeps, SourceRegistry},
    upstream::CancelSignal,
};

fn aggregator(config: &AppConfig) -> Aggregator {
    let deps = SourceDeps::from_config(config).expect("deps");
    Aggregator::new(SourceRegistry::from_config(config, &deps))
}

/// Mocks every feed except the ones named in `failing`, which answer with a proxy error.
async fn mock_feeds(mocks: &mut FeedMockBuilder, failing: &[SourceId]) {
    let fails = |id: SourceId| failing.contains(&id);

    if fails(SourceId::WeatherService) {
        mocks.mock_proxy_error("/nws/alerts/active", 400, "invalid point").await;
    } else {
        let body = weather_alerts(&[
            ("wx-tornado", "Tornado Warning", "Extreme"),
            ("wx-fog", "Dense Fog Advisory", "Minor"),
        ]);
        mocks.mock_json("/nws/alerts/active", &body).await;
    }

    if fails(SourceId::AviationStatus) {
        mocks.mock_proxy_error("/faa/airport/status/RDU", 404, "airport not found").await;
    } else {
        let body = airport_status("RDU", &[("Ground Delay", "weather", "45 minutes")]);
        mocks.mock_json("/faa/airport/status/RDU", &body).await;
    }

    if fails(SourceId::PowerUtility) {
        mocks.mock_proxy_error("/duke/outages", 400, "unknown jurisdiction").await;
    } else {
        mocks.mock_json("/duke/outages", &outage_list(&[("E-1001", 1_250)])).await;
        mocks
            .mock_json("/duke/outages/outage", &outage_detail("E-1001", 1_250, "Tree on line"))
            .await;
    }

    if fails(SourceId::RoadIncidents) {
        mocks.mock_proxy_error("/ncdot/Incidents", 400, "county is required").await;
    } else {
        let body = road_incidents(&[("701", "I-440", "Vehicle Crash")]);
        mocks.mock_json("/ncdot/Incidents", &body).await;
    }

    if fails(SourceId::Transit) {
        mocks.mock_proxy_error("/transit/alerts", 403, "feed key rejected").await;
    } else {
        let body = transit_feed(&[("4411", "Route 7 detour on Wilmington St", "DETOUR")]);
        mocks.mock_json("/transit/alerts", &body).await;
    }
    let post = (
        "3kq2",
        "Route 15 is on detour due to a water main break",
        Utc::now() - Duration::minutes(30),
    );
    mocks.mock_json("/bsky/app.bsky.feed.getAuthorFeed", &author_feed(&[post])).await;

    if fails(SourceId::PoliceTraffic) {
        mocks.mock_proxy_error("/police/query", 400, "invalid where clause").await;
    } else {
        let body = police_features(&[("P24012345", "TA-PI", "Traffic Accident - Personal Injury")]);
        mocks.mock_json("/police/query", &body).await;
    }

    if fails(SourceId::RoadFlow) {
        mocks.mock_proxy_error("/here/v7/flow", 400, "invalid bbox").await;
    } else {
        mocks.mock_json("/here/v7/flow", &flow_payload("I-40 E", 12, 2.0, 20.0, 9.5)).await;
    }
}

#[tokio::test]
async fn test_all_sources_succeed() {
    let mut mocks = FeedMockBuilder::new().await;
    mock_feeds(&mut mocks, &[]).await;
    let aggregator = aggregator(&test_config(&mocks.url()));

    let result = aggregator.fetch_all(&CancelSignal::new()).await.unwrap();

    assert_eq!(result.sources.len(), 7);
    assert!(result.sources.values().all(|status| status.success && status.error.is_none()));
    assert!(result.failed_sources().is_empty());

    for id in SourceId::FEEDS {
        assert!(
            result.alerts.iter().any(|alert| alert.source == id),
            "expected at least one alert from {id}"
        );
    }

    let ids: Vec<&str> = result.alerts.iter().map(|a| a.id.as_str()).collect();
    assert!(ids.contains(&"weather-wx-tornado"));
    assert!(ids.contains(&"aviation-rdu-ground-delay"));
    assert!(ids.contains(&"power-E-1001"));
    assert!(ids.contains(&"road-incidents-701"));
    assert!(ids.contains(&"transit-4411"));
    assert!(ids.contains(&"transit-social-3kq2"));
    assert!(ids.contains(&"police-traffic-P24012345"));
    assert!(ids.contains(&"road-flow-i-40"));
}

#[tokio::test]
async fn test_sorted_result_puts_critical_first() {
    let mut mocks = FeedMockBuilder::new().await;
    mock_feeds(&mut mocks, &[]).await;
    let aggregator = aggregator(&test_config(&mocks.url()));

    let sorted = aggregator.fetch_all(&CancelSignal::new()).await.unwrap().sorted();

    assert_eq!(sorted.alerts[0].severity, Severity::Critical);
    assert!(sorted
        .alerts
        .windows(2)
        .all(|pair| pair[0].severity.rank() <= pair[1].severity.rank()));
    let fog = sorted.alerts.iter().find(|a| a.id == "weather-wx-fog").unwrap();
    assert_eq!(fog.severity, Severity::Minor);
}

#[tokio::test]
async fn test_partial_failure_keeps_other_sources() {
    let mut mocks = FeedMockBuilder::new().await;
    mock_feeds(&mut mocks, &[SourceId::AviationStatus, SourceId::RoadFlow]).await;
    let aggregator = aggregator(&test_config(&mocks.url()));

    let result = aggregator.fetch_all(&CancelSignal::new()).await.unwrap();

    assert_eq!(result.failed_sources(), vec![SourceId::AviationStatus, SourceId::RoadFlow]);
    assert_eq!(result.sources.values().filter(|s| s.success).count(), 5);

    let aviation = &result.sources[&SourceId::AviationStatus];
    assert_eq!(aviation.error.as_deref(), Some("HTTP error 404: airport not found"));
    let flow = &result.sources[&SourceId::RoadFlow];
    assert_eq!(flow.error.as_deref(), Some("HTTP error 400: invalid bbox"));

    assert!(result.alerts.iter().all(|alert| {
        alert.source != SourceId::AviationStatus && alert.source != SourceId::RoadFlow
    }));
    assert!(result.alerts.iter().any(|alert| alert.source == SourceId::WeatherService));
}

#[tokio::test]
async fn test_every_source_failing_is_still_a_result() {
    let mut mocks = FeedMockBuilder::new().await;
    mock_feeds(&mut mocks, &SourceId::FEEDS).await;
    let aggregator = aggregator(&test_config(&mocks.url()));

    let result = aggregator.fetch_all(&CancelSignal::new()).await.unwrap();

    assert!(result.alerts.is_empty());
    assert_eq!(result.failed_sources().len(), 7);
    assert!(result.sources.values().all(|s| s.error.as_deref().is_some_and(|e| !e.is_empty())));
}

#[tokio::test]
async fn test_disabled_sources_are_not_reported() {
    let mut mocks = FeedMockBuilder::new().await;
    mock_feeds(&mut mocks, &[]).await;
    let mut config = test_config(&mocks.url());
    config.sources.road_flow.enabled = false;
    config.sources.police.enabled = false;

    let result = aggregator(&config).fetch_all(&CancelSignal::new()).await.unwrap();

    assert_eq!(result.sources.len(), 5);
    assert!(!result.sources.contains_key(&SourceId::RoadFlow));
    assert!(result.alerts.iter().all(|alert| alert.source != SourceId::PoliceTraffic));
}

#[tokio::test]
async fn test_cancelled_run_returns_cancelled() {
    let mut mocks = FeedMockBuilder::new().await;
    mock_feeds(&mut mocks, &[]).await;
    let aggregator = aggregator(&test_config(&mocks.url()));

    let cancel = CancelSignal::new();
    cancel.cancel();

    let result = aggregator.fetch_all(&cancel).await;
    assert!(matches!(result, Err(AggregateError::Cancelled)));
}

#[tokio::test]
async fn test_result_serializes_for_dashboard() {
    let mut mocks = FeedMockBuilder::new().await;
    mock_feeds(&mut mocks, &[SourceId::PoliceTraffic]).await;
    let aggregator = aggregator(&test_config(&mocks.url()));

    let result = aggregator.fetch_all(&CancelSignal::new()).await.unwrap().sorted();
    let json = serde_json::to_value(&result).unwrap();

    assert!(json["fetchedAt"].is_string());
    assert_eq!(json["sources"]["police-traffic"]["success"], false);
    assert_eq!(json["sources"]["police-traffic"]["error"], "HTTP error 400: invalid where clause");
    assert_eq!(json["sources"]["weather-service"]["success"], true);
    assert_eq!(json["alerts"][0]["severity"], "critical");
}
