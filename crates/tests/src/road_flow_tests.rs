//! Road flow: shared response cache and daily credit accounting.

use crate::mock_infrastructure::{
    fixtures::{flow_payload, test_config},
    FeedMockBuilder,
};
use chrono::NaiveDate;
use pulse_core::{
    alerts::Severity,
    cache::{MemoryResponseCache, ResponseCache},
    config::AppConfig,
    credits::{CreditLedger, CreditState, MemoryCreditStore},
    sources::{AlertSource, ConvertContext, RoadFlowSource, SourceDeps, SourceError},
    upstream::CancelSignal,
};
use std::{sync::Arc, time::Duration};

const WARMED_KEY: &str = "road-flow:flow:bbox:-79,35.5,-78.3,36.1";

struct Harness {
    source: RoadFlowSource,
    cache: Arc<MemoryResponseCache>,
    credits: Arc<CreditLedger>,
}

fn harness(config: &AppConfig, credits: CreditLedger) -> Harness {
    let cache = Arc::new(MemoryResponseCache::new(64));
    let credits = Arc::new(credits);
    let mut deps = SourceDeps::from_config(config).expect("deps");
    deps.cache = Some(cache.clone() as Arc<dyn ResponseCache>);
    deps.credits = credits.clone();
    let source = RoadFlowSource::new(config.sources.road_flow.clone(), deps);
    Harness { source, cache, credits }
}

fn today() -> NaiveDate {
    ConvertContext::current(&AppConfig::default().location).local_date()
}

fn unused_payload() -> serde_json::Value {
    flow_payload("I-40", 1, 1.0, 1.0, 0.0)
}

#[tokio::test]
async fn test_cache_key_matches_warmer() {
    let config = test_config("http://unused");
    let h = harness(&config, CreditLedger::in_memory(10));
    assert_eq!(h.source.cache_key(), WARMED_KEY);
}

#[tokio::test]
async fn test_warmed_cache_serves_without_request_or_credits() {
    let mut mocks = FeedMockBuilder::new().await;
    let upstream = mocks.mock_json_expect("/here/v7/flow", &unused_payload(), 0).await;

    let config = test_config(&mocks.url());
    let h = harness(&config, CreditLedger::in_memory(10));
    let warmed = flow_payload("I-40 W", 12, 2.0, 20.0, 9.5).to_string();
    h.cache.put(WARMED_KEY, &warmed, Duration::from_secs(300)).await.unwrap();

    let alerts = h.source.fetch(&CancelSignal::new()).await.unwrap();

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, "road-flow-i-40");
    assert_eq!(alerts[0].severity, Severity::Critical);
    assert_eq!(h.credits.snapshot(today()).await.used, 0);
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_cache_miss_fetches_and_populates() {
    let mut mocks = FeedMockBuilder::new().await;
    let payload = flow_payload("US-1 N", 10, 2.0, 20.0, 8.0);
    let upstream = mocks.mock_json_expect("/here/v7/flow", &payload, 1).await;

    let config = test_config(&mocks.url());
    let h = harness(&config, CreditLedger::in_memory(10));

    let first = h.source.fetch(&CancelSignal::new()).await.unwrap();
    let second = h.source.fetch(&CancelSignal::new()).await.unwrap();

    let ids = |alerts: &[pulse_core::alerts::Alert]| -> Vec<String> {
        alerts.iter().map(|a| a.id.clone()).collect()
    };
    assert_eq!(ids(&first), vec!["road-flow-us-1".to_string()]);
    assert_eq!(ids(&first), ids(&second));
    assert!(h.cache.get(WARMED_KEY).await.unwrap().is_some());
    assert_eq!(h.credits.snapshot(today()).await.used, 1);
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_light_traffic_produces_no_alert() {
    let mut mocks = FeedMockBuilder::new().await;
    mocks.mock_json("/here/v7/flow", &flow_payload("I-440", 15, 18.0, 20.0, 2.0)).await;

    let config = test_config(&mocks.url());
    let h = harness(&config, CreditLedger::in_memory(10));

    assert!(h.source.fetch(&CancelSignal::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_exhausted_credits_skip_request() {
    let mut mocks = FeedMockBuilder::new().await;
    let upstream = mocks.mock_json_expect("/here/v7/flow", &unused_payload(), 0).await;

    let config = test_config(&mocks.url());
    let store = MemoryCreditStore::with_state(CreditState { date: today(), used: 5, requests: 5 });
    let h = harness(&config, CreditLedger::new(Arc::new(store), 5));

    let error = h.source.fetch(&CancelSignal::new()).await.unwrap_err();

    assert!(matches!(error, SourceError::QuotaExhausted { used: 5, limit: 5 }));
    assert!(h.cache.get(WARMED_KEY).await.unwrap().is_none());
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_credits_from_previous_day_are_reset() {
    let mut mocks = FeedMockBuilder::new().await;
    mocks.mock_json("/here/v7/flow", &flow_payload("I-40", 12, 2.0, 20.0, 9.5)).await;

    let config = test_config(&mocks.url());
    let yesterday = today().pred_opt().unwrap();
    let stored = CreditState { date: yesterday, used: 5, requests: 5 };
    let store = MemoryCreditStore::with_state(stored);
    let h = harness(&config, CreditLedger::new(Arc::new(store), 5));

    let alerts = h.source.fetch(&CancelSignal::new()).await.unwrap();

    assert_eq!(alerts.len(), 1);
    let state = h.credits.snapshot(today()).await;
    assert_eq!(state, CreditState { date: today(), used: 1, requests: 1 });
}

#[tokio::test]
async fn test_upstream_failure_is_not_cached() {
    let mut mocks = FeedMockBuilder::new().await;
    mocks.mock_proxy_error("/here/v7/flow", 401, "invalid apiKey").await;

    let config = test_config(&mocks.url());
    let h = harness(&config, CreditLedger::in_memory(10));

    let error = h.source.fetch(&CancelSignal::new()).await.unwrap_err();

    assert_eq!(error.to_string(), "HTTP error 401: invalid apiKey");
    assert!(h.cache.get(WARMED_KEY).await.unwrap().is_none());
}
