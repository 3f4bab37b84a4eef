//! Commercial road-flow feed, consolidated into congested major routes.
//!
//! The upstream bills per request against a daily credit allowance, so the fetch
//! reads through the shared response cache first and only spends a credit on a
//! miss. The cache-warming job writes the same key, which keeps interactive loads
//! off the quota most of the time.

mod convert;
pub mod model;
mod routes;

pub use convert::{classify_road_flow, convert_route, FlowThresholds};
pub use routes::{group_by_route, normalize_route_name, RouteCongestion};

use self::model::FlowResponse;
use super::{AlertSource, ConvertContext, SourceDeps, SourceError};
use crate::{
    alerts::{Alert, SourceId},
    cache::{cache_key, read_through},
    config::RoadFlowSourceConfig,
    upstream::CancelSignal,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Turns a decoded flow payload into alerts.
#[must_use]
pub fn normalize_flow(
    response: &FlowResponse,
    thresholds: &FlowThresholds,
    ctx: &ConvertContext,
) -> Vec<Alert> {
    group_by_route(&response.results)
        .iter()
        .filter_map(|route| convert_route(route, thresholds, ctx))
        .collect()
}

pub struct RoadFlowSource {
    config: RoadFlowSourceConfig,
    deps: SourceDeps,
}

impl RoadFlowSource {
    #[must_use]
    pub fn new(config: RoadFlowSourceConfig, deps: SourceDeps) -> Self {
        Self { config, deps }
    }

    #[must_use]
    pub fn thresholds(&self) -> FlowThresholds {
        FlowThresholds {
            min_jam_factor: self.config.min_jam_factor,
            min_congestion_percent: self.config.min_congestion_percent,
            min_segments: self.config.min_segments,
        }
    }

    /// Cache key shared with the cache-warming job.
    #[must_use]
    pub fn cache_key(&self) -> String {
        cache_key(SourceId::RoadFlow, &format!("flow:bbox:{}", self.deps.location.bbox.to_query()))
    }

    async fn fetch_payload(
        &self,
        ctx: &ConvertContext,
        cancel: &CancelSignal,
    ) -> Result<String, SourceError> {
        let url = format!("{}/v7/flow", self.config.base_url.trim_end_matches('/'));
        let query = [
            ("in", format!("bbox:{}", self.deps.location.bbox.to_query())),
            ("locationReferencing", "none".to_string()),
        ];

        let usage =
            self.deps.credits.try_consume(ctx.local_date(), self.config.credits_per_request).await?;
        info!(
            source = %SourceId::RoadFlow,
            used = usage.used,
            limit = self.deps.credits.daily_limit(),
            "spending road flow credits"
        );

        Ok(self.deps.http.get_text(&url, &query, cancel).await?)
    }
}

#[async_trait]
impl AlertSource for RoadFlowSource {
    fn id(&self) -> SourceId {
        SourceId::RoadFlow
    }

    fn label(&self) -> &str {
        "HERE Traffic Flow"
    }

    fn stale_after(&self) -> Duration {
        Duration::from_secs(self.config.stale_after_seconds)
    }

    async fn fetch(&self, cancel: &CancelSignal) -> Result<Vec<Alert>, SourceError> {
        let ctx = ConvertContext::current(&self.deps.location);
        let key = self.cache_key();
        let ttl = Duration::from_secs(self.config.cache_ttl_seconds);

        let cache = self.deps.cache.as_deref();
        let body = read_through(cache, &key, ttl, self.fetch_payload(&ctx, cancel)).await?;
        let response: FlowResponse = serde_json::from_str(&body)?;
        let alerts = normalize_flow(&response, &self.thresholds(), &ctx);

        debug!(
            source = %self.id(),
            segments = response.results.len(),
            alerts = alerts.len(),
            "road flow normalized"
        );
        Ok(alerts)
    }
}
