//! Transit service alerts, optionally augmented by the agency's social feed.
//!
//! The structured feed is authoritative: if it fails, the source fails. The social
//! feed only adds alerts, so its failures are logged and skipped. Both sets are
//! returned together without de-duplication, since a post and a feed alert about the
//! same detour carry different detail.

mod classify;
mod convert;
pub mod model;
mod social;

pub use classify::{classify_transit, normalize_effect};
pub use convert::convert_transit_alert;
pub use social::{convert_social_post, infer_effect, is_service_impact};

use self::model::{AuthorFeed, TransitAlertFeed};
use super::{AlertSource, ConvertContext, SourceDeps, SourceError};
use crate::{
    alerts::{Alert, SourceId},
    config::{SocialFeedConfig, TransitSourceConfig},
    upstream::CancelSignal,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

pub struct TransitSource {
    config: TransitSourceConfig,
    deps: SourceDeps,
}

impl TransitSource {
    #[must_use]
    pub fn new(config: TransitSourceConfig, deps: SourceDeps) -> Self {
        Self { config, deps }
    }

    async fn fetch_feed(&self, cancel: &CancelSignal) -> Result<TransitAlertFeed, SourceError> {
        let url = format!("{}/alerts", self.config.base_url.trim_end_matches('/'));
        Ok(self.deps.http.get_json(&url, &[], cancel).await?)
    }

    async fn fetch_social(
        &self,
        social: &SocialFeedConfig,
        cancel: &CancelSignal,
    ) -> Result<AuthorFeed, SourceError> {
        let url =
            format!("{}/app.bsky.feed.getAuthorFeed", social.base_url.trim_end_matches('/'));
        let query = [("actor", social.actor.clone()), ("limit", social.limit.to_string())];
        Ok(self.deps.http.get_json(&url, &query, cancel).await?)
    }

    async fn social_alerts(
        &self,
        ctx: &ConvertContext,
        cancel: &CancelSignal,
    ) -> Result<Vec<Alert>, SourceError> {
        let Some(social) = &self.config.social else {
            return Ok(Vec::new());
        };
        match self.fetch_social(social, cancel).await {
            Ok(feed) => Ok(feed
                .feed
                .iter()
                .filter_map(|item| {
                    convert_social_post(&item.post, &social.actor, social.window_hours, ctx)
                })
                .collect()),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                warn!(source = %SourceId::Transit, error = %e, "social feed unavailable, skipping");
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl AlertSource for TransitSource {
    fn id(&self) -> SourceId {
        SourceId::Transit
    }

    fn label(&self) -> &str {
        "GoRaleigh Transit"
    }

    fn stale_after(&self) -> Duration {
        Duration::from_secs(self.config.stale_after_seconds)
    }

    async fn fetch(&self, cancel: &CancelSignal) -> Result<Vec<Alert>, SourceError> {
        let ctx = ConvertContext::current(&self.deps.location);
        let (feed, social) =
            futures::join!(self.fetch_feed(cancel), self.social_alerts(&ctx, cancel));
        let feed = feed?;
        let social = social?;

        let mut alerts: Vec<Alert> =
            feed.alerts.iter().filter_map(|a| convert_transit_alert(a, &ctx)).collect();
        let structured = alerts.len();
        alerts.extend(social);

        debug!(
            source = %self.id(),
            structured,
            social = alerts.len() - structured,
            "transit alerts normalized"
        );
        Ok(alerts)
    }
}
