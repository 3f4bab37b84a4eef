//! Utility outage map: list fetch followed by a per-outage detail fan-out.
//!
//! Detail fetches run concurrently under the shared HTTP semaphore. A failed detail
//! only degrades that outage to its list-level record.

mod convert;
pub mod model;

pub use convert::{classify_power, convert_outage};

use self::model::{OutageDetail, OutageEnvelope, OutageSummary};
use super::{AlertSource, ConvertContext, SourceDeps, SourceError};
use crate::{
    alerts::{Alert, SourceId},
    config::PowerSourceConfig,
    upstream::CancelSignal,
};
use async_trait::async_trait;
use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, warn};

pub struct PowerSource {
    config: PowerSourceConfig,
    deps: SourceDeps,
}

impl PowerSource {
    #[must_use]
    pub fn new(config: PowerSourceConfig, deps: SourceDeps) -> Self {
        Self { config, deps }
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn fetch_outages(
        &self,
        cancel: &CancelSignal,
    ) -> Result<Vec<OutageSummary>, SourceError> {
        let url = format!("{}/outages", self.base());
        let query = [("jurisdiction", self.config.jurisdiction.clone())];
        let envelope: OutageEnvelope<Vec<OutageSummary>> =
            self.deps.http.get_json(&url, &query, cancel).await?;
        if envelope.data.is_none() && !envelope.error_messages.is_empty() {
            return Err(SourceError::Decode(format!(
                "outage list returned errors: {}",
                serde_json::Value::Array(envelope.error_messages)
            )));
        }
        Ok(envelope.data.unwrap_or_default())
    }

    async fn fetch_detail(
        &self,
        event_number: &str,
        cancel: &CancelSignal,
    ) -> Result<OutageDetail, SourceError> {
        let url = format!("{}/outages/outage", self.base());
        let query = [
            ("jurisdiction", self.config.jurisdiction.clone()),
            ("sourceEventNumber", event_number.to_string()),
        ];
        let envelope: OutageEnvelope<OutageDetail> =
            self.deps.http.get_json(&url, &query, cancel).await?;
        envelope.data.ok_or_else(|| SourceError::Decode("outage detail missing data".into()))
    }

    /// Outages inside the configured area, largest first.
    fn select(&self, outages: Vec<OutageSummary>) -> Vec<OutageSummary> {
        let bbox = self.deps.location.bbox;
        let mut selected: Vec<OutageSummary> = outages
            .into_iter()
            .filter(|o| o.source_event_number.is_some())
            .filter(|o| {
                !self.config.restrict_to_bbox ||
                    match (o.device_latitude_location, o.device_longitude_location) {
                        (Some(lat), Some(lon)) => bbox.contains(lat, lon),
                        _ => false,
                    }
            })
            .collect();
        selected.sort_by(|a, b| {
            b.customers_affected_number.unwrap_or(0).cmp(&a.customers_affected_number.unwrap_or(0))
        });
        selected
    }
}

#[async_trait]
impl AlertSource for PowerSource {
    fn id(&self) -> SourceId {
        SourceId::PowerUtility
    }

    fn label(&self) -> &str {
        "Duke Energy Outages"
    }

    fn stale_after(&self) -> Duration {
        Duration::from_secs(self.config.stale_after_seconds)
    }

    async fn fetch(&self, cancel: &CancelSignal) -> Result<Vec<Alert>, SourceError> {
        let outages = self.select(self.fetch_outages(cancel).await?);
        let detail_count = outages.len().min(self.config.max_detail_fetches);

        let details = join_all(outages.iter().take(detail_count).map(|outage| async move {
            let event_number = outage.source_event_number.as_deref().unwrap_or_default();
            self.fetch_detail(event_number, cancel).await
        }))
        .await;

        if cancel.is_cancelled() {
            return Err(SourceError::Cancelled);
        }

        let ctx = ConvertContext::current(&self.deps.location);
        let mut fallbacks = 0usize;
        let alerts: Vec<Alert> = outages
            .iter()
            .enumerate()
            .filter_map(|(index, outage)| {
                let detail = match details.get(index) {
                    Some(Ok(detail)) => Some(detail),
                    Some(Err(e)) => {
                        fallbacks += 1;
                        warn!(
                            source = %SourceId::PowerUtility,
                            event = outage.source_event_number.as_deref().unwrap_or_default(),
                            error = %e,
                            "outage detail fetch failed, using list record"
                        );
                        None
                    }
                    None => None,
                };
                convert_outage(outage, detail, &ctx)
            })
            .collect();

        debug!(
            source = %self.id(),
            outages = outages.len(),
            details = detail_count,
            fallbacks,
            alerts = alerts.len(),
            "outages normalized"
        );
        Ok(alerts)
    }
}
