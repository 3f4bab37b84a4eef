//! Airport delay programs for the configured airports.
//!
//! One request per airport, issued concurrently. A single airport failing fails the
//! source, since the status page is meant to cover all of them.

mod convert;
pub mod model;

pub use convert::{classify_aviation, convert_airport_status, parse_delay_minutes};

use self::model::AirportStatus;
use super::{AlertSource, ConvertContext, SourceDeps, SourceError};
use crate::{
    alerts::{Alert, SourceId},
    config::AviationSourceConfig,
    upstream::CancelSignal,
};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::time::Duration;
use tracing::debug;

pub struct AviationSource {
    config: AviationSourceConfig,
    deps: SourceDeps,
}

impl AviationSource {
    #[must_use]
    pub fn new(config: AviationSourceConfig, deps: SourceDeps) -> Self {
        Self { config, deps }
    }

    async fn fetch_airport(
        &self,
        code: &str,
        cancel: &CancelSignal,
    ) -> Result<(String, AirportStatus), SourceError> {
        let url = format!(
            "{}/airport/status/{}",
            self.config.base_url.trim_end_matches('/'),
            code.trim().to_ascii_uppercase()
        );
        let status: AirportStatus = self.deps.http.get_json(&url, &[], cancel).await?;
        Ok((code.to_string(), status))
    }
}

#[async_trait]
impl AlertSource for AviationSource {
    fn id(&self) -> SourceId {
        SourceId::AviationStatus
    }

    fn label(&self) -> &str {
        "FAA Airport Status"
    }

    fn stale_after(&self) -> Duration {
        Duration::from_secs(self.config.stale_after_seconds)
    }

    async fn fetch(&self, cancel: &CancelSignal) -> Result<Vec<Alert>, SourceError> {
        if self.config.airports.is_empty() {
            return Err(SourceError::NotConfigured("no airports configured".into()));
        }

        let statuses = try_join_all(
            self.config.airports.iter().map(|code| self.fetch_airport(code, cancel)),
        )
        .await?;

        let ctx = ConvertContext::current(&self.deps.location);
        let alerts: Vec<Alert> = statuses
            .iter()
            .flat_map(|(code, status)| convert_airport_status(code, status, &ctx))
            .collect();

        debug!(
            source = %self.id(),
            airports = statuses.len(),
            alerts = alerts.len(),
            "airport status normalized"
        );
        Ok(alerts)
    }
}
