//! Police dispatch traffic incidents from an ArcGIS feature layer.

mod convert;
pub mod model;

pub use convert::{classify_police, convert_police_incident};

use self::model::FeatureQueryResponse;
use super::{AlertSource, ConvertContext, SourceDeps, SourceError};
use crate::{
    alerts::{Alert, SourceId},
    config::PoliceSourceConfig,
    upstream::{CancelSignal, UpstreamError},
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub struct PoliceSource {
    config: PoliceSourceConfig,
    deps: SourceDeps,
}

impl PoliceSource {
    #[must_use]
    pub fn new(config: PoliceSourceConfig, deps: SourceDeps) -> Self {
        Self { config, deps }
    }
}

#[async_trait]
impl AlertSource for PoliceSource {
    fn id(&self) -> SourceId {
        SourceId::PoliceTraffic
    }

    fn label(&self) -> &str {
        "Police Traffic Incidents"
    }

    fn stale_after(&self) -> Duration {
        Duration::from_secs(self.config.stale_after_seconds)
    }

    async fn fetch(&self, cancel: &CancelSignal) -> Result<Vec<Alert>, SourceError> {
        let url = format!("{}/query", self.config.base_url.trim_end_matches('/'));
        let query = [
            ("where", "1=1".to_string()),
            ("outFields", "*".to_string()),
            ("f", "json".to_string()),
        ];
        let response: FeatureQueryResponse = self.deps.http.get_json(&url, &query, cancel).await?;

        if let Some(error) = response.error {
            let status = error.code.and_then(|c| u16::try_from(c).ok()).unwrap_or(500);
            let message = error.message.unwrap_or_else(|| "feature query failed".to_string());
            return Err(SourceError::Upstream(UpstreamError::HttpError(status, message)));
        }

        let ctx = ConvertContext::current(&self.deps.location);
        let alerts: Vec<Alert> = response
            .features
            .iter()
            .filter_map(|feature| convert_police_incident(&feature.attributes, &ctx))
            .collect();

        debug!(
            source = %self.id(),
            features = response.features.len(),
            alerts = alerts.len(),
            "police incidents normalized"
        );
        Ok(alerts)
    }
}
