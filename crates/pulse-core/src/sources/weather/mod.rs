//! National weather service active alerts for the configured point.

mod convert;
pub mod model;

pub use convert::{classify_weather, convert_weather};

use self::model::WeatherAlertCollection;
use super::{AlertSource, ConvertContext, SourceDeps, SourceError};
use crate::{
    alerts::{Alert, SourceId},
    config::WeatherSourceConfig,
    upstream::CancelSignal,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub struct WeatherSource {
    config: WeatherSourceConfig,
    deps: SourceDeps,
}

impl WeatherSource {
    #[must_use]
    pub fn new(config: WeatherSourceConfig, deps: SourceDeps) -> Self {
        Self { config, deps }
    }
}

#[async_trait]
impl AlertSource for WeatherSource {
    fn id(&self) -> SourceId {
        SourceId::WeatherService
    }

    fn label(&self) -> &str {
        "National Weather Service"
    }

    fn stale_after(&self) -> Duration {
        Duration::from_secs(self.config.stale_after_seconds)
    }

    async fn fetch(&self, cancel: &CancelSignal) -> Result<Vec<Alert>, SourceError> {
        let url = format!("{}/alerts/active", self.config.base_url.trim_end_matches('/'));
        let location = &self.deps.location;
        let query = [("point", format!("{:.4},{:.4}", location.latitude, location.longitude))];

        let collection: WeatherAlertCollection =
            self.deps.http.get_json(&url, &query, cancel).await?;

        let ctx = ConvertContext::current(location);
        let alerts: Vec<Alert> =
            collection.features.iter().filter_map(|f| convert_weather(f, &ctx)).collect();

        debug!(
            source = %self.id(),
            features = collection.features.len(),
            alerts = alerts.len(),
            "weather alerts normalized"
        );
        Ok(alerts)
    }
}
