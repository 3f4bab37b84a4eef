//! State DOT road incidents: construction, crashes and closures.
//!
//! Records pass through consolidation, then nighttime suppression, then conversion.
//! Suppression looks at the consolidated group, so a group is hidden only when its
//! widest lane closure is still low impact.

mod classify;
mod consolidate;
mod convert;
mod filter;
pub mod model;

pub use classify::{classify_road_incident, IncidentFacts};
pub use consolidate::{consolidate, extract_project_number, normalize_road, IncidentGroup};
pub use convert::convert_incident_group;
pub use filter::{is_night, suppress_at_night};

use self::model::RoadIncident;
use super::{AlertSource, ConvertContext, SourceDeps, SourceError};
use crate::{
    alerts::{Alert, SourceId},
    config::RoadIncidentsSourceConfig,
    upstream::CancelSignal,
};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::time::Duration;
use tracing::debug;

/// Consolidates, filters and converts a batch of incident records.
#[must_use]
pub fn normalize_incidents(incidents: &[RoadIncident], ctx: &ConvertContext) -> Vec<Alert> {
    let local = ctx.local_now();
    consolidate(incidents)
        .iter()
        .filter(|group| !suppress_at_night(&group.facts, &local))
        .filter_map(|group| convert_incident_group(group, ctx))
        .collect()
}

pub struct RoadIncidentsSource {
    config: RoadIncidentsSourceConfig,
    deps: SourceDeps,
}

impl RoadIncidentsSource {
    #[must_use]
    pub fn new(config: RoadIncidentsSourceConfig, deps: SourceDeps) -> Self {
        Self { config, deps }
    }

    async fn fetch_county(
        &self,
        county: u32,
        cancel: &CancelSignal,
    ) -> Result<Vec<RoadIncident>, SourceError> {
        let url = format!("{}/Incidents", self.config.base_url.trim_end_matches('/'));
        let query = [("county", county.to_string())];
        Ok(self.deps.http.get_json(&url, &query, cancel).await?)
    }
}

#[async_trait]
impl AlertSource for RoadIncidentsSource {
    fn id(&self) -> SourceId {
        SourceId::RoadIncidents
    }

    fn label(&self) -> &str {
        "NCDOT Traffic Incidents"
    }

    fn stale_after(&self) -> Duration {
        Duration::from_secs(self.config.stale_after_seconds)
    }

    async fn fetch(&self, cancel: &CancelSignal) -> Result<Vec<Alert>, SourceError> {
        if self.config.county_ids.is_empty() {
            return Err(SourceError::NotConfigured("no county ids configured".into()));
        }

        let batches = try_join_all(
            self.config.county_ids.iter().map(|county| self.fetch_county(*county, cancel)),
        )
        .await?;

        let mut incidents: Vec<RoadIncident> = Vec::new();
        for incident in batches.into_iter().flatten() {
            let duplicate = incident.id.is_some() &&
                incidents.iter().any(|existing| existing.id == incident.id);
            if !duplicate {
                incidents.push(incident);
            }
        }

        let ctx = ConvertContext::current(&self.deps.location);
        let alerts = normalize_incidents(&incidents, &ctx);

        debug!(
            source = %self.id(),
            records = incidents.len(),
            alerts = alerts.len(),
            "road incidents normalized"
        );
        Ok(alerts)
    }
}
