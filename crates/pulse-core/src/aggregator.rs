//! Concurrent execution of every registered source.
//!
//! # Outcome model
//!
//! Each run starts with a fresh status map in which every registered source is
//! `{success: false}`. All sources are started together and joined with
//! [`join_all`], so one slow or failing source never short-circuits the others:
//!
//! | Source outcome | Alerts | Status |
//! |----------------|--------|--------|
//! | `Ok(alerts)` | appended | `{success: true}` |
//! | `Err(e)` | none | `{success: false, error: e.to_string()}` |
//! | `Err(Cancelled)` | none | `{success: false}`, no error |
//!
//! Partial and total failure are ordinary results. Only cancellation of the whole
//! run is an error, so callers can tell "cancelled" apart from "everything is down".

use crate::{
    alerts::{dedupe_by_id, sort_by_severity, Alert, SourceId},
    sources::SourceRegistry,
    upstream::CancelSignal,
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, time::Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Health of one source for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSourceStatus {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AlertSourceStatus {
    #[must_use]
    pub fn pending() -> Self {
        Self::default()
    }
}

/// Merged alerts plus per-source health, as handed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsResult {
    pub alerts: Vec<Alert>,
    pub sources: BTreeMap<SourceId, AlertSourceStatus>,
    pub fetched_at: DateTime<Utc>,
}

impl AlertsResult {
    /// Same result, deduplicated by id and in severity order.
    #[must_use]
    pub fn sorted(mut self) -> Self {
        self.alerts = sort_by_severity(dedupe_by_id(self.alerts));
        self
    }

    /// Keeps only alerts and statuses of `source`.
    #[must_use]
    pub fn only_source(mut self, source: SourceId) -> Self {
        self.alerts.retain(|alert| alert.source == source);
        self.sources.retain(|id, _| *id == source);
        self
    }

    #[must_use]
    pub fn failed_sources(&self) -> Vec<SourceId> {
        self.sources.iter().filter(|(_, status)| !status.success).map(|(id, _)| *id).collect()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// The caller's cancellation signal fired before the run completed.
    #[error("aggregation cancelled")]
    Cancelled,
}

/// Runs a [`SourceRegistry`] and merges the results.
#[derive(Debug, Clone)]
pub struct Aggregator {
    registry: SourceRegistry,
}

impl Aggregator {
    #[must_use]
    pub fn new(registry: SourceRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Fetches every source concurrently and merges the outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::Cancelled`] if `cancel` fires before all sources
    /// settle. Source failures are never errors; they are reported in the status map.
    pub async fn fetch_all(&self, cancel: &CancelSignal) -> Result<AlertsResult, AggregateError> {
        if cancel.is_cancelled() {
            return Err(AggregateError::Cancelled);
        }

        let mut sources: BTreeMap<SourceId, AlertSourceStatus> =
            self.registry.ids().into_iter().map(|id| (id, AlertSourceStatus::pending())).collect();

        let run = join_all(self.registry.iter().map(|source| async move {
            let started = Instant::now();
            let outcome = source.fetch(cancel).await;
            (source.id(), outcome, started.elapsed())
        }));

        let outcomes = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(AggregateError::Cancelled),
            outcomes = run => outcomes,
        };
        if cancel.is_cancelled() {
            return Err(AggregateError::Cancelled);
        }

        let mut alerts: Vec<Alert> = Vec::new();
        for (id, outcome, elapsed) in outcomes {
            let status = sources.entry(id).or_default();
            match outcome {
                Ok(batch) => {
                    debug!(
                        source = %id,
                        alerts = batch.len(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "source fetched"
                    );
                    status.success = true;
                    alerts.extend(batch);
                }
                Err(e) if e.is_cancelled() => {
                    debug!(source = %id, "source fetch cancelled");
                }
                Err(e) => {
                    warn!(
                        source = %id,
                        error = %e,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "source fetch failed"
                    );
                    status.error = Some(e.to_string());
                }
            }
        }

        let succeeded = sources.values().filter(|s| s.success).count();
        info!(
            alerts = alerts.len(),
            sources = sources.len(),
            succeeded,
            failed = sources.len() - succeeded,
            "aggregation complete"
        );

        Ok(AlertsResult { alerts, sources, fetched_at: Utc::now() })
    }
}
