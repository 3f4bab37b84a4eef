//! Payload and client for the external summarization service.
//!
//! The service caches summaries by [`compute_alerts_hash`], so identical alert sets
//! in any order are summarized once.

use crate::{
    alerts::{compute_alerts_hash, sort_by_severity, Alert, Category, Severity, SourceId},
    upstream::{CancelSignal, HttpClient, UpstreamError},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// The subset of an alert the summarizer sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryAlert {
    pub title: String,
    pub summary: String,
    pub severity: Severity,
    pub source: SourceId,
    pub category: Category,
}

impl From<&Alert> for SummaryAlert {
    fn from(alert: &Alert) -> Self {
        Self {
            title: alert.title.clone(),
            summary: alert.summary.clone(),
            severity: alert.severity,
            source: alert.source,
            category: alert.category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub alerts: Vec<SummaryAlert>,
    pub hash: String,
}

impl SummaryRequest {
    /// Builds the request with alerts in severity order and the set's hash.
    #[must_use]
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        let hash = compute_alerts_hash(alerts);
        let ordered = sort_by_severity(alerts.to_vec());
        Self { alerts: ordered.iter().map(SummaryAlert::from).collect(), hash }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub summary: String,
    pub hash: String,
    pub generated_at: DateTime<Utc>,
}

/// Posts [`SummaryRequest`]s to the configured endpoint.
#[derive(Debug, Clone)]
pub struct SummaryClient {
    http: Arc<HttpClient>,
    endpoint: String,
}

impl SummaryClient {
    #[must_use]
    pub fn new(http: Arc<HttpClient>, endpoint: impl Into<String>) -> Self {
        Self { http, endpoint: endpoint.into() }
    }

    /// # Errors
    ///
    /// Returns the upstream error if the service is unreachable, answers non-2xx or
    /// returns a body that is not a [`SummaryResponse`].
    pub async fn summarize(
        &self,
        request: &SummaryRequest,
        cancel: &CancelSignal,
    ) -> Result<SummaryResponse, UpstreamError> {
        debug!(alerts = request.alerts.len(), hash = %request.hash, "requesting summary");
        self.http.post_json(&self.endpoint, request, cancel).await
    }
}
