use crate::{
    middleware::{create_request_id_layers, CorrelationId},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pulse_core::{
    aggregator::{AggregateError, Aggregator, AlertsResult},
    alerts::{Alert, Category, SourceId, UnknownSource},
    credits::CreditState,
    sources::ConvertContext,
    summary::{SummaryRequest, SummaryResponse},
    upstream::{CancelSignal, UpstreamError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Builds the public router with request id and trace layers applied.
pub fn create_router(state: AppState) -> Router {
    let (set_request_id, propagate_request_id) = create_request_id_layers();

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/alerts", get(handle_alerts))
        .route("/api/sources", get(handle_sources))
        .route("/api/summary", post(handle_summary))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
}

/// Failures surfaced to HTTP callers as `{"error": "..."}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("aggregation did not finish within {0}s")]
    Timeout(u64),

    #[error("summarization endpoint not configured")]
    SummaryUnavailable,

    #[error("summarization failed: {0}")]
    Upstream(#[from] UpstreamError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::SummaryUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "sources": state.aggregator.registry().len(),
        "summary_enabled": state.summary.is_some(),
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertsQuery {
    pub source: Option<String>,
}

/// Runs one aggregation cycle and returns the severity-sorted result.
///
/// The cycle is cancelled once the configured request timeout elapses. If the
/// client disconnects first, axum drops this future and every in-flight fetch
/// with it.
///
/// # Errors
///
/// Returns 400 for an unknown `source`, 404 for a known but disabled one and 504
/// when the timeout fires.
pub async fn handle_alerts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AlertsQuery>,
) -> Result<Json<AlertsResult>, ApiError> {
    let request_id = CorrelationId::from_headers(&headers);

    let filtered;
    let aggregator = match query.source.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => {
            let id: SourceId =
                name.parse().map_err(|e: UnknownSource| ApiError::BadRequest(e.to_string()))?;
            if state.aggregator.registry().get(id).is_none() {
                return Err(ApiError::NotFound(format!("source {id} is not enabled")));
            }
            filtered = Aggregator::new(state.aggregator.registry().subset(&[id]));
            &filtered
        }
        None => state.aggregator.as_ref(),
    };

    let cancel = CancelSignal::new();
    let timeout = state.config.request_timeout();
    let deadline = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            cancel.cancel();
        })
    };

    let outcome = aggregator.fetch_all(&cancel).await;
    deadline.abort();

    match outcome {
        Ok(result) => {
            let result = result.sorted();
            info!(
                request_id = %request_id,
                alerts = result.alerts.len(),
                failed = result.failed_sources().len(),
                "alerts served"
            );
            Ok(Json(result))
        }
        Err(AggregateError::Cancelled) => {
            warn!(
                request_id = %request_id,
                timeout_secs = timeout.as_secs(),
                "aggregation timed out"
            );
            Err(ApiError::Timeout(timeout.as_secs()))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub id: SourceId,
    pub label: String,
    pub category: Category,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_after_seconds: Option<u64>,
    /// Today's API credit usage, for quota-limited feeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<CreditUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditUsage {
    #[serde(flatten)]
    pub state: CreditState,
    pub daily_limit: u32,
}

/// Lists every feed with its label, staleness hint and whether it is registered.
pub async fn handle_sources(State(state): State<AppState>) -> Json<Vec<SourceInfo>> {
    let registry = state.aggregator.registry();
    let credits = match registry.get(SourceId::RoadFlow) {
        Some(_) => {
            let today = ConvertContext::current(&state.config.location).local_date();
            Some(CreditUsage {
                state: state.credits.snapshot(today).await,
                daily_limit: state.credits.daily_limit(),
            })
        }
        None => None,
    };

    let sources = SourceId::FEEDS
        .iter()
        .map(|id| match registry.get(*id) {
            Some(source) => SourceInfo {
                id: *id,
                label: source.label().to_string(),
                category: id.category(),
                enabled: true,
                stale_after_seconds: Some(source.stale_after().as_secs()),
                credits: credits.clone().filter(|_| *id == SourceId::RoadFlow),
            },
            None => SourceInfo {
                id: *id,
                label: id.as_str().to_string(),
                category: id.category(),
                enabled: false,
                stale_after_seconds: None,
                credits: None,
            },
        })
        .collect();
    Json(sources)
}

#[derive(Debug, Deserialize)]
pub struct SummarizeBody {
    pub alerts: Vec<Alert>,
}

/// Builds the summary payload for the posted alerts and forwards it.
///
/// # Errors
///
/// Returns 503 when no summarization endpoint is configured and 502 when the
/// service fails.
pub async fn handle_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SummarizeBody>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let client = state.summary.as_ref().ok_or(ApiError::SummaryUnavailable)?;
    let request_id = CorrelationId::from_headers(&headers);
    let request = SummaryRequest::from_alerts(&body.alerts);

    let response = client.summarize(&request, &CancelSignal::new()).await.map_err(|e| {
        warn!(request_id = %request_id, error = %e, "summarization failed");
        ApiError::from(e)
    })?;

    info!(request_id = %request_id, hash = %response.hash, "summary served");
    Ok(Json(response))
}
