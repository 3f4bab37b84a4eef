//! Source definitions: one fetcher, converter and filter set per upstream feed.
//!
//! Every feed is exposed to the aggregator through the same [`AlertSource`] contract:
//! an id, a label, a staleness hint and a `fetch` that returns normalized alerts. The
//! split inside each module is always the same:
//!
//! - `model`: the source-native record shapes, decoded with serde
//! - `classify`: a total function from record fields to [`Severity`]
//! - `convert`: record to [`Alert`], `None` to suppress
//! - filters where the source has them (nighttime suppression, consolidation,
//!   congestion thresholds, social post windows)
//! - the [`AlertSource`] implementation doing the network calls
//!
//! [`Severity`]: crate::alerts::Severity

pub mod aviation;
pub mod police;
pub mod power;
pub mod road_flow;
pub mod road_incidents;
pub mod transit;
pub mod weather;

use crate::{
    alerts::{Alert, SourceId},
    cache::{MemoryResponseCache, ResponseCache},
    config::{AppConfig, LocationConfig},
    credits::{CreditError, CreditLedger},
    upstream::{CancelSignal, HttpClient, UpstreamError},
};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

pub use aviation::AviationSource;
pub use police::PoliceSource;
pub use power::PowerSource;
pub use road_flow::RoadFlowSource;
pub use road_incidents::RoadIncidentsSource;
pub use transit::TransitSource;
pub use weather::WeatherSource;

/// Why a source produced no alerts this cycle.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The upstream or proxy could not be reached or answered non-2xx.
    #[error("{0}")]
    Upstream(UpstreamError),

    /// The payload did not have the expected shape.
    #[error("Malformed payload: {0}")]
    Decode(String),

    /// The daily API allowance is spent.
    #[error("API credits exhausted ({used}/{limit} used today)")]
    QuotaExhausted { used: u32, limit: u32 },

    /// The shared cancellation signal fired.
    #[error("Fetch cancelled")]
    Cancelled,

    /// Required configuration is missing.
    #[error("Source not configured: {0}")]
    NotConfigured(String),
}

impl SourceError {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<UpstreamError> for SourceError {
    fn from(error: UpstreamError) -> Self {
        match error {
            UpstreamError::Cancelled => Self::Cancelled,
            UpstreamError::InvalidResponse(message) => Self::Decode(message),
            other => Self::Upstream(other),
        }
    }
}

impl From<CreditError> for SourceError {
    fn from(error: CreditError) -> Self {
        match error {
            CreditError::Exhausted { used, limit } => Self::QuotaExhausted { used, limit },
            CreditError::Store(message) => Self::NotConfigured(message),
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// Clock and locale handed to converters and filters, so they stay pure.
#[derive(Debug, Clone, Copy)]
pub struct ConvertContext {
    pub now: DateTime<Utc>,
    pub local_offset: FixedOffset,
}

impl ConvertContext {
    #[must_use]
    pub fn new(now: DateTime<Utc>, local_offset: FixedOffset) -> Self {
        Self { now, local_offset }
    }

    /// Context for the current instant in the configured location's offset.
    #[must_use]
    pub fn current(location: &LocationConfig) -> Self {
        Self::new(Utc::now(), location.offset())
    }

    #[must_use]
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        self.now.with_timezone(&self.local_offset)
    }

    #[must_use]
    pub fn local_date(&self) -> NaiveDate {
        self.local_now().date_naive()
    }
}

/// A feed the aggregator can run.
#[async_trait]
pub trait AlertSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Human-readable name shown next to the source's health.
    fn label(&self) -> &str;

    /// How long a successful result may be shown before it is considered stale.
    fn stale_after(&self) -> Duration;

    /// Fetches and normalizes the source's current alerts.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Cancelled`] if `cancel` fires, otherwise any upstream,
    /// decode or quota failure.
    async fn fetch(&self, cancel: &CancelSignal) -> Result<Vec<Alert>, SourceError>;
}

/// Shared dependencies every fetcher is built with.
#[derive(Clone)]
pub struct SourceDeps {
    pub http: Arc<HttpClient>,
    pub cache: Option<Arc<dyn ResponseCache>>,
    pub credits: Arc<CreditLedger>,
    pub location: LocationConfig,
}

impl SourceDeps {
    /// Builds the default dependency set from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, UpstreamError> {
        let cache: Option<Arc<dyn ResponseCache>> = config
            .cache
            .enabled
            .then(|| Arc::new(MemoryResponseCache::new(config.cache.max_entries)) as _);
        Ok(Self {
            http: Arc::new(HttpClient::with_config(config.http.clone())?),
            cache,
            credits: Arc::new(CreditLedger::in_memory(config.sources.road_flow.daily_credit_limit)),
            location: config.location.clone(),
        })
    }
}

/// The explicit, ordered set of sources one aggregator runs.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn AlertSource>>,
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.sources.iter().map(|s| s.id())).finish()
    }
}

impl SourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source. A source registered twice under the same id replaces the first.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn AlertSource>) -> Self {
        self.register(source);
        self
    }

    pub fn register(&mut self, source: Arc<dyn AlertSource>) {
        if let Some(existing) = self.sources.iter_mut().find(|s| s.id() == source.id()) {
            *existing = source;
        } else {
            self.sources.push(source);
        }
    }

    /// Registers every enabled feed from configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig, deps: &SourceDeps) -> Self {
        let feeds = &config.sources;
        let mut registry = Self::new();

        if feeds.weather.enabled {
            registry.register(Arc::new(WeatherSource::new(feeds.weather.clone(), deps.clone())));
        }
        if feeds.aviation.enabled {
            registry.register(Arc::new(AviationSource::new(feeds.aviation.clone(), deps.clone())));
        }
        if feeds.power.enabled {
            registry.register(Arc::new(PowerSource::new(feeds.power.clone(), deps.clone())));
        }
        if feeds.road_incidents.enabled {
            registry.register(Arc::new(RoadIncidentsSource::new(
                feeds.road_incidents.clone(),
                deps.clone(),
            )));
        }
        if feeds.transit.enabled {
            registry.register(Arc::new(TransitSource::new(feeds.transit.clone(), deps.clone())));
        }
        if feeds.police.enabled {
            registry.register(Arc::new(PoliceSource::new(feeds.police.clone(), deps.clone())));
        }
        if feeds.road_flow.enabled {
            registry.register(Arc::new(RoadFlowSource::new(feeds.road_flow.clone(), deps.clone())));
        }

        registry
    }

    /// A registry with only the given sources, in the original order.
    #[must_use]
    pub fn subset(&self, ids: &[SourceId]) -> Self {
        Self {
            sources: self.sources.iter().filter(|s| ids.contains(&s.id())).cloned().collect(),
        }
    }

    #[must_use]
    pub fn get(&self, id: SourceId) -> Option<&Arc<dyn AlertSource>> {
        self.sources.iter().find(|s| s.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn AlertSource>> {
        self.sources.iter()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<SourceId> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
