use pulse_core::{
    aggregator::Aggregator,
    config::AppConfig,
    credits::CreditLedger,
    sources::{SourceDeps, SourceRegistry},
    summary::SummaryClient,
    upstream::UpstreamError,
};
use std::{sync::Arc, time::Instant};

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub aggregator: Arc<Aggregator>,
    /// Daily credit usage of the road-flow feed, shared with its fetcher.
    pub credits: Arc<CreditLedger>,
    /// Present only when a summarization endpoint is configured.
    pub summary: Option<Arc<SummaryClient>>,
    pub start_time: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: Arc<AppConfig>,
        aggregator: Arc<Aggregator>,
        credits: Arc<CreditLedger>,
        summary: Option<Arc<SummaryClient>>,
    ) -> Self {
        Self { config, aggregator, credits, summary, start_time: Instant::now() }
    }

    /// Builds the source registry, aggregator and summary client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the shared HTTP client cannot be constructed.
    pub fn from_config(config: AppConfig) -> Result<Self, UpstreamError> {
        let deps = SourceDeps::from_config(&config)?;
        let registry = SourceRegistry::from_config(&config, &deps);
        let summary = config
            .summary
            .endpoint
            .as_ref()
            .map(|endpoint| Arc::new(SummaryClient::new(deps.http.clone(), endpoint.clone())));

        let aggregator = Arc::new(Aggregator::new(registry));
        Ok(Self::new(Arc::new(config), aggregator, deps.credits.clone(), summary))
    }
}
