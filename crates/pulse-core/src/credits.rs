//! Daily API credit accounting for quota-limited upstreams.
//!
//! The road-flow provider bills per request against a daily allowance. The ledger is
//! an injected state object: it reads the persisted [`CreditState`] through a
//! [`CreditStore`], resets it when the stored date is not today, and refuses a
//! request that would exceed the limit.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Credits consumed and requests made on a given local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditState {
    pub date: NaiveDate,
    pub used: u32,
    #[serde(default)]
    pub requests: u32,
}

impl CreditState {
    #[must_use]
    pub fn fresh(date: NaiveDate) -> Self {
        Self { date, used: 0, requests: 0 }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreditError {
    #[error("daily API credits exhausted ({used}/{limit} used)")]
    Exhausted { used: u32, limit: u32 },

    #[error("credit store error: {0}")]
    Store(String),
}

/// Persistence for the credit state (KV entry, file, memory).
#[async_trait]
pub trait CreditStore: Send + Sync {
    /// Returns the stored state, or `None` if nothing has been recorded yet.
    async fn load(&self) -> Result<Option<CreditState>, CreditError>;

    async fn save(&self, state: CreditState) -> Result<(), CreditError>;
}

/// Process-local credit store.
#[derive(Debug, Default)]
pub struct MemoryCreditStore {
    state: Mutex<Option<CreditState>>,
}

impl MemoryCreditStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_state(state: CreditState) -> Self {
        Self { state: Mutex::new(Some(state)) }
    }
}

#[async_trait]
impl CreditStore for MemoryCreditStore {
    async fn load(&self) -> Result<Option<CreditState>, CreditError> {
        Ok(*self.state.lock().await)
    }

    async fn save(&self, state: CreditState) -> Result<(), CreditError> {
        *self.state.lock().await = Some(state);
        Ok(())
    }
}

/// Tracks credit usage against a daily limit.
///
/// Consumption is serialized so that concurrent fetches cannot both pass the check on
/// the last remaining credit. Store failures are logged and the ledger falls back to
/// its last known state.
pub struct CreditLedger {
    store: Arc<dyn CreditStore>,
    daily_limit: u32,
    last_known: Mutex<Option<CreditState>>,
}

impl std::fmt::Debug for CreditLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditLedger")
            .field("daily_limit", &self.daily_limit)
            .finish_non_exhaustive()
    }
}

impl CreditLedger {
    #[must_use]
    pub fn new(store: Arc<dyn CreditStore>, daily_limit: u32) -> Self {
        Self { store, daily_limit, last_known: Mutex::new(None) }
    }

    /// Ledger backed by a fresh [`MemoryCreditStore`].
    #[must_use]
    pub fn in_memory(daily_limit: u32) -> Self {
        Self::new(Arc::new(MemoryCreditStore::new()), daily_limit)
    }

    #[must_use]
    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Current usage for `today`, after applying the date reset.
    pub async fn snapshot(&self, today: NaiveDate) -> CreditState {
        let last_known = self.last_known.lock().await;
        self.current(today, *last_known).await
    }

    /// Reserves `credits` for one request made on `today`.
    ///
    /// # Errors
    ///
    /// Returns [`CreditError::Exhausted`] if the reservation would exceed the daily
    /// limit. Nothing is recorded in that case.
    pub async fn try_consume(
        &self,
        today: NaiveDate,
        credits: u32,
    ) -> Result<CreditState, CreditError> {
        let mut last_known = self.last_known.lock().await;
        let state = self.current(today, *last_known).await;

        let used = state.used.saturating_add(credits);
        if used > self.daily_limit {
            debug!(used = state.used, limit = self.daily_limit, "credit request refused");
            return Err(CreditError::Exhausted { used: state.used, limit: self.daily_limit });
        }

        let next = CreditState { date: today, used, requests: state.requests.saturating_add(1) };
        if let Err(e) = self.store.save(next).await {
            warn!(error = %e, "failed to persist credit usage");
        }
        *last_known = Some(next);
        Ok(next)
    }

    async fn current(&self, today: NaiveDate, last_known: Option<CreditState>) -> CreditState {
        let stored = match self.store.load().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "failed to load credit usage, using last known state");
                last_known
            }
        };

        match stored {
            Some(state) if state.date == today => state,
            Some(state) => {
                debug!(stored_date = %state.date, today = %today, "resetting daily credits");
                CreditState::fresh(today)
            }
            None => CreditState::fresh(today),
        }
    }
}
