//! # Pulse Core
//!
//! Core library for Pulse, a local alert aggregator that turns seven heterogeneous
//! public feeds into one severity-ranked list.
//!
//! This crate provides:
//!
//! - **[`alerts`]**: the canonical [`Alert`](alerts::Alert) model, four-tier severity,
//!   per-source metadata, ordering and the order-independent alert-set hash.
//!
//! - **[`sources`]**: one fetcher, classifier and converter per feed (weather,
//!   aviation, power, road incidents, transit, police traffic, road flow) behind the
//!   [`AlertSource`](sources::AlertSource) trait.
//!
//! - **[`aggregator`]**: runs every registered source concurrently and reports
//!   per-source health alongside the merged alerts.
//!
//! - **[`upstream`]**: the shared HTTP client with bounded concurrency, retries and
//!   cooperative cancellation.
//!
//! - **[`cache`]**: optional TTL response cache in front of the fetchers.
//!
//! - **[`credits`]**: daily API credit ledger for quota-limited upstreams.
//!
//! - **[`summary`]**: request/response shapes and client for the summarizer.
//!
//! - **[`config`]**: layered TOML + environment configuration.
//!
//! ## Data Flow
//!
//! ```text
//!                 CancelSignal
//!                      │
//!                      ▼
//! ┌──────────────────────────────────────────────┐
//! │                  Aggregator                  │
//! │   join_all over SourceRegistry               │
//! └──┬───────┬───────┬───────┬───────┬───────┬───┘
//!    ▼       ▼       ▼       ▼       ▼       ▼
//! weather aviation power  road-inc transit police  road-flow
//!    │       │       │       │       │       │        │
//!    │   HttpClient (semaphore, retries)     │   ResponseCache
//!    │       │       │       │       │       │   CreditLedger
//!    ▼       ▼       ▼       ▼       ▼       ▼        ▼
//!  model ─► classify ─► convert ─► filter ─► Vec<Alert>
//!                      │
//!                      ▼
//!       AlertsResult { alerts, sources, fetchedAt }
//! ```

pub mod aggregator;
pub mod alerts;
pub mod cache;
pub mod config;
pub mod credits;
pub mod sources;
pub mod summary;
pub mod upstream;
pub mod utils;
