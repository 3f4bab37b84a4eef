//! Integration tests for the Pulse alert pipeline.
//!
//! Every test runs real fetchers against `mockito` servers standing in for the
//! upstream proxies:
//!
//! - `aggregation_tests`: all seven sources end to end, partial failure, cancellation
//! - `source_fetch_tests`: per-source fetch behavior (detail fallback, proxy error
//!   bodies, multi-airport and multi-county fan-out, best-effort social feed)
//! - `road_flow_tests`: response cache and daily credit accounting
//! - `mock_infrastructure`: feed mock builder and upstream payload fixtures
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```

#[cfg(test)]
mod aggregation_tests;

#[cfg(test)]
mod road_flow_tests;

#[cfg(test)]
mod source_fetch_tests;

/// Mock infrastructure for testing
pub mod mock_infrastructure;
