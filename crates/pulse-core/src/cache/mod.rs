//! Shared response cache in front of the fetchers.
//!
//! The cache is an optional latency and quota optimization. Nothing in the pipeline
//! depends on a hit: every read or write error is logged and the request proceeds as
//! if the cache were absent.
//!
//! # Keys
//!
//! Keys are `"{source-id}:{logical query}"` (see [`cache_key`]). The external
//! cache-warming job writes the road-flow payload under the same key the fetcher
//! reads, so the fetcher cannot tell a warmed entry from one written by user traffic.
//!
//! # Backends
//!
//! - [`MemoryResponseCache`]: in-process `DashMap` store with per-entry TTL
//! - anything implementing [`ResponseCache`] (e.g. a KV service client)

pub mod memory;

pub use memory::MemoryResponseCache;

use crate::alerts::SourceId;
use async_trait::async_trait;
use std::{future::Future, time::Duration};
use thiserror::Error;
use tracing::{debug, warn};

/// Failure reported by a cache backend.
#[derive(Error, Debug)]
#[error("cache backend error: {0}")]
pub struct CacheError(pub String);

/// Key/value store with TTL semantics.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Returns the cached value, or `None` on a miss or expired entry.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key` for `ttl`.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Builds the cache key for a source's logical query.
#[must_use]
pub fn cache_key(source: SourceId, query: &str) -> String {
    format!("{source}:{query}")
}

/// Returns the cached body for `key` or runs `fetch` and stores its result.
///
/// Cache errors never fail the request: a failed read is treated as a miss and a
/// failed write only logs.
///
/// # Errors
///
/// Returns whatever `fetch` returned on a miss.
pub async fn read_through<F, E>(
    cache: Option<&dyn ResponseCache>,
    key: &str,
    ttl: Duration,
    fetch: F,
) -> Result<String, E>
where
    F: Future<Output = Result<String, E>>,
{
    let Some(cache) = cache else {
        return fetch.await;
    };

    match cache.get(key).await {
        Ok(Some(body)) => {
            debug!(key = key, "response cache hit");
            return Ok(body);
        }
        Ok(None) => debug!(key = key, "response cache miss"),
        Err(e) => warn!(key = key, error = %e, "response cache read failed, treating as miss"),
    }

    let body = fetch.await?;

    if let Err(e) = cache.put(key, &body, ttl).await {
        warn!(key = key, error = %e, "response cache write failed");
    }

    Ok(body)
}
