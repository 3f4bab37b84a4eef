//! Upstream feed communication.
//!
//! Every fetcher goes through one shared [`HttpClient`]:
//! - semaphore-bounded concurrency across all sources and their nested fan-outs
//! - per-request timeouts and bounded retries on 5xx responses
//! - decoding of the proxy's `{"error": "..."}` failure bodies into [`UpstreamError`]
//! - cooperative cancellation through a shared [`CancelSignal`]
//!
//! A cancelled request resolves to [`UpstreamError::Cancelled`], never to an empty
//! payload, so the aggregator can tell "no result yet" apart from "source is down".

pub mod cancel;
pub mod errors;
pub mod http_client;

pub use cancel::CancelSignal;
pub use errors::UpstreamError;
pub use http_client::{HttpClient, HttpClientConfig};
