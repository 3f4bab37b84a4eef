//! HTTP front end for the Pulse alert aggregator.
//!
//! The binary in `main.rs` wires configuration, logging and graceful shutdown around
//! the router built here, so the routes can be exercised in tests without a socket.

pub mod middleware;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
