//! Canonical alert model shared by every source.
//!
//! ## Components
//!
//! - **[`Alert`]**: one normalized alert, whatever the upstream looked like
//! - **[`Severity`]**: the four-tier scale every classifier maps into
//! - **[`AlertMetadata`]**: source-specific fields, one variant per source
//! - **[`sort_by_severity`]** / **[`dedupe_by_id`]**: ordering of merged sets
//! - **[`compute_alerts_hash`]**: order-independent fingerprint for summary caching
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Utc;
//! use pulse_core::alerts::{sort_by_severity, Alert, AlertMetadata, Severity};
//!
//! let minor = Alert::new(
//!     "generic-1",
//!     Severity::Minor,
//!     "Street fair",
//!     "Main St closed to traffic",
//!     Utc::now(),
//!     AlertMetadata::Generic { display_severity: Severity::Minor.display() },
//! );
//! let critical = Alert::new(
//!     "generic-2",
//!     Severity::Critical,
//!     "Water main break",
//!     "Boil water advisory",
//!     Utc::now(),
//!     AlertMetadata::Generic { display_severity: Severity::Critical.display() },
//! );
//!
//! let sorted = sort_by_severity(vec![minor, critical]);
//! assert_eq!(sorted[0].id, "generic-2");
//! ```

pub mod hash;
pub mod ordering;
pub mod types;

pub use hash::compute_alerts_hash;
pub use ordering::{dedupe_by_id, severity_counts, sort_by_severity};
pub use types::{
    Alert, AlertMetadata, Category, DisplaySeverity, Severity, SourceId, TransitOrigin,
    UnknownSource,
};
