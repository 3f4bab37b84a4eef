//! Small helpers shared by the source converters.
//!
//! - **`de`**: lenient serde helpers for loosely typed upstream fields
//! - **`geo`**: map links from coordinates, only when both are finite
//! - **`text`**: whitespace cleanup and bounded summaries
//! - **`time`**: tolerant timestamp parsing for the upstream formats

pub mod de;
pub mod geo;
pub mod text;
pub mod time;

pub use geo::map_url;
pub use text::{clean, collapse_whitespace, contains_any, slug, truncate_chars};
pub use time::{from_epoch_millis, parse_timestamp};
