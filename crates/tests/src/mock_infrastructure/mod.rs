//! Mock upstreams for the Pulse fetchers.
//!
//! - `FeedMockBuilder`: wraps one mockito server that hosts every feed under its own
//!   path prefix
//! - `fixtures`: upstream payload builders and a config pointing every source at the
//!   mock server
//!
//! ## Usage
//!
//! ```ignore
//! use tests::mock_infrastructure::{fixtures, FeedMockBuilder, WEATHER_PATH};
//!
//! let mut mock = FeedMockBuilder::new().await;
//! let path = format!("{WEATHER_PATH}/alerts/active");
//! mock.mock_json(&path, &fixtures::weather_alerts(&[])).await;
//! let config = fixtures::test_config(&mock.url());
//! ```

pub mod feed_mock;
pub mod fixtures;

pub use feed_mock::{
    FeedMockBuilder, AVIATION_PATH, POLICE_PATH, POWER_PATH, ROAD_FLOW_PATH,
    ROAD_INCIDENTS_PATH, SOCIAL_PATH, TRANSIT_PATH, WEATHER_PATH,
};
