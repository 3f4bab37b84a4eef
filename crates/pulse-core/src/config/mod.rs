//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `PULSE_CONFIG` env var
//! 3. **Environment variables**: `PULSE__*` env vars override specific fields
//!
//! # Configuration Sections
//!
//! - [`ServerConfig`]: HTTP server settings (bind address, timeouts)
//! - [`HttpClientConfig`]: shared upstream client (concurrency, timeouts, user agent)
//! - [`CacheConfig`]: response cache sizing and TTL
//! - [`LoggingConfig`]: log level and format
//! - [`LocationConfig`]: the area the dashboard covers
//! - [`SourcesConfig`]: one table per upstream feed
//! - [`SummaryConfig`]: summarization service endpoint
//!
//! # Example
//!
//! ```toml
//! [location]
//! latitude = 35.7796
//! longitude = -78.6382
//! utc_offset_minutes = -300
//!
//! [sources.aviation]
//! airports = ["RDU"]
//!
//! [sources.road_flow]
//! base_url = "https://proxy.example.com/here"
//! daily_credit_limit = 800
//! ```

use crate::{alerts::SourceId, upstream::HttpClientConfig};
use chrono::{FixedOffset, Offset, Utc};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// HTTP server configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind the server to. Defaults to `127.0.0.1`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port number to listen on. Must be greater than 0. Defaults to `3040`.
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Upper bound on one aggregation cycle served over HTTP. Defaults to `30`.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    3040
}

fn default_request_timeout_seconds() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether fetchers read through the in-process cache. Defaults to `true`.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of cached upstream bodies. Defaults to `256`.
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

fn default_true() -> bool {
    true
}

fn default_cache_max_entries() -> usize {
    256
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true, max_entries: default_cache_max_entries() }
    }
}

/// Application logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "trace", "debug", "info", "warn", "error"). Defaults to `"info"`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

/// Geographic bounding box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.south &&
            latitude <= self.north &&
            longitude >= self.west &&
            longitude <= self.east
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.west, self.south, self.east, self.north].iter().all(|v| v.is_finite()) &&
            self.west < self.east &&
            self.south < self.north &&
            (-90.0..=90.0).contains(&self.south) &&
            (-90.0..=90.0).contains(&self.north) &&
            (-180.0..=180.0).contains(&self.west) &&
            (-180.0..=180.0).contains(&self.east)
    }

    /// `west,south,east,north` as used in upstream query strings.
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

/// The area the dashboard covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub bbox: BoundingBox,

    /// Offset from UTC used for local-time policies such as nighttime suppression.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

fn default_utc_offset_minutes() -> i32 {
    -300
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: 35.7796,
            longitude: -78.6382,
            bbox: BoundingBox { west: -79.0, south: 35.5, east: -78.3, north: 36.1 },
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

impl LocationConfig {
    /// The configured local offset, falling back to UTC when out of range.
    // TODO: switch to a named zone once DST transitions need to be honored.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

/// National weather service alerts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_weather_url")]
    pub base_url: String,
    #[serde(default = "default_stale_short")]
    pub stale_after_seconds: u64,
}

fn default_weather_url() -> String {
    "https://api.weather.gov".to_string()
}

fn default_stale_short() -> u64 {
    300
}

impl Default for WeatherSourceConfig {
    fn default() -> Self {
        Self { enabled: true, base_url: default_weather_url(), stale_after_seconds: 300 }
    }
}

/// Airport delay status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AviationSourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_aviation_url")]
    pub base_url: String,
    /// IATA codes of the airports to watch.
    #[serde(default = "default_airports")]
    pub airports: Vec<String>,
    #[serde(default = "default_stale_long")]
    pub stale_after_seconds: u64,
}

fn default_aviation_url() -> String {
    "https://soa.smext.faa.gov/asws/api".to_string()
}

fn default_airports() -> Vec<String> {
    vec!["RDU".to_string()]
}

fn default_stale_long() -> u64 {
    600
}

impl Default for AviationSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_aviation_url(),
            airports: default_airports(),
            stale_after_seconds: 600,
        }
    }
}

/// Electric utility outage map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerSourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_power_url")]
    pub base_url: String,
    #[serde(default = "default_jurisdiction")]
    pub jurisdiction: String,
    /// Outages beyond this many (largest first) keep their list-level summary.
    #[serde(default = "default_max_detail_fetches")]
    pub max_detail_fetches: usize,
    /// Drop outages located outside `location.bbox`. Defaults to `true`.
    #[serde(default = "default_true")]
    pub restrict_to_bbox: bool,
    #[serde(default = "default_stale_short")]
    pub stale_after_seconds: u64,
}

fn default_power_url() -> String {
    "https://prod.apigee.duke-energy.app/outage-maps/v1".to_string()
}

fn default_jurisdiction() -> String {
    "DEC".to_string()
}

fn default_max_detail_fetches() -> usize {
    25
}

impl Default for PowerSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_power_url(),
            jurisdiction: default_jurisdiction(),
            max_detail_fetches: default_max_detail_fetches(),
            restrict_to_bbox: true,
            stale_after_seconds: 300,
        }
    }
}

/// State DOT road incident feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadIncidentsSourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_road_incidents_url")]
    pub base_url: String,
    /// Counties to query; results are merged.
    #[serde(default = "default_county_ids")]
    pub county_ids: Vec<u32>,
    #[serde(default = "default_stale_short")]
    pub stale_after_seconds: u64,
}

fn default_road_incidents_url() -> String {
    "https://eapps.ncdot.gov/services/traffic-prod/v1".to_string()
}

fn default_county_ids() -> Vec<u32> {
    vec![92]
}

impl Default for RoadIncidentsSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_road_incidents_url(),
            county_ids: default_county_ids(),
            stale_after_seconds: 300,
        }
    }
}

/// Agency social feed used to augment structured transit alerts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialFeedConfig {
    #[serde(default = "default_social_url")]
    pub base_url: String,
    pub actor: String,
    /// Posts older than this are ignored. Defaults to `12`.
    #[serde(default = "default_social_window_hours")]
    pub window_hours: u32,
    #[serde(default = "default_social_limit")]
    pub limit: u32,
}

fn default_social_url() -> String {
    "https://public.api.bsky.app/xrpc".to_string()
}

fn default_social_window_hours() -> u32 {
    12
}

fn default_social_limit() -> u32 {
    30
}

/// Transit service alerts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitSourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_transit_url")]
    pub base_url: String,
    #[serde(default)]
    pub social: Option<SocialFeedConfig>,
    #[serde(default = "default_stale_short")]
    pub stale_after_seconds: u64,
}

fn default_transit_url() -> String {
    "https://transit-proxy.example.com/goraleigh".to_string()
}

impl Default for TransitSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_transit_url(),
            social: Some(SocialFeedConfig {
                base_url: default_social_url(),
                actor: "goraleigh.bsky.social".to_string(),
                window_hours: default_social_window_hours(),
                limit: default_social_limit(),
            }),
            stale_after_seconds: 300,
        }
    }
}

/// Police computer-aided-dispatch traffic incidents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoliceSourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Feature layer URL; `/query` is appended.
    #[serde(default = "default_police_url")]
    pub base_url: String,
    #[serde(default = "default_stale_police")]
    pub stale_after_seconds: u64,
}

fn default_police_url() -> String {
    "https://services.arcgis.com/v400IkDOw1ad7Yad/arcgis/rest/services/Traffic_Incidents/FeatureServer/0"
        .to_string()
}

fn default_stale_police() -> u64 {
    180
}

impl Default for PoliceSourceConfig {
    fn default() -> Self {
        Self { enabled: true, base_url: default_police_url(), stale_after_seconds: 180 }
    }
}

/// Commercial road-flow feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadFlowSourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_road_flow_url")]
    pub base_url: String,
    /// A route group must exceed this maximum jam factor. Defaults to `7.0`.
    #[serde(default = "default_min_jam_factor")]
    pub min_jam_factor: f64,
    /// Minimum congestion percent for a route group to alert. Defaults to `80.0`.
    #[serde(default = "default_min_congestion_percent")]
    pub min_congestion_percent: f64,
    /// Minimum number of segments in a route group. Defaults to `10`.
    #[serde(default = "default_min_segments")]
    pub min_segments: usize,
    /// Credits the upstream allows per day.
    #[serde(default = "default_daily_credit_limit")]
    pub daily_credit_limit: u32,
    /// Credits charged per flow request.
    #[serde(default = "default_credits_per_request")]
    pub credits_per_request: u32,
    /// How long a flow payload is reused from the response cache.
    #[serde(default = "default_stale_short")]
    pub cache_ttl_seconds: u64,
    #[serde(default = "default_stale_short")]
    pub stale_after_seconds: u64,
}

fn default_road_flow_url() -> String {
    "https://data.traffic.hereapi.com".to_string()
}

fn default_min_jam_factor() -> f64 {
    7.0
}

fn default_min_congestion_percent() -> f64 {
    80.0
}

fn default_min_segments() -> usize {
    10
}

fn default_daily_credit_limit() -> u32 {
    1000
}

fn default_credits_per_request() -> u32 {
    1
}

impl Default for RoadFlowSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_road_flow_url(),
            min_jam_factor: default_min_jam_factor(),
            min_congestion_percent: default_min_congestion_percent(),
            min_segments: default_min_segments(),
            daily_credit_limit: default_daily_credit_limit(),
            credits_per_request: default_credits_per_request(),
            cache_ttl_seconds: 300,
            stale_after_seconds: 300,
        }
    }
}

/// One table per upstream feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub weather: WeatherSourceConfig,
    #[serde(default)]
    pub aviation: AviationSourceConfig,
    #[serde(default)]
    pub power: PowerSourceConfig,
    #[serde(default)]
    pub road_incidents: RoadIncidentsSourceConfig,
    #[serde(default)]
    pub transit: TransitSourceConfig,
    #[serde(default)]
    pub police: PoliceSourceConfig,
    #[serde(default)]
    pub road_flow: RoadFlowSourceConfig,
}

impl SourcesConfig {
    /// Whether the given feed is enabled. Reserved ids are never fetched.
    #[must_use]
    pub fn is_enabled(&self, id: SourceId) -> bool {
        match id {
            SourceId::WeatherService => self.weather.enabled,
            SourceId::AviationStatus => self.aviation.enabled,
            SourceId::PowerUtility => self.power.enabled,
            SourceId::RoadIncidents => self.road_incidents.enabled,
            SourceId::Transit => self.transit.enabled,
            SourceId::PoliceTraffic => self.police.enabled,
            SourceId::RoadFlow => self.road_flow.enabled,
            SourceId::Generic | SourceId::System | SourceId::Custom => false,
        }
    }

    fn base_urls(&self) -> Vec<(SourceId, &str)> {
        let mut urls = vec![
            (SourceId::WeatherService, self.weather.base_url.as_str()),
            (SourceId::AviationStatus, self.aviation.base_url.as_str()),
            (SourceId::PowerUtility, self.power.base_url.as_str()),
            (SourceId::RoadIncidents, self.road_incidents.base_url.as_str()),
            (SourceId::Transit, self.transit.base_url.as_str()),
            (SourceId::PoliceTraffic, self.police.base_url.as_str()),
            (SourceId::RoadFlow, self.road_flow.base_url.as_str()),
        ];
        if let Some(social) = &self.transit.social {
            urls.push((SourceId::Transit, social.base_url.as_str()));
        }
        urls
    }
}

/// Summarization service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Endpoint accepting the summary request. Summaries are disabled when unset.
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Root application configuration containing all subsystem settings.
///
/// Loaded with the `PULSE` prefix for environment overrides using `__` as a separator,
/// e.g. `PULSE__SOURCES__ROAD_FLOW__ENABLED=false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment (e.g., "development", "production"). Defaults to `"development"`.
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub http: HttpClientConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub summary: SummaryConfig,
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            server: ServerConfig::default(),
            http: HttpClientConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
            location: LocationConfig::default(),
            sources: SourcesConfig::default(),
            summary: SummaryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// A missing file is not an error; compiled defaults apply.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be parsed or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("PULSE").prefix_separator("__").separator("__"))
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from `config/config.toml` with fallback to defaults.
    ///
    /// The config file path can be overridden using the `PULSE_CONFIG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("PULSE_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Returns the parsed socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error string if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, String> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
            .parse()
            .map_err(|_| {
                format!(
                    "Invalid socket address: {}:{}",
                    self.server.bind_address, self.server.bind_port
                )
            })
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if !SourceId::FEEDS.iter().any(|id| self.sources.is_enabled(*id)) {
            return Err("No sources enabled".to_string());
        }

        for (source, url) in self.sources.base_urls() {
            if url.is_empty() {
                return Err(format!("Empty base URL for source: {source}"));
            }
            if url::Url::parse(url).map(|u| !u.scheme().starts_with("http")).unwrap_or(true) {
                return Err(format!("Invalid base URL for source {source}: {url}"));
            }
        }

        if let Some(endpoint) = &self.summary.endpoint {
            if url::Url::parse(endpoint).is_err() {
                return Err(format!("Invalid summary endpoint: {endpoint}"));
            }
        }

        if self.sources.aviation.enabled && self.sources.aviation.airports.is_empty() {
            return Err("Aviation source enabled without airports".to_string());
        }

        if self.sources.road_incidents.enabled && self.sources.road_incidents.county_ids.is_empty()
        {
            return Err("Road incident source enabled without county ids".to_string());
        }

        if let Some(social) = &self.sources.transit.social {
            if social.actor.trim().is_empty() {
                return Err("Transit social feed configured without an actor".to_string());
            }
        }

        if self.sources.road_flow.credits_per_request == 0 {
            return Err("Road flow credits per request must be greater than 0".to_string());
        }

        if !(-90.0..=90.0).contains(&self.location.latitude) ||
            !(-180.0..=180.0).contains(&self.location.longitude)
        {
            return Err("Location latitude/longitude out of range".to_string());
        }

        if !self.location.bbox.is_valid() {
            return Err("Location bounding box is invalid".to_string());
        }

        if FixedOffset::east_opt(self.location.utc_offset_minutes * 60).is_none() {
            return Err("UTC offset must be within +/- 24 hours".to_string());
        }

        if self.http.concurrent_limit == 0 {
            return Err("HTTP concurrency limit must be greater than 0".to_string());
        }

        if self.http.request_timeout_ms == 0 {
            return Err("HTTP request timeout must be greater than 0".to_string());
        }

        if self.server.bind_port == 0 {
            return Err("Bind port must be greater than 0".to_string());
        }

        if self.server.request_timeout_seconds == 0 {
            return Err("Server request timeout must be greater than 0".to_string());
        }

        if self.cache.max_entries == 0 {
            return Err("Cache max entries must be greater than 0".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}
