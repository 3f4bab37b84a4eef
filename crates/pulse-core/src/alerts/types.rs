//! Canonical alert type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Upstream provider an alert originated from.
///
/// The set is closed: every source the aggregator knows about has a variant here, plus
/// the reserved `Generic`, `System` and `Custom` values for alerts produced outside the
/// feed pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceId {
    WeatherService,
    AviationStatus,
    PowerUtility,
    RoadIncidents,
    Transit,
    PoliceTraffic,
    RoadFlow,
    Generic,
    System,
    Custom,
}

impl SourceId {
    /// The seven upstream feeds, in registry order.
    pub const FEEDS: [SourceId; 7] = [
        Self::WeatherService,
        Self::AviationStatus,
        Self::PowerUtility,
        Self::RoadIncidents,
        Self::Transit,
        Self::PoliceTraffic,
        Self::RoadFlow,
    ];

    /// Returns the kebab-case wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeatherService => "weather-service",
            Self::AviationStatus => "aviation-status",
            Self::PowerUtility => "power-utility",
            Self::RoadIncidents => "road-incidents",
            Self::Transit => "transit",
            Self::PoliceTraffic => "police-traffic",
            Self::RoadFlow => "road-flow",
            Self::Generic => "generic",
            Self::System => "system",
            Self::Custom => "custom",
        }
    }

    /// Category alerts from this source are grouped under by default.
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            Self::WeatherService => Category::Weather,
            Self::AviationStatus => Category::Aviation,
            Self::PowerUtility => Category::Power,
            Self::RoadIncidents | Self::PoliceTraffic | Self::RoadFlow => Category::Traffic,
            Self::Transit => Category::Transit,
            Self::Generic | Self::System | Self::Custom => Category::Other,
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown source name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown source: {0}")]
pub struct UnknownSource(pub String);

impl FromStr for SourceId {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Generic, Self::System, Self::Custom]
            .into_iter()
            .chain(Self::FEEDS)
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

/// Coarse grouping used by the UI, independent of source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Weather,
    Aviation,
    Power,
    Traffic,
    Transit,
    Other,
}

impl Category {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Aviation => "aviation",
            Self::Power => "power",
            Self::Traffic => "traffic",
            Self::Transit => "transit",
            Self::Other => "other",
        }
    }
}

/// Severity tier of an alert.
///
/// Variants are declared from least to most severe so that the derived `Ord` makes
/// `Critical` the maximum. Display order (most severe first) is the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; little or no disruption.
    Minor,
    /// Noticeable disruption worth planning around.
    Moderate,
    /// Significant disruption.
    High,
    /// Life-safety or severe disruption requiring immediate attention.
    Critical,
}

impl Severity {
    /// All tiers, most severe first.
    pub const ALL: [Severity; 4] = [Self::Critical, Self::High, Self::Moderate, Self::Minor];

    /// Position in display order, `0` being the most severe.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Moderate => 2,
            Self::Minor => 3,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Minor => "minor",
        }
    }

    /// Rendering hint carried in every metadata variant.
    #[must_use]
    pub fn display(&self) -> DisplaySeverity {
        match self {
            Self::Critical => DisplaySeverity::Danger,
            Self::High => DisplaySeverity::Warning,
            Self::Moderate => DisplaySeverity::Caution,
            Self::Minor => DisplaySeverity::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual treatment the UI should apply to an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplaySeverity {
    Danger,
    Warning,
    Caution,
    Info,
}

/// Where a transit alert came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitOrigin {
    /// Structured service-alert feed.
    Feed,
    /// Agency social-media post.
    Social,
}

/// Source-specific fields preserved for display and summarization.
///
/// Tagged by source so that each variant's fields are statically known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum AlertMetadata {
    #[serde(rename_all = "camelCase")]
    WeatherService {
        event: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        urgency: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        certainty: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        upstream_severity: Option<String>,
        display_severity: DisplaySeverity,
    },
    #[serde(rename_all = "camelCase")]
    AviationStatus {
        airport_code: String,
        delay_type: String,
        delay_minutes: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        trend: Option<String>,
        display_severity: DisplaySeverity,
    },
    #[serde(rename_all = "camelCase")]
    PowerUtility {
        event_number: String,
        customers_affected: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        cause: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        crew_status: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        estimated_restoration: Option<DateTime<Utc>>,
        /// `false` when the per-outage detail fetch failed and the list summary was used.
        detail_available: bool,
        display_severity: DisplaySeverity,
    },
    #[serde(rename_all = "camelCase")]
    RoadIncidents {
        road: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        direction: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        incident_type: Option<String>,
        lanes_closed: u32,
        lanes_total: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        project_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        from_mile_marker: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        to_mile_marker: Option<f64>,
        source_ids: Vec<String>,
        display_severity: DisplaySeverity,
    },
    #[serde(rename_all = "camelCase")]
    Transit {
        origin: TransitOrigin,
        routes: Vec<String>,
        effect: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        cause: Option<String>,
        display_severity: DisplaySeverity,
    },
    #[serde(rename_all = "camelCase")]
    PoliceTraffic {
        incident_number: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_description: Option<String>,
        display_severity: DisplaySeverity,
    },
    #[serde(rename_all = "camelCase")]
    RoadFlow {
        route: String,
        segment_count: usize,
        max_jam_factor: f64,
        congestion_percent: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        average_speed_mph: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        free_flow_speed_mph: Option<f64>,
        display_severity: DisplaySeverity,
    },
    #[serde(rename_all = "camelCase")]
    Generic { display_severity: DisplaySeverity },
    #[serde(rename_all = "camelCase")]
    System { display_severity: DisplaySeverity },
    #[serde(rename_all = "camelCase")]
    Custom { display_severity: DisplaySeverity },
}

impl AlertMetadata {
    /// Source this metadata variant belongs to.
    #[must_use]
    pub fn source(&self) -> SourceId {
        match self {
            Self::WeatherService { .. } => SourceId::WeatherService,
            Self::AviationStatus { .. } => SourceId::AviationStatus,
            Self::PowerUtility { .. } => SourceId::PowerUtility,
            Self::RoadIncidents { .. } => SourceId::RoadIncidents,
            Self::Transit { .. } => SourceId::Transit,
            Self::PoliceTraffic { .. } => SourceId::PoliceTraffic,
            Self::RoadFlow { .. } => SourceId::RoadFlow,
            Self::Generic { .. } => SourceId::Generic,
            Self::System { .. } => SourceId::System,
            Self::Custom { .. } => SourceId::Custom,
        }
    }

    #[must_use]
    pub fn display_severity(&self) -> DisplaySeverity {
        match self {
            Self::WeatherService { display_severity, .. } |
            Self::AviationStatus { display_severity, .. } |
            Self::PowerUtility { display_severity, .. } |
            Self::RoadIncidents { display_severity, .. } |
            Self::Transit { display_severity, .. } |
            Self::PoliceTraffic { display_severity, .. } |
            Self::RoadFlow { display_severity, .. } |
            Self::Generic { display_severity } |
            Self::System { display_severity } |
            Self::Custom { display_severity } => *display_severity,
        }
    }
}

/// A normalized alert produced by a source converter.
///
/// Alerts are built once by a converter and then only read. The `source` field always
/// agrees with the `metadata` variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Deterministic identifier derived from the source and its native id(s).
    pub id: String,
    pub source: SourceId,
    pub category: Category,
    pub severity: Severity,
    pub title: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// When this record was produced, not necessarily when the event began.
    pub updated_at: DateTime<Utc>,
    pub metadata: AlertMetadata,
}

impl Alert {
    /// Creates an alert whose source and category are taken from `metadata`.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        summary: impl Into<String>,
        updated_at: DateTime<Utc>,
        metadata: AlertMetadata,
    ) -> Self {
        let source = metadata.source();
        Self {
            id: id.into(),
            source,
            category: source.category(),
            severity,
            title: title.into(),
            summary: summary.into(),
            description: None,
            instruction: None,
            affected_area: None,
            url: None,
            start_time: None,
            end_time: None,
            updated_at,
            metadata,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_instruction(mut self, instruction: Option<String>) -> Self {
        self.instruction = instruction.filter(|i| !i.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_affected_area(mut self, area: Option<String>) -> Self {
        self.affected_area = area.filter(|a| !a.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    #[must_use]
    pub fn with_window(
        mut self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }
}
