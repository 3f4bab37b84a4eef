use super::model::RoadIncident;
use crate::{alerts::Severity, utils::contains_any};

const FATAL: [&str; 2] = ["fatal", "fatality"];
const BRIDGE: [&str; 1] = ["bridge"];
const FULL_CLOSURE: [&str; 6] = [
    "road closed",
    "all lanes closed",
    "full closure",
    "fully closed",
    "closed in both directions",
    "both directions closed",
];
const MOVING_CLOSURE: [&str; 4] =
    ["moving closure", "rolling closure", "rolling roadblock", "moving operation"];
const CRASH: [&str; 5] = ["crash", "collision", "accident", "vehicle fire", "overturned"];
const LOCAL_TRAFFIC_ONLY: [&str; 1] = ["local traffic only"];
const LANE_CLOSED: [&str; 3] = ["lane closed", "lanes closed", "lane closure"];
const MAINTENANCE: [&str; 11] = [
    "maintenance",
    "construction",
    "road work",
    "roadwork",
    "work zone",
    "paving",
    "resurfacing",
    "utility work",
    "striping",
    "patching",
    "mowing",
];

/// Classification inputs derived from one incident or a consolidated group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentFacts {
    /// Lowercased type, reason and condition text.
    pub text: String,
    pub lanes_closed: u32,
    pub lanes_total: u32,
    pub maintenance: bool,
}

impl IncidentFacts {
    #[must_use]
    pub fn from_incident(incident: &RoadIncident) -> Self {
        let text = [&incident.incident_type, &incident.reason, &incident.condition]
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");
        let maintenance = incident.work_zone || contains_any(&text, &MAINTENANCE);
        Self {
            text,
            lanes_closed: incident.lanes_closed.unwrap_or(0),
            lanes_total: incident.lanes_total.unwrap_or(0),
            maintenance,
        }
    }

    /// Facts for a consolidated group: joined text, widest lane closure.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let text = match (self.text.is_empty(), other.text.is_empty()) {
            (true, _) => other.text.clone(),
            (_, true) => self.text.clone(),
            _ if self.text == other.text => self.text.clone(),
            _ => format!("{} | {}", self.text, other.text),
        };
        Self {
            text,
            lanes_closed: self.lanes_closed.max(other.lanes_closed),
            lanes_total: self.lanes_total.max(other.lanes_total),
            maintenance: self.maintenance || other.maintenance,
        }
    }

    /// Closed lanes over total lanes, `0.0` when the total is unknown.
    #[must_use]
    pub fn lane_ratio(&self) -> f64 {
        if self.lanes_total == 0 {
            return 0.0;
        }
        f64::from(self.lanes_closed) / f64::from(self.lanes_total)
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        contains_any(&self.text, &FATAL)
    }

    #[must_use]
    pub fn is_bridge(&self) -> bool {
        contains_any(&self.text, &BRIDGE)
    }

    #[must_use]
    pub fn is_crash(&self) -> bool {
        contains_any(&self.text, &CRASH)
    }

    #[must_use]
    pub fn is_full_closure(&self) -> bool {
        (self.lanes_total > 0 && self.lanes_closed >= self.lanes_total) ||
            contains_any(&self.text, &FULL_CLOSURE)
    }

    #[must_use]
    pub fn is_moving_closure(&self) -> bool {
        contains_any(&self.text, &MOVING_CLOSURE)
    }

    #[must_use]
    pub fn is_local_traffic_only(&self) -> bool {
        contains_any(&self.text, &LOCAL_TRAFFIC_ONLY)
    }

    #[must_use]
    pub fn mentions_lane_closure(&self) -> bool {
        contains_any(&self.text, &LANE_CLOSED)
    }
}

/// Severity cascade for road incidents. The first matching rule wins:
///
/// 1. fatality, bridge, full closure, non-maintenance moving closure, crash or
///    local-traffic-only: critical
/// 2. half or more of the lanes closed, or lane-closed text: moderate
/// 3. anything else: minor
#[must_use]
pub fn classify_road_incident(facts: &IncidentFacts) -> Severity {
    if facts.is_fatal() {
        return Severity::Critical;
    }
    if facts.is_bridge() ||
        facts.is_full_closure() ||
        (facts.is_moving_closure() && !facts.maintenance) ||
        facts.is_crash() ||
        facts.is_local_traffic_only()
    {
        return Severity::Critical;
    }
    if facts.lane_ratio() >= 0.5 || facts.mentions_lane_closure() {
        return Severity::Moderate;
    }
    Severity::Minor
}
