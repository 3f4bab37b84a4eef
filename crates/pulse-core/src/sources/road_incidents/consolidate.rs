//! Merging of incident records that describe the same work.
//!
//! Two records merge when they share a normalized road and an extracted project
//! number, or, for maintenance without a project number, the same road, direction,
//! location and condition. Project grouping is tried first.

use super::{classify::IncidentFacts, model::RoadIncident};
use crate::utils::{collapse_whitespace, parse_timestamp};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::{collections::HashMap, sync::LazyLock};

static PROJECT_NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b(?:([A-Z]{1,2})-(\d{4}[A-Z]{0,2})|(C\d{6}))\b").ok()
});

/// Route prefixes that look like project numbers but are road designations.
const ROAD_PREFIXES: [&str; 3] = ["SR", "NC", "US"];

/// Extracts a contract or TIP project number such as `U-2719` or `C204567`.
#[must_use]
pub fn extract_project_number(text: &str) -> Option<String> {
    let re = PROJECT_NUMBER.as_ref()?;
    re.captures_iter(text).find_map(|caps| {
        if let Some(contract) = caps.get(3) {
            return Some(contract.as_str().to_string());
        }
        let prefix = caps.get(1)?.as_str();
        if ROAD_PREFIXES.contains(&prefix) {
            return None;
        }
        Some(format!("{prefix}-{}", caps.get(2)?.as_str()))
    })
}

/// Uppercased road name with interstate spellings unified (`Interstate 40` is `I-40`).
#[must_use]
pub fn normalize_road(road: &str) -> String {
    let upper = collapse_whitespace(road).to_uppercase();
    let upper = upper.strip_prefix("INTERSTATE ").map_or(upper.clone(), |rest| format!("I-{rest}"));
    match upper.strip_prefix("I ") {
        Some(rest) => format!("I-{rest}"),
        None => upper,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Project { road: String, project: String },
    Maintenance { road: String, direction: String, location: String, condition: String },
    Single(String),
}

fn normalize_field(value: Option<&str>) -> String {
    value.map(|v| collapse_whitespace(v).to_lowercase()).unwrap_or_default()
}

fn group_key(incident: &RoadIncident, id: &str, facts: &IncidentFacts) -> GroupKey {
    let road = normalize_road(incident.road.as_deref().unwrap_or_default());
    let fields = [&incident.reason, &incident.condition, &incident.incident_type, &incident.detour];
    let project_text = fields
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(project) = extract_project_number(&project_text) {
        return GroupKey::Project { road, project };
    }
    if facts.maintenance {
        return GroupKey::Maintenance {
            road,
            direction: normalize_field(incident.direction.as_deref()),
            location: normalize_field(incident.location.as_deref()),
            condition: normalize_field(incident.condition.as_deref()),
        };
    }
    GroupKey::Single(id.to_string())
}

/// One or more incident records presented as a single alert.
#[derive(Debug, Clone)]
pub struct IncidentGroup {
    /// First record of the group in feed order; supplies road, text and coordinates.
    pub primary: RoadIncident,
    /// Constituent ids, sorted.
    pub ids: Vec<String>,
    pub facts: IncidentFacts,
    pub project_number: Option<String>,
    pub from_mile_marker: Option<f64>,
    pub to_mile_marker: Option<f64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl IncidentGroup {
    fn new(
        incident: &RoadIncident,
        id: &str,
        facts: IncidentFacts,
        project: Option<String>,
    ) -> Self {
        let markers = [incident.from_mile_marker, incident.to_mile_marker];
        Self {
            primary: incident.clone(),
            ids: vec![id.to_string()],
            facts,
            project_number: project,
            from_mile_marker: min_finite(markers),
            to_mile_marker: max_finite(markers),
            start: incident.start.as_deref().and_then(parse_timestamp),
            end: incident.end.as_deref().and_then(parse_timestamp),
        }
    }

    fn absorb(&mut self, incident: &RoadIncident, id: &str, facts: &IncidentFacts) {
        if !self.ids.iter().any(|existing| existing == id) {
            self.ids.push(id.to_string());
            self.ids.sort();
        }
        self.facts = self.facts.merge(facts);
        self.from_mile_marker = min_finite([
            self.from_mile_marker,
            incident.from_mile_marker,
            incident.to_mile_marker,
        ]);
        self.to_mile_marker =
            max_finite([self.to_mile_marker, incident.from_mile_marker, incident.to_mile_marker]);
        self.start = earliest(self.start, incident.start.as_deref().and_then(parse_timestamp));
        self.end = latest(self.end, incident.end.as_deref().and_then(parse_timestamp));
    }

    /// Number of feed records folded into this group.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_consolidated(&self) -> bool {
        self.ids.len() > 1
    }
}

fn min_finite<const N: usize>(values: [Option<f64>; N]) -> Option<f64> {
    values.into_iter().flatten().filter(|v| v.is_finite()).reduce(f64::min)
}

fn max_finite<const N: usize>(values: [Option<f64>; N]) -> Option<f64> {
    values.into_iter().flatten().filter(|v| v.is_finite()).reduce(f64::max)
}

fn earliest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn latest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// Groups incidents in feed order. Records without an id are dropped.
#[must_use]
pub fn consolidate(incidents: &[RoadIncident]) -> Vec<IncidentGroup> {
    let mut groups: Vec<IncidentGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for incident in incidents {
        let Some(id) = incident.id.as_deref() else {
            continue;
        };
        let facts = IncidentFacts::from_incident(incident);
        let key = group_key(incident, id, &facts);

        match index.get(&key) {
            Some(&position) => groups[position].absorb(incident, id, &facts),
            None => {
                let project = match &key {
                    GroupKey::Project { project, .. } => Some(project.clone()),
                    _ => None,
                };
                index.insert(key, groups.len());
                groups.push(IncidentGroup::new(incident, id, facts, project));
            }
        }
    }

    groups
}
