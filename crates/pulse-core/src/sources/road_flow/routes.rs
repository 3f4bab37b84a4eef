//! Consolidation of flow segments into named major routes.

use super::model::FlowResult;
use regex::Regex;
use std::{collections::BTreeMap, sync::LazyLock};

static MAJOR_ROUTE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(I|INTERSTATE|US|NC|SR|STATE ROUTE|STATE HIGHWAY)[\s-]*(\d{1,4})\b").ok()
});

const METERS_PER_SECOND_TO_MPH: f64 = 2.236_936;

/// Canonical route name for a segment description, or `None` for anything that is
/// not an interstate, US route or state route.
///
/// `"I-40 E"`, `"Interstate 40"` and `"I 40/US-64"` all map to `I-40`.
#[must_use]
pub fn normalize_route_name(description: &str) -> Option<String> {
    let upper = description.trim().to_uppercase();
    let caps = MAJOR_ROUTE.as_ref()?.captures(&upper)?;
    let prefix = match &caps[1] {
        "I" | "INTERSTATE" => "I",
        "US" => "US",
        "NC" => "NC",
        _ => "SR",
    };
    Some(format!("{prefix}-{}", &caps[2]))
}

/// Aggregate congestion for one route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteCongestion {
    pub route: String,
    pub segment_count: usize,
    pub max_jam_factor: f64,
    /// Length-weighted `(1 - speed / free_flow) * 100`, clamped to `0..=100`.
    pub congestion_percent: f64,
    pub average_speed_mph: Option<f64>,
    pub free_flow_speed_mph: Option<f64>,
}

#[derive(Default)]
struct Accumulator {
    segment_count: usize,
    max_jam_factor: f64,
    weighted_slowdown: f64,
    slowdown_weight: f64,
    weighted_speed: f64,
    weighted_free_flow: f64,
}

impl Accumulator {
    fn add(&mut self, result: &FlowResult) {
        let flow = &result.current_flow;
        self.segment_count += 1;
        if let Some(jam) = flow.jam_factor.filter(|j| j.is_finite()) {
            self.max_jam_factor = self.max_jam_factor.max(jam);
        }

        let weight = result.location.length.filter(|l| l.is_finite() && *l > 0.0).unwrap_or(1.0);
        let closed =
            flow.traversability.as_deref().is_some_and(|t| t.eq_ignore_ascii_case("closed"));
        let speeds = match (flow.speed, flow.free_flow) {
            (Some(speed), Some(free)) if speed.is_finite() && free.is_finite() && free > 0.0 => {
                Some((speed.max(0.0), free))
            }
            _ if closed => Some((0.0, 1.0)),
            _ => None,
        };
        if let Some((speed, free)) = speeds {
            let slowdown = (1.0 - speed / free).clamp(0.0, 1.0);
            self.weighted_slowdown += slowdown * weight;
            self.slowdown_weight += weight;
            self.weighted_speed += speed * weight;
            self.weighted_free_flow += free * weight;
        }
    }

    fn finish(self, route: String) -> RouteCongestion {
        let has_speeds = self.slowdown_weight > 0.0;
        let per_weight = |total: f64| has_speeds.then(|| total / self.slowdown_weight);
        RouteCongestion {
            route,
            segment_count: self.segment_count,
            max_jam_factor: self.max_jam_factor,
            congestion_percent: per_weight(self.weighted_slowdown).map_or(0.0, |s| s * 100.0),
            average_speed_mph: per_weight(self.weighted_speed)
                .map(|s| s * METERS_PER_SECOND_TO_MPH),
            free_flow_speed_mph: per_weight(self.weighted_free_flow)
                .map(|s| s * METERS_PER_SECOND_TO_MPH),
        }
    }
}

/// Groups segments by normalized route name, dropping minor roads. Routes come back
/// sorted by name.
#[must_use]
pub fn group_by_route(results: &[FlowResult]) -> Vec<RouteCongestion> {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for result in results {
        let Some(route) = result.location.description.as_deref().and_then(normalize_route_name)
        else {
            continue;
        };
        groups.entry(route).or_default().add(result);
    }
    groups.into_iter().map(|(route, acc)| acc.finish(route)).collect()
}
