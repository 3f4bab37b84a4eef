use super::routes::RouteCongestion;
use crate::{
    alerts::{Alert, AlertMetadata, Severity},
    sources::ConvertContext,
    utils::slug,
};

/// Emission thresholds for a route group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowThresholds {
    /// Strictly exceeded by the route's maximum jam factor.
    pub min_jam_factor: f64,
    pub min_congestion_percent: f64,
    pub min_segments: usize,
}

impl Default for FlowThresholds {
    fn default() -> Self {
        Self { min_jam_factor: 7.0, min_congestion_percent: 80.0, min_segments: 10 }
    }
}

impl FlowThresholds {
    #[must_use]
    pub fn admits(&self, route: &RouteCongestion) -> bool {
        route.max_jam_factor > self.min_jam_factor &&
            route.congestion_percent >= self.min_congestion_percent &&
            route.segment_count >= self.min_segments
    }
}

/// Congestion percent: 70+ critical, 40+ high, otherwise moderate.
#[must_use]
pub fn classify_road_flow(congestion_percent: f64) -> Severity {
    if congestion_percent >= 70.0 {
        Severity::Critical
    } else if congestion_percent >= 40.0 {
        Severity::High
    } else {
        Severity::Moderate
    }
}

/// Converts a route group, or `None` when it does not clear the thresholds.
#[must_use]
pub fn convert_route(
    route: &RouteCongestion,
    thresholds: &FlowThresholds,
    ctx: &ConvertContext,
) -> Option<Alert> {
    if !thresholds.admits(route) {
        return None;
    }
    let severity = classify_road_flow(route.congestion_percent);

    let mut summary = format!(
        "Traffic {:.0}% slower than normal across {} segments",
        route.congestion_percent, route.segment_count
    );
    if let (Some(speed), Some(free)) = (route.average_speed_mph, route.free_flow_speed_mph) {
        summary.push_str(&format!(" ({speed:.0} mph vs {free:.0} mph typical)"));
    }

    let metadata = AlertMetadata::RoadFlow {
        route: route.route.clone(),
        segment_count: route.segment_count,
        max_jam_factor: route.max_jam_factor,
        congestion_percent: route.congestion_percent,
        average_speed_mph: route.average_speed_mph,
        free_flow_speed_mph: route.free_flow_speed_mph,
        display_severity: severity.display(),
    };

    Some(
        Alert::new(
            format!("road-flow-{}", slug(&route.route)),
            severity,
            format!("Heavy congestion on {}", route.route),
            summary,
            ctx.now,
            metadata,
        )
        .with_affected_area(Some(route.route.clone())),
    )
}
