use super::{classify::classify_road_incident, consolidate::IncidentGroup};
use crate::{
    alerts::{Alert, AlertMetadata},
    sources::ConvertContext,
    utils::{clean, map_url},
};

fn lane_text(closed: u32, total: u32) -> Option<String> {
    match (closed, total) {
        (0, _) => None,
        (closed, total) if total > 0 && closed >= total => Some("All lanes closed".to_string()),
        (1, 0) => Some("1 lane closed".to_string()),
        (closed, 0) => Some(format!("{closed} lanes closed")),
        (closed, total) => Some(format!("{closed} of {total} lanes closed")),
    }
}

fn format_marker(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Converts a consolidated incident group into one alert.
///
/// The summary lists, in order: location, lane count, end estimate and how many
/// reports were combined.
#[must_use]
pub fn convert_incident_group(group: &IncidentGroup, ctx: &ConvertContext) -> Option<Alert> {
    if group.ids.is_empty() {
        return None;
    }
    let primary = &group.primary;
    let severity = classify_road_incident(&group.facts);

    let road = clean(primary.road.as_deref()).unwrap_or_else(|| "Road".to_string());
    let direction = clean(primary.direction.as_deref());
    let headline = clean(primary.incident_type.as_deref())
        .or_else(|| clean(primary.reason.as_deref()))
        .unwrap_or_else(|| "Incident".to_string());
    let title = match &direction {
        Some(direction) => format!("{road} {direction}: {headline}"),
        None => format!("{road}: {headline}"),
    };

    let mut parts: Vec<String> = Vec::new();
    parts.push(clean(primary.location.as_deref()).unwrap_or_else(|| road.clone()));
    if let Some(lanes) = lane_text(group.facts.lanes_closed, group.facts.lanes_total) {
        parts.push(lanes);
    }
    if let Some(end) = group.end {
        let local = end.with_timezone(&ctx.local_offset);
        parts.push(format!("Expected to clear {}", local.format("%b %-d, %-I:%M %p")));
    }
    if group.is_consolidated() {
        parts.push(format!("{} reports combined", group.record_count()));
    }
    let summary = parts.join(". ");

    let mut details: Vec<String> = Vec::new();
    if let Some(reason) = clean(primary.reason.as_deref()) {
        details.push(reason);
    }
    if let Some(condition) = clean(primary.condition.as_deref()) {
        if !details.contains(&condition) {
            details.push(condition);
        }
    }
    if let Some(detour) = clean(primary.detour.as_deref()) {
        details.push(format!("Detour: {detour}"));
    }
    if let Some(project) = &group.project_number {
        details.push(format!("Project {project}"));
    }
    let description = (!details.is_empty()).then(|| details.join(". "));

    let affected_area = match (group.from_mile_marker, group.to_mile_marker) {
        (Some(from), Some(to)) if (from - to).abs() > f64::EPSILON => Some(format!(
            "{road} mile marker {} to {}",
            format_marker(from),
            format_marker(to)
        )),
        (Some(at), _) | (None, Some(at)) => {
            Some(format!("{road} mile marker {}", format_marker(at)))
        }
        (None, None) => clean(primary.location.as_deref()),
    };

    let metadata = AlertMetadata::RoadIncidents {
        road: road.clone(),
        direction,
        incident_type: clean(primary.incident_type.as_deref()),
        lanes_closed: group.facts.lanes_closed,
        lanes_total: group.facts.lanes_total,
        project_number: group.project_number.clone(),
        from_mile_marker: group.from_mile_marker,
        to_mile_marker: group.to_mile_marker,
        source_ids: group.ids.clone(),
        display_severity: severity.display(),
    };

    Some(
        Alert::new(
            format!("road-incidents-{}", group.ids.join("_")),
            severity,
            title,
            summary,
            ctx.now,
            metadata,
        )
        .with_description(description)
        .with_affected_area(affected_area)
        .with_url(map_url(primary.latitude, primary.longitude))
        .with_window(group.start, group.end),
    )
}
