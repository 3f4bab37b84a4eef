use super::model::WeatherFeature;
use crate::{
    alerts::{Alert, AlertMetadata, Severity},
    sources::ConvertContext,
    utils::{clean, contains_any, parse_timestamp, truncate_chars},
};

/// Event names that are critical whatever severity the upstream assigned.
const LIFE_SAFETY_EVENTS: [&str; 11] = [
    "tornado",
    "flash flood",
    "hurricane",
    "ice storm",
    "extreme heat",
    "excessive heat",
    "extreme cold",
    "blizzard",
    "storm surge",
    "extreme wind",
    "tsunami",
];

const SUMMARY_MAX_CHARS: usize = 240;

/// Maps an event name and upstream CAP severity onto the four tiers.
///
/// Life-safety events win over the upstream severity. Otherwise `Extreme` is
/// critical, `Severe` and `Moderate` are moderate and anything else is minor.
#[must_use]
pub fn classify_weather(event: &str, upstream_severity: Option<&str>) -> Severity {
    if contains_any(event, &LIFE_SAFETY_EVENTS) {
        return Severity::Critical;
    }
    match upstream_severity.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("extreme") => Severity::Critical,
        Some("severe" | "moderate") => Severity::Moderate,
        _ => Severity::Minor,
    }
}

/// Converts one GeoJSON feature. Features without an id or event, and alerts that
/// have already expired, are suppressed.
#[must_use]
pub fn convert_weather(feature: &WeatherFeature, ctx: &ConvertContext) -> Option<Alert> {
    let props = &feature.properties;
    let native_id = props.id.as_deref().or(feature.id.as_deref()).map(str::trim)?;
    if native_id.is_empty() {
        return None;
    }
    let native_id = native_id.rsplit('/').next().unwrap_or(native_id);
    let event = clean(props.event.as_deref())?;

    let start = props.onset.as_deref().or(props.effective.as_deref()).and_then(parse_timestamp);
    let end = props.ends.as_deref().or(props.expires.as_deref()).and_then(parse_timestamp);
    if end.is_some_and(|end| end < ctx.now) {
        return None;
    }

    let severity = classify_weather(&event, props.severity.as_deref());
    let area = clean(props.area_desc.as_deref());
    let summary = match (clean(props.headline.as_deref()), &area) {
        (Some(headline), _) => truncate_chars(&headline, SUMMARY_MAX_CHARS),
        (None, Some(area)) => truncate_chars(&format!("{event} for {area}"), SUMMARY_MAX_CHARS),
        (None, None) => event.clone(),
    };

    let metadata = AlertMetadata::WeatherService {
        event: event.clone(),
        urgency: clean(props.urgency.as_deref()),
        certainty: clean(props.certainty.as_deref()),
        upstream_severity: clean(props.severity.as_deref()),
        display_severity: severity.display(),
    };

    Some(
        Alert::new(format!("weather-{native_id}"), severity, event, summary, ctx.now, metadata)
            .with_description(props.description.clone())
            .with_instruction(props.instruction.clone())
            .with_affected_area(area)
            .with_url(clean(props.web.as_deref()))
            .with_window(start, end),
    )
}
