use super::model::{AirportStatus, DelayStatus};
use crate::{
    alerts::{Alert, AlertMetadata, Severity},
    sources::ConvertContext,
    utils::{clean, slug},
};
use regex::Regex;
use std::sync::LazyLock;

static HOURS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:hours?|hrs?|h)\b").ok());
static MINUTES: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:minutes?|mins?|m)\b").ok());
static CLOCK: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\s*(\d+):(\d{2})\s*$").ok());

const STATUS_URL: &str = "https://nasstatus.faa.gov/";

/// Delay minutes at or above 60 are critical, at or above 30 moderate.
#[must_use]
pub fn classify_aviation(delay_minutes: u32) -> Severity {
    match delay_minutes {
        60.. => Severity::Critical,
        30..=59 => Severity::Moderate,
        _ => Severity::Minor,
    }
}

/// Parses the free-text delay durations the FAA publishes.
///
/// Accepts `"1 hour 15 minutes"`, `"45 minutes"`, `"2 hrs"`, `"1:15"` and bare numbers
/// (taken as minutes). Returns `None` when no duration can be found.
#[must_use]
pub fn parse_delay_minutes(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(minutes) = text.parse::<u32>() {
        return Some(minutes);
    }
    if let Some(caps) = CLOCK.as_ref().and_then(|re| re.captures(text)) {
        let hours: u32 = caps[1].parse().ok()?;
        let minutes: u32 = caps[2].parse().ok()?;
        return Some(hours.saturating_mul(60).saturating_add(minutes));
    }

    let capture = |re: &Option<Regex>| -> Option<u32> {
        re.as_ref().and_then(|re| re.captures(text)).and_then(|caps| caps[1].parse().ok())
    };
    match (capture(&HOURS), capture(&MINUTES)) {
        (None, None) => None,
        (hours, minutes) => {
            Some(hours.unwrap_or(0).saturating_mul(60).saturating_add(minutes.unwrap_or(0)))
        }
    }
}

/// Worst published delay: maximum, then average, then minimum.
fn delay_minutes(status: &DelayStatus) -> u32 {
    [&status.max_delay, &status.avg_delay, &status.min_delay]
        .into_iter()
        .find_map(|text| text.as_deref().and_then(parse_delay_minutes))
        .unwrap_or(0)
}

fn delay_text(status: &DelayStatus) -> Option<String> {
    match (clean(status.min_delay.as_deref()), clean(status.max_delay.as_deref())) {
        (Some(min), Some(max)) => Some(format!("{min} to {max}")),
        _ => clean(status.avg_delay.as_deref())
            .or_else(|| clean(status.max_delay.as_deref()))
            .or_else(|| clean(status.min_delay.as_deref())),
    }
}

/// Converts every delay program of one airport. Airports without an active delay
/// produce nothing.
#[must_use]
pub fn convert_airport_status(
    airport_code: &str,
    status: &AirportStatus,
    ctx: &ConvertContext,
) -> Vec<Alert> {
    if !status.delay {
        return Vec::new();
    }
    let code = status
        .iata
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(airport_code)
        .to_ascii_uppercase();
    let airport_name = clean(status.name.as_deref()).unwrap_or_else(|| code.clone());

    let mut alerts: Vec<Alert> = Vec::new();
    for entry in &status.status {
        let delay_type = clean(entry.delay_type.as_deref()).unwrap_or_else(|| "Delay".to_string());
        let id = format!("aviation-{}-{}", code.to_ascii_lowercase(), slug(&delay_type));
        if alerts.iter().any(|a| a.id == id) {
            continue;
        }

        let minutes = delay_minutes(entry);
        let severity = classify_aviation(minutes);
        let reason = clean(entry.reason.as_deref());
        let trend = clean(entry.trend.as_deref());

        let mut summary = match delay_text(entry) {
            Some(delay) => format!("{delay_type} at {airport_name}: {delay}"),
            None => format!("{delay_type} at {airport_name}"),
        };
        if let Some(reason) = &reason {
            summary.push_str(&format!(" due to {reason}"));
        }

        let description = match (&trend, clean(entry.end_time.as_deref())) {
            (Some(trend), Some(end)) => Some(format!("Trend: {trend}. Expected to end {end}.")),
            (Some(trend), None) => Some(format!("Trend: {trend}.")),
            (None, Some(end)) => Some(format!("Expected to end {end}.")),
            (None, None) => None,
        };

        let metadata = AlertMetadata::AviationStatus {
            airport_code: code.clone(),
            delay_type: delay_type.clone(),
            delay_minutes: minutes,
            reason,
            trend,
            display_severity: severity.display(),
        };

        alerts.push(
            Alert::new(id, severity, format!("{code} {delay_type}"), summary, ctx.now, metadata)
                .with_description(description)
                .with_affected_area(Some(airport_name.clone()))
                .with_url(Some(STATUS_URL.to_string())),
        );
    }
    alerts
}
