use super::model::IncidentAttributes;
use crate::{
    alerts::{Alert, AlertMetadata, Severity},
    sources::ConvertContext,
    utils::{clean, contains_any, from_epoch_millis, map_url},
};

const CRITICAL_TEXT: [&str; 5] =
    ["fatal", "major", "multi-vehicle", "multi vehicle", "multiple vehicle"];
const CRITICAL_CODES: [&str; 3] = ["FATAL", "MAJOR", "MV"];
const MODERATE_TEXT: [&str; 4] = ["personal injury", "hit and run", "hit & run", "traffic control"];
const MODERATE_CODES: [&str; 3] = ["PI", "HR", "TC"];
const MINOR_TEXT: [&str; 4] = ["property damage", "obstruction", "debris", "disabled vehicle"];
const MINOR_CODES: [&str; 2] = ["PD", "OBS"];
const ACCIDENT_TEXT: [&str; 3] = ["accident", "crash", "collision"];
const ACCIDENT_CODES: [&str; 3] = ["TA", "MVA", "ACC"];

fn code_tokens(code: &str) -> Vec<String> {
    code.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_ascii_uppercase)
        .collect()
}

/// Dispatch type code and description cascade:
///
/// 1. fatality, major or multi-vehicle: critical
/// 2. personal injury, hit-and-run or traffic control: moderate
/// 3. property damage only or obstruction: minor
/// 4. other accident codes: moderate
/// 5. anything else: minor
#[must_use]
pub fn classify_police(type_code: Option<&str>, description: Option<&str>) -> Severity {
    let tokens = code_tokens(type_code.unwrap_or_default());
    let has_code = |codes: &[&str]| tokens.iter().any(|t| codes.contains(&t.as_str()));
    let text = description.unwrap_or_default();

    if has_code(&CRITICAL_CODES) || contains_any(text, &CRITICAL_TEXT) {
        Severity::Critical
    } else if has_code(&MODERATE_CODES) || contains_any(text, &MODERATE_TEXT) {
        Severity::Moderate
    } else if has_code(&MINOR_CODES) || contains_any(text, &MINOR_TEXT) {
        Severity::Minor
    } else if has_code(&ACCIDENT_CODES) || contains_any(text, &ACCIDENT_TEXT) {
        Severity::Moderate
    } else {
        Severity::Minor
    }
}

/// Converts one incident. Records with neither an incident number nor an object id
/// are suppressed.
#[must_use]
pub fn convert_police_incident(
    attributes: &IncidentAttributes,
    ctx: &ConvertContext,
) -> Option<Alert> {
    let incident_number =
        attributes.incident_no.as_deref().or(attributes.object_id.as_deref())?.to_string();
    let type_code = clean(attributes.type_code.as_deref());
    let type_description = clean(attributes.type_desc.as_deref());
    let severity = classify_police(type_code.as_deref(), type_description.as_deref());

    let title = type_description.clone().unwrap_or_else(|| "Traffic incident".to_string());
    let location = clean(attributes.location.as_deref());
    let summary = match &location {
        Some(location) => format!("{title} at {location}"),
        None => title.clone(),
    };
    let reported = attributes
        .reported
        .filter(|ms| ms.is_finite())
        .and_then(|ms| from_epoch_millis(ms as i64));

    let metadata = AlertMetadata::PoliceTraffic {
        incident_number: incident_number.clone(),
        type_code,
        type_description,
        display_severity: severity.display(),
    };

    Some(
        Alert::new(
            format!("police-traffic-{incident_number}"),
            severity,
            title,
            summary,
            ctx.now,
            metadata,
        )
        .with_affected_area(location)
        .with_url(map_url(attributes.latitude, attributes.longitude))
        .with_window(reported, None),
    )
}
