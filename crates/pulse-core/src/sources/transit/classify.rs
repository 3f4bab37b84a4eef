use crate::alerts::Severity;

/// Lowercase, underscore-separated effect (`"NO SERVICE"` is `no_service`).
#[must_use]
pub fn normalize_effect(effect: &str) -> String {
    effect
        .trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// `no_service` is critical; detours, modified service, accidents and emergencies are
/// moderate; everything else is minor.
#[must_use]
pub fn classify_transit(effect: &str, cause: Option<&str>) -> Severity {
    match normalize_effect(effect).as_str() {
        "no_service" => return Severity::Critical,
        "detour" | "modified_service" => return Severity::Moderate,
        _ => {}
    }
    let cause = cause.map(normalize_effect).unwrap_or_default();
    if cause.contains("accident") || cause.contains("emergency") {
        return Severity::Moderate;
    }
    Severity::Minor
}
