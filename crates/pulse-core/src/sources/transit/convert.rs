use super::{
    classify::{classify_transit, normalize_effect},
    model::TransitAlert,
};
use crate::{
    alerts::{Alert, AlertMetadata, TransitOrigin},
    sources::ConvertContext,
    utils::{clean, parse_timestamp, truncate_chars},
};
use chrono::{DateTime, Utc};

const SUMMARY_MAX_CHARS: usize = 200;

/// The active period covering `now`, else the next upcoming one.
fn current_period(
    alert: &TransitAlert,
    now: DateTime<Utc>,
) -> Option<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
    let periods: Vec<_> = alert
        .active_periods
        .iter()
        .map(|p| {
            let start = p.start.as_deref().and_then(parse_timestamp);
            let end = p.end.as_deref().and_then(parse_timestamp);
            (start, end)
        })
        .collect();
    periods
        .iter()
        .find(|(start, end)| start.map_or(true, |s| s <= now) && end.map_or(true, |e| e > now))
        .or_else(|| periods.iter().filter(|(start, _)| start.is_some_and(|s| s > now)).min())
        .copied()
}

fn routes_text(routes: &[String]) -> Option<String> {
    match routes {
        [] => None,
        [route] => Some(format!("Route {route}")),
        routes => Some(format!("Routes {}", routes.join(", "))),
    }
}

/// Converts a structured feed alert. Alerts whose every active period has ended are
/// suppressed; alerts without periods are treated as ongoing.
#[must_use]
pub fn convert_transit_alert(alert: &TransitAlert, ctx: &ConvertContext) -> Option<Alert> {
    let id = alert.id.as_deref()?;
    let (start, end) = if alert.active_periods.is_empty() {
        (None, None)
    } else {
        current_period(alert, ctx.now)?
    };

    let effect = normalize_effect(alert.effect.as_deref().unwrap_or("unknown_effect"));
    let effect = if effect.is_empty() { "unknown_effect".to_string() } else { effect };
    let cause = clean(alert.cause.as_deref()).map(|c| normalize_effect(&c));
    let severity = classify_transit(&effect, cause.as_deref());

    let routes: Vec<String> = alert.routes.iter().filter_map(|r| clean(Some(r.as_str()))).collect();
    let header = clean(alert.header.as_deref())
        .or_else(|| clean(alert.description.as_deref()).map(|d| truncate_chars(&d, 80)))
        .unwrap_or_else(|| "Service alert".to_string());
    let summary = match routes_text(&routes) {
        Some(routes) => truncate_chars(&format!("{routes}: {header}"), SUMMARY_MAX_CHARS),
        None => truncate_chars(&header, SUMMARY_MAX_CHARS),
    };

    let metadata = AlertMetadata::Transit {
        origin: TransitOrigin::Feed,
        routes,
        effect,
        cause,
        display_severity: severity.display(),
    };

    Some(
        Alert::new(format!("transit-{id}"), severity, header, summary, ctx.now, metadata)
            .with_description(clean(alert.description.as_deref()))
            .with_url(clean(alert.url.as_deref()))
            .with_window(start, end),
    )
}
