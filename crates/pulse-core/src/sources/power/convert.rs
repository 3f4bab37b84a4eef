use super::model::{OutageDetail, OutageSummary};
use crate::{
    alerts::{Alert, AlertMetadata, Severity},
    sources::ConvertContext,
    utils::{clean, map_url, parse_timestamp},
};

/// Customers affected: 1000+ critical, 500+ high, 100+ moderate.
///
/// The only non-flow source that produces [`Severity::High`].
#[must_use]
pub fn classify_power(customers_affected: u32) -> Severity {
    match customers_affected {
        1000.. => Severity::Critical,
        500..=999 => Severity::High,
        100..=499 => Severity::Moderate,
        _ => Severity::Minor,
    }
}

/// Converts one outage. `detail` is `None` when the detail fetch failed or was
/// skipped, in which case the list record alone is used.
#[must_use]
pub fn convert_outage(
    summary: &OutageSummary,
    detail: Option<&OutageDetail>,
    ctx: &ConvertContext,
) -> Option<Alert> {
    let event_number = summary
        .source_event_number
        .as_deref()
        .or_else(|| detail.and_then(|d| d.source_event_number.as_deref()))?;

    let customers = detail
        .and_then(|d| d.customers_affected_number)
        .or(summary.customers_affected_number)
        .unwrap_or(0);
    let severity = classify_power(customers);

    let cause = detail
        .and_then(|d| clean(d.cause_description.as_deref()))
        .or_else(|| clean(summary.outage_cause.as_deref()));
    let crew_status = detail.and_then(|d| clean(d.crew_stat_txt.as_deref()));
    let restoration =
        detail.and_then(|d| d.estimated_restoration_time.as_deref()).and_then(parse_timestamp);
    let started = detail.and_then(|d| d.create_date_time.as_deref()).and_then(parse_timestamp);

    let noun = if customers == 1 { "customer" } else { "customers" };
    let title = format!("Power outage affecting {customers} {noun}");

    let mut parts = vec![format!("{customers} {noun} without power")];
    if let Some(cause) = &cause {
        parts.push(format!("Cause: {cause}"));
    }
    if let Some(restoration) = restoration {
        let local = restoration.with_timezone(&ctx.local_offset);
        parts.push(format!("Estimated restoration {}", local.format("%b %-d, %-I:%M %p")));
    }
    let summary_text = parts.join(". ");

    let metadata = AlertMetadata::PowerUtility {
        event_number: event_number.to_string(),
        customers_affected: customers,
        cause,
        crew_status: crew_status.clone(),
        estimated_restoration: restoration,
        detail_available: detail.is_some(),
        display_severity: severity.display(),
    };

    let lat = summary.device_latitude_location;
    let lon = summary.device_longitude_location;
    let id = format!("power-{event_number}");
    Some(
        Alert::new(id, severity, title, summary_text, ctx.now, metadata)
            .with_description(crew_status.map(|status| format!("Crew status: {status}")))
            .with_url(map_url(lat, lon))
            .with_window(started, restoration),
    )
}
