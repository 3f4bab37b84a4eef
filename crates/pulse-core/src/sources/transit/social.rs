//! Agency social posts as a secondary transit signal.
//!
//! A post becomes an alert when it mentions a service impact, is not promotional and
//! was published within the configured window. The effect is inferred from the text
//! and classified like a structured alert.

use super::{classify::classify_transit, model::SocialPost};
use crate::{
    alerts::{Alert, AlertMetadata, TransitOrigin},
    sources::ConvertContext,
    utils::{collapse_whitespace, contains_any, parse_timestamp, truncate_chars},
};
use chrono::Duration;
use regex::Regex;
use std::sync::LazyLock;

const IMPACT_KEYWORDS: [&str; 20] = [
    "detour",
    "delay",
    "cancel",
    "suspended",
    "no service",
    "not in service",
    "out of service",
    "not serving",
    "will not serve",
    "closed",
    "closure",
    "reroute",
    "re-route",
    "modified service",
    "modified schedule",
    "disruption",
    "bypass",
    "accident",
    "emergency",
    "running late",
];

const PROMO_KEYWORDS: [&str; 12] = [
    "job fair",
    "hiring",
    "career",
    "survey",
    "giveaway",
    "contest",
    "public meeting",
    "feedback",
    "celebrate",
    "apply now",
    "fare free",
    "join us",
];

/// Posts may be timestamped slightly ahead of our clock.
const CLOCK_SKEW_MINUTES: i64 = 5;

const SUMMARY_MAX_CHARS: usize = 200;

static ROUTE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:routes?|rt\.?)\s*#?\s*(\d{1,3}[A-Z]?)\b").ok());

#[must_use]
pub fn is_service_impact(text: &str) -> bool {
    contains_any(text, &IMPACT_KEYWORDS) && !contains_any(text, &PROMO_KEYWORDS)
}

/// Effect implied by the post text, in the structured feed's vocabulary.
#[must_use]
pub fn infer_effect(text: &str) -> &'static str {
    if contains_any(
        text,
        &["no service", "suspended", "not in service", "out of service", "cancel"],
    ) {
        "no_service"
    } else if contains_any(text, &["detour", "reroute", "re-route", "bypass"]) {
        "detour"
    } else if contains_any(text, &["modified", "will not serve", "not serving", "closed"]) {
        "modified_service"
    } else if contains_any(text, &["delay", "running late"]) {
        "significant_delays"
    } else {
        "other_effect"
    }
}

fn infer_cause(text: &str) -> Option<String> {
    if contains_any(text, &["accident", "crash", "collision"]) {
        Some("accident".to_string())
    } else if contains_any(text, &["emergency"]) {
        Some("emergency".to_string())
    } else if contains_any(text, &["weather", "snow", "ice", "storm", "flood"]) {
        Some("weather".to_string())
    } else {
        None
    }
}

fn extract_routes(text: &str) -> Vec<String> {
    let Some(re) = ROUTE.as_ref() else {
        return Vec::new();
    };
    let mut routes: Vec<String> = Vec::new();
    for caps in re.captures_iter(text) {
        let route = caps[1].to_uppercase();
        if !routes.contains(&route) {
            routes.push(route);
        }
    }
    routes
}

/// Converts one post, or `None` if it is stale, promotional or has no service impact.
#[must_use]
pub fn convert_social_post(
    post: &SocialPost,
    actor: &str,
    window_hours: u32,
    ctx: &ConvertContext,
) -> Option<Alert> {
    let rkey = post.rkey()?;
    let text = collapse_whitespace(&post.record.text);
    if text.is_empty() || !is_service_impact(&text) {
        return None;
    }

    let created = post.record.created_at.as_deref().and_then(parse_timestamp)?;
    let oldest = ctx.now - Duration::hours(i64::from(window_hours));
    let newest = ctx.now + Duration::minutes(CLOCK_SKEW_MINUTES);
    if created < oldest || created > newest {
        return None;
    }

    let effect = infer_effect(&text);
    let cause = infer_cause(&text);
    let severity = classify_transit(effect, cause.as_deref());

    let metadata = AlertMetadata::Transit {
        origin: TransitOrigin::Social,
        routes: extract_routes(&text),
        effect: effect.to_string(),
        cause,
        display_severity: severity.display(),
    };

    Some(
        Alert::new(
            format!("transit-social-{rkey}"),
            severity,
            "Transit service update",
            truncate_chars(&text, SUMMARY_MAX_CHARS),
            ctx.now,
            metadata,
        )
        .with_description(Some(text))
        .with_url(Some(format!("https://bsky.app/profile/{actor}/post/{rkey}")))
        .with_window(Some(created), None),
    )
}
