use super::classify::IncidentFacts;
use chrono::{DateTime, FixedOffset, Timelike};

/// Local hour at which nighttime ends.
pub const NIGHT_END_HOUR: u32 = 6;
/// Local hour at which nighttime starts.
pub const NIGHT_START_HOUR: u32 = 20;

#[must_use]
pub fn is_night(local: &DateTime<FixedOffset>) -> bool {
    let hour = local.hour();
    hour < NIGHT_END_HOUR || hour >= NIGHT_START_HOUR
}

/// Whether a low-impact maintenance incident should be hidden at night.
///
/// Crashes, fatalities, bridge incidents and full closures are never suppressed.
/// Everything else is suppressed only when it is maintenance work closing less than
/// half the lanes during nighttime hours.
#[must_use]
pub fn suppress_at_night(facts: &IncidentFacts, local: &DateTime<FixedOffset>) -> bool {
    if facts.is_crash() || facts.is_fatal() || facts.is_bridge() || facts.is_full_closure() {
        return false;
    }
    is_night(local) && facts.maintenance && facts.lane_ratio() < 0.5
}
