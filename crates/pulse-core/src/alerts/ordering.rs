//! Ordering and de-duplication of merged alert sets.

use super::types::Alert;
use std::collections::HashSet;

/// Sorts alerts most severe first.
///
/// The sort is stable: within a tier, alerts keep the order they were emitted in, so
/// a source's own ordering survives the merge.
#[must_use]
pub fn sort_by_severity(mut alerts: Vec<Alert>) -> Vec<Alert> {
    alerts.sort_by_key(|alert| alert.severity.rank());
    alerts
}

/// Drops alerts whose id was already seen, keeping the first occurrence.
#[must_use]
pub fn dedupe_by_id(alerts: Vec<Alert>) -> Vec<Alert> {
    let mut seen = HashSet::with_capacity(alerts.len());
    alerts.into_iter().filter(|alert| seen.insert(alert.id.clone())).collect()
}

/// Number of alerts per tier, indexed by [`Severity::rank`](super::Severity::rank).
#[must_use]
pub fn severity_counts(alerts: &[Alert]) -> [usize; 4] {
    let mut counts = [0usize; 4];
    for alert in alerts {
        counts[usize::from(alert.severity.rank())] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::types::{AlertMetadata, Severity};
    use chrono::Utc;

    fn alert(id: &str, severity: Severity) -> Alert {
        Alert::new(
            id,
            severity,
            id,
            id,
            Utc::now(),
            AlertMetadata::Generic { display_severity: severity.display() },
        )
    }

    fn ids(alerts: &[Alert]) -> Vec<&str> {
        alerts.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_sort_is_stable_within_tier() {
        let alerts = vec![
            alert("minor#1", Severity::Minor),
            alert("critical#1", Severity::Critical),
            alert("minor#2", Severity::Minor),
            alert("critical#2", Severity::Critical),
        ];

        let sorted = sort_by_severity(alerts);
        assert_eq!(ids(&sorted), vec!["critical#1", "critical#2", "minor#1", "minor#2"]);
    }

    #[test]
    fn test_sort_orders_all_tiers() {
        let alerts = vec![
            alert("d", Severity::Minor),
            alert("c", Severity::Moderate),
            alert("b", Severity::High),
            alert("a", Severity::Critical),
        ];
        assert_eq!(ids(&sort_by_severity(alerts)), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let alerts = vec![
            alert("x", Severity::Minor),
            alert("y", Severity::High),
            alert("x", Severity::Critical),
        ];
        let deduped = dedupe_by_id(alerts);
        assert_eq!(ids(&deduped), vec!["x", "y"]);
        assert_eq!(deduped[0].severity, Severity::Minor);
    }

    #[test]
    fn test_severity_counts() {
        let alerts = vec![
            alert("a", Severity::Moderate),
            alert("b", Severity::Moderate),
            alert("c", Severity::High),
        ];
        assert_eq!(severity_counts(&alerts), [0, 1, 2, 0]);
        assert_eq!(severity_counts(&[]), [0, 0, 0, 0]);
    }
}
