//! Order-independent fingerprint of an alert set.
//!
//! The summarization service caches generated text by this value, so two fetches that
//! produce the same ids at the same severities must hash identically no matter which
//! order the sources resolved in.

use super::types::Alert;

/// Computes the summary cache key for a set of alerts.
///
/// Alerts are sorted by id, each contributes `id:severity`, and the joined string is
/// folded with a 32-bit `h * 31 + c` hash over its UTF-16 code units. The absolute
/// value is rendered in base 36.
#[must_use]
pub fn compute_alerts_hash(alerts: &[Alert]) -> String {
    let mut keyed: Vec<(&str, &str)> =
        alerts.iter().map(|a| (a.id.as_str(), a.severity.as_str())).collect();
    keyed.sort_unstable();

    let joined = keyed
        .iter()
        .map(|(id, severity)| format!("{id}:{severity}"))
        .collect::<Vec<_>>()
        .join("|");

    to_base36(string_hash(&joined).unsigned_abs())
}

fn string_hash(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(i32::from(unit))
    })
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
