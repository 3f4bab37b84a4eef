//! Lenient serde helpers for upstream fields that arrive as either numbers or strings.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    Text(String),
}

/// `123`, `123.0`, `"123"` or `null` as an optional `f64`. Unparseable text is `None`.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrString>::deserialize(deserializer)?.and_then(|value| match value {
        NumberOrString::Number(n) => Some(n),
        NumberOrString::Text(s) => s.trim().parse().ok(),
    }))
}

/// Non-negative counts. Negative or fractional inputs are clamped and truncated.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?
        .filter(|n| n.is_finite())
        .map(|n| n.clamp(0.0, f64::from(u32::MAX)) as u32))
}

/// `true`, `"true"`, `"Y"` or `"yes"`; anything else is `false`.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<BoolOrString>::deserialize(deserializer)? {
        Some(BoolOrString::Bool(b)) => b,
        Some(BoolOrString::Text(s)) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "y" | "yes" | "1")
        }
        None => false,
    })
}

/// Identifiers that are numeric in some payloads and strings in others.
pub fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Int(i64),
        Text(String),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.and_then(|id| match id {
        Id::Int(n) => Some(n.to_string()),
        Id::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Id::Text(_) => None,
    }))
}
