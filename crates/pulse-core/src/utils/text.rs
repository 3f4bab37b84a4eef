/// Collapses runs of whitespace (including newlines) into single spaces and trims.
#[must_use]
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trimmed, whitespace-collapsed text, or `None` when nothing is left.
#[must_use]
pub fn clean(input: Option<&str>) -> Option<String> {
    input.map(collapse_whitespace).filter(|s| !s.is_empty())
}

/// Truncates to at most `max` characters, appending `...` when cut.
#[must_use]
pub fn truncate_chars(input: &str, max: usize) -> String {
    if input.chars().count() <= max {
        return input.to_string();
    }
    let kept: String = input.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Case-insensitive substring match against any of `needles` (expected lowercase).
#[must_use]
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    needles.iter().any(|needle| lower.contains(needle))
}

/// Lowercase ASCII alphanumerics separated by single hyphens, for use in ids.
#[must_use]
pub fn slug(input: &str) -> String {
    input
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
