/// Collapse every whitespace run to a single space, lowercase, and trim.
///
/// Only ever used to build comparison keys (signatures, title matching).
/// Display text is never passed through here.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// `normalize` for optional input. `None` yields an empty string.
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}

/// Collapse whitespace runs without changing case.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
