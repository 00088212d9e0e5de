use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use super::normalize::collapse_whitespace;

/// Word every canonical title starts with.
pub const TITLE_MARKER: &str = "Validate";

/// Body used when nothing is left of a raw title.
pub const PLACEHOLDER_TITLE: &str = "Untitled Scenario";

static MARKER_RUN: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^\s*(?:validate\s*)+")
        .case_insensitive(true)
        .build()
        .expect("marker pattern is valid")
});

static SEQUENCE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"TC(\d+)")
        .case_insensitive(true)
        .build()
        .expect("sequence tag pattern is valid")
});

const EDGE_PUNCTUATION: &[char] = &[' ', '-', ':', '\u{2013}', '\u{2014}'];

/// Separator of the summary wire format.
const SEGMENT_SEPARATOR: char = '|';

/// Stands in for a separator inside a title body.
const SEPARATOR_STAND_IN: &str = "/";

// ============================================================================
// Canonical titles
// ============================================================================

/// Turn a raw, human-entered title into the canonical `Validate <body>` form.
///
/// Strips, from the left and case-insensitively: `<context_key> |`, then a
/// `TC<digits> |` sequence tag, then any run of `Validate` markers. Edge
/// punctuation is trimmed, whitespace collapsed, and an empty remainder is
/// replaced by [`PLACEHOLDER_TITLE`]. A `|` left in the body becomes `/` so
/// the title survives [`format_summary`] and [`title_segment`].
pub fn sanitize_title(context_key: &str, raw: Option<&str>) -> String {
    let trimmed = raw.unwrap_or("").trim();

    let without_prefix = strip_tracker_prefix(context_key, trimmed);
    let without_marker = MARKER_RUN.replace(without_prefix, "");
    let body = collapse_whitespace(
        &without_marker
            .trim_matches(EDGE_PUNCTUATION)
            .replace(SEGMENT_SEPARATOR, SEPARATOR_STAND_IN),
    );

    if body.is_empty() {
        format!("{} {}", TITLE_MARKER, PLACEHOLDER_TITLE)
    } else {
        format!("{} {}", TITLE_MARKER, body)
    }
}

/// Drop a leading `<context_key> |` segment, then a leading `TC<digits> |`.
fn strip_tracker_prefix<'a>(context_key: &str, raw: &'a str) -> &'a str {
    let raw = raw.trim_start();
    let rest = strip_segment(raw, |head| head.eq_ignore_ascii_case(context_key.trim()))
        .unwrap_or(raw);
    strip_segment(rest, is_sequence_tag).unwrap_or(rest)
}

fn strip_segment(raw: &str, accept: impl Fn(&str) -> bool) -> Option<&str> {
    let (head, tail) = raw.split_once(SEGMENT_SEPARATOR)?;
    accept(head.trim()).then(|| tail.trim_start())
}

fn is_sequence_tag(segment: &str) -> bool {
    match (segment.get(..2), segment.get(2..)) {
        (Some(tag), Some(digits)) => {
            tag.eq_ignore_ascii_case("tc")
                && !digits.is_empty()
                && digits.chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

// ============================================================================
// Summary wire format: `<key> | TC<NN> | <title>`
// ============================================================================

/// Render the persisted summary of a generated test.
pub fn format_summary(context_key: &str, sequence: u32, canonical_title: &str) -> String {
    format!("{} | TC{:02} | {}", context_key, sequence, canonical_title)
}

/// The segment after the last `|`, trimmed. Whole summary if there is none.
pub fn title_segment(summary: &str) -> &str {
    summary.rsplit(SEGMENT_SEPARATOR).next().unwrap_or(summary).trim()
}

/// Rebuild a summary for an updated test: the existing key and tag segments
/// survive, the title segment is replaced.
pub fn rederive_summary(context_key: &str, existing_summary: &str, new_title: &str) -> String {
    let parts: Vec<&str> = existing_summary.split('|').map(str::trim).collect();

    match parts.as_slice() {
        [key, tag, _, ..] => format!("{} | {} | {}", key, tag, new_title),
        [key, _] => format!("{} | {}", key, new_title),
        _ => format!("{} | {}", context_key, new_title),
    }
}

/// Next free `TC` sequence number given the summaries already in use.
pub fn next_sequence<'a, I>(summaries: I) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    summaries
        .into_iter()
        .filter_map(|s| SEQUENCE_TAG.captures(s))
        .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
        .max()
        .unwrap_or(0)
        + 1
}
