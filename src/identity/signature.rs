use std::fmt;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::text::normalize;

/// Joins the normalized title and body before hashing.
const FIELD_SEPARATOR: char = '|';

static STEP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^\s*(given|when|then|and|but)\b")
        .case_insensitive(true)
        .build()
        .expect("step keyword pattern is valid")
});

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

static NON_STEP_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z#\s|]+").expect("filter pattern is valid"));

/// Content-addressed identity of a test: lowercase hex SHA-1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..10).unwrap_or(&self.0)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn sha1_hex(payload: &str) -> Signature {
    let mut hasher = Sha1::new();
    hasher.update(payload.as_bytes());
    Signature(format!("{:x}", hasher.finalize()))
}

/// Identity of a test from its title and body. Case and whitespace do not count.
pub fn make_signature(title: &str, body: &str) -> Signature {
    let payload = format!("{}{}{}", normalize(title), FIELD_SEPARATOR, normalize(body));
    sha1_hex(&payload)
}

/// Narrower, content-only signature over the step keyword lines of `steps`.
///
/// Numbers are wildcarded and everything but letters is dropped, so two
/// scenarios that differ only in literals or punctuation compare equal.
/// Returns `None` when `steps` holds no `Given/When/Then/And/But` line.
pub fn steps_signature(steps: &str) -> Option<Signature> {
    let lines: Vec<String> = steps
        .lines()
        .filter(|line| STEP_LINE.is_match(line))
        .map(|line| line.trim().to_lowercase())
        .collect();

    if lines.is_empty() {
        return None;
    }

    let joined = lines.join(" | ");
    let wildcarded = DIGITS.replace_all(&joined, "#");
    let filtered = NON_STEP_CHARS.replace_all(&wildcarded, "");
    let collapsed = filtered.split_whitespace().collect::<Vec<_>>().join(" ");

    Some(sha1_hex(&collapsed))
}
