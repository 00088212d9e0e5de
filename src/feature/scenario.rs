use serde::{Deserialize, Serialize};

use crate::identity::{Signature, make_signature};
use crate::text::sanitize_title;

/// A desired test scenario, as produced by generation.
///
/// `steps` is one multi-line string, one Gherkin step per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub title: String,
    pub steps: String,
}

impl ScenarioRecord {
    pub fn new(title: impl Into<String>, steps: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            steps: steps.into(),
        }
    }

    /// Canonical `Validate ...` title for this scenario under `context_key`.
    pub fn canonical_title(&self, context_key: &str) -> String {
        sanitize_title(context_key, Some(&self.title))
    }

    pub fn signature(&self, context_key: &str) -> Signature {
        make_signature(&self.canonical_title(context_key), &self.steps)
    }
}
