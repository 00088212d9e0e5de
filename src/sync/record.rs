use serde::{Deserialize, Serialize};

use crate::feature::scenario_steps;
use crate::identity::{Signature, make_signature};
use crate::text::{normalize, sanitize_title, title_segment};
use crate::tracker::LinkedTest;

/// A previously generated test as found in the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingTestRecord {
    pub key: String,
    /// Creation timestamp; empty sorts before everything else.
    pub created: String,
    /// Canonical title. Recomputed from `raw_summary` when empty.
    pub normalized_title: String,
    /// Step text of the stored scenario.
    pub body: String,
    pub raw_summary: String,
    /// Recomputed from title and body when absent.
    pub signature: Option<Signature>,
}

impl ExistingTestRecord {
    /// Build a record from summary and body, deriving title and signature.
    pub fn new(
        context_key: &str,
        key: impl Into<String>,
        created: impl Into<String>,
        summary: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let raw_summary = summary.into();
        let body = body.into();
        let normalized_title = sanitize_title(context_key, Some(title_segment(&raw_summary)));
        let signature = Some(make_signature(&normalized_title, &body));

        Self {
            key: key.into(),
            created: created.into(),
            normalized_title,
            body,
            raw_summary,
            signature,
        }
    }

    /// Record for a linked tracker test. The body is the scenario's step
    /// lines recovered from the gherkin code block.
    pub fn from_linked(context_key: &str, test: &LinkedTest) -> Self {
        let body = scenario_steps(&test.feature_text());
        Self::new(context_key, &test.key, &test.created, &test.summary, body)
    }

    /// Canonical title, falling back to sanitizing the stored summary.
    pub fn resolved_title(&self, context_key: &str) -> String {
        if self.normalized_title.trim().is_empty() {
            sanitize_title(context_key, Some(title_segment(&self.raw_summary)))
        } else {
            self.normalized_title.clone()
        }
    }

    /// Stored signature, or one computed from the resolved title and body.
    pub fn resolved_signature(&self, context_key: &str) -> Signature {
        match &self.signature {
            Some(sig) => sig.clone(),
            None => make_signature(&self.resolved_title(context_key), &self.body),
        }
    }

    /// Stored signature, or one over the stored title and body as they are.
    pub fn identity(&self) -> Signature {
        match &self.signature {
            Some(sig) => sig.clone(),
            None => make_signature(&self.normalized_title, &self.body),
        }
    }

    /// Key used to match against desired scenarios.
    pub fn match_key(&self, context_key: &str) -> String {
        normalize(&self.resolved_title(context_key))
    }
}
