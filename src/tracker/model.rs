use serde::{Deserialize, Serialize};

use crate::document::{DEFAULT_CODE_LANGUAGE, Node, extract_code_blocks};

/// Requirements ticket as read from the tracker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IssueDetails {
    pub key: String,
    pub summary: String,
    /// Description flattened to plain text.
    pub description_text: String,
    /// Raw rich-text description, when the tracker returned one.
    pub description: Option<Node>,
    pub comments: Vec<IssueComment>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueComment {
    pub author: String,
    /// Comment body flattened to plain text.
    pub body: String,
}

impl IssueDetails {
    /// All non-empty comments as one block, separated by rules.
    pub fn comments_text(&self) -> String {
        self.comments
            .iter()
            .filter(|c| !c.body.trim().is_empty())
            .map(|c| format!("Comment from {}:\n{}", c.author, c.body))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }
}

/// Fields of a test issue to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTest {
    pub project: String,
    pub summary: String,
    /// Used as the description when `feature_text` is empty.
    pub description_text: String,
    pub feature_text: String,
    pub labels: Vec<String>,
}

/// A test issue linked to a requirements ticket.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinkedTest {
    pub key: String,
    pub summary: String,
    /// Tracker creation timestamp; empty when unknown.
    pub created: String,
    pub description: Option<Node>,
}

impl LinkedTest {
    /// Gherkin code blocks of the description, newline-joined.
    pub fn feature_text(&self) -> String {
        self.description
            .as_ref()
            .map(|d| extract_code_blocks(d, Some(DEFAULT_CODE_LANGUAGE)).join("\n"))
            .unwrap_or_default()
    }
}
