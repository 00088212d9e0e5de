pub mod error;
pub mod jira;
pub mod memory;
pub mod model;

pub use error::TrackerError;
pub use jira::{JiraClient, JiraConfig};
pub use memory::InMemoryTracker;
pub use model::{IssueComment, IssueDetails, LinkedTest, NewTest};

use crate::document::{Node, from_plain_text, with_code_block};

/// Heading placed above the gherkin code block of every generated test.
pub const STEPS_HEADING: &str = "Steps (Gherkin)";

/// The issue-tracker operations the sync engine consumes.
///
/// Implementations own their transport concerns (auth, retries, paging).
pub trait Tracker {
    fn get_issue(&self, key: &str) -> Result<IssueDetails, TrackerError>;

    /// Create a test issue and return its key.
    fn create_test(&self, test: &NewTest) -> Result<String, TrackerError>;

    /// Replace the summary and the stored feature of a test.
    fn update_test(
        &self,
        key: &str,
        summary: &str,
        feature_text: &str,
    ) -> Result<(), TrackerError>;

    fn add_labels(&self, key: &str, labels: &[String]) -> Result<(), TrackerError>;

    fn delete(&self, key: &str) -> Result<(), TrackerError>;

    /// Test issues of `project_key` linked to `parent_key`.
    fn linked_tests(
        &self,
        parent_key: &str,
        project_key: &str,
    ) -> Result<Vec<LinkedTest>, TrackerError>;

    fn link(&self, from_key: &str, to_key: &str, link_type: &str) -> Result<(), TrackerError>;
}

/// Description document for a test: the feature in a gherkin code block, or
/// the plain description when there is no feature.
pub fn test_description(feature_text: &str, description_text: &str) -> Node {
    if feature_text.is_empty() {
        from_plain_text(description_text)
    } else {
        with_code_block(STEPS_HEADING, feature_text)
    }
}
