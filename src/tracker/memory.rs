use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::document::Node;

use super::error::TrackerError;
use super::model::{IssueDetails, LinkedTest, NewTest};
use super::{Tracker, test_description};

/// A test issue held by [`InMemoryTracker`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTest {
    pub key: String,
    pub project: String,
    pub summary: String,
    pub created: String,
    pub description: Node,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueLink {
    pub from: String,
    pub to: String,
    pub link_type: String,
}

#[derive(Default)]
struct MemoryState {
    issues: HashMap<String, IssueDetails>,
    tests: Vec<StoredTest>,
    links: Vec<IssueLink>,
    /// key -> retryable
    failing_deletes: HashMap<String, bool>,
    rejected_link_types: HashSet<String>,
    /// Summary fragments whose creates are refused.
    rejected_creates: Vec<String>,
    next_number: u32,
    clock: u32,
}

impl MemoryState {
    fn tick(&mut self) -> String {
        self.clock += 1;
        format!(
            "2024-01-01T{:02}:{:02}:{:02}.000+0000",
            self.clock / 3600,
            (self.clock / 60) % 60,
            self.clock % 60
        )
    }

    fn test_mut(&mut self, key: &str) -> Result<&mut StoredTest, TrackerError> {
        self.tests
            .iter_mut()
            .find(|t| t.key == key)
            .ok_or_else(|| TrackerError::NotFound(key.to_string()))
    }
}

/// Deterministic, single-threaded tracker kept entirely in memory.
///
/// Keys are `<project>-<n>` starting at 100; creation timestamps increase by
/// one second per created test. Deletions and link types can be set to fail.
pub struct InMemoryTracker {
    state: RefCell<MemoryState>,
}

impl Default for InMemoryTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTracker {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(MemoryState {
                next_number: 100,
                ..MemoryState::default()
            }),
        }
    }

    pub fn with_issue(self, issue: IssueDetails) -> Self {
        self.state
            .borrow_mut()
            .issues
            .insert(issue.key.clone(), issue);
        self
    }

    /// Seed a test linked to `parent_key`. Returns its key.
    pub fn seed_test(
        &self,
        parent_key: &str,
        project: &str,
        summary: &str,
        created: &str,
        feature_text: &str,
    ) -> String {
        let mut state = self.state.borrow_mut();
        let key = format!("{}-{}", project, state.next_number);
        state.next_number += 1;

        state.tests.push(StoredTest {
            key: key.clone(),
            project: project.to_string(),
            summary: summary.to_string(),
            created: created.to_string(),
            description: test_description(feature_text, ""),
            labels: Vec::new(),
        });
        state.links.push(IssueLink {
            from: key.clone(),
            to: parent_key.to_string(),
            link_type: "Tests".to_string(),
        });
        key
    }

    /// Make deleting `key` fail, with a retryable or permanent error.
    pub fn fail_delete(&self, key: &str, retryable: bool) {
        self.state
            .borrow_mut()
            .failing_deletes
            .insert(key.to_string(), retryable);
    }

    /// Make creating any test whose summary contains `fragment` fail.
    pub fn reject_create(&self, fragment: &str) {
        self.state
            .borrow_mut()
            .rejected_creates
            .push(fragment.to_string());
    }

    /// Make linking with `link_type` fail.
    pub fn reject_link_type(&self, link_type: &str) {
        self.state
            .borrow_mut()
            .rejected_link_types
            .insert(link_type.to_string());
    }

    pub fn test(&self, key: &str) -> Option<StoredTest> {
        self.state.borrow().tests.iter().find(|t| t.key == key).cloned()
    }

    pub fn tests(&self) -> Vec<StoredTest> {
        self.state.borrow().tests.clone()
    }

    pub fn links(&self) -> Vec<IssueLink> {
        self.state.borrow().links.clone()
    }
}

impl Tracker for InMemoryTracker {
    fn get_issue(&self, key: &str) -> Result<IssueDetails, TrackerError> {
        self.state
            .borrow()
            .issues
            .get(key)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(key.to_string()))
    }

    fn create_test(&self, test: &NewTest) -> Result<String, TrackerError> {
        let mut state = self.state.borrow_mut();

        if state.rejected_creates.iter().any(|f| test.summary.contains(f.as_str())) {
            return Err(TrackerError::Http {
                status: 500,
                body: "create rejected".to_string(),
            });
        }

        let key = format!("{}-{}", test.project, state.next_number);
        state.next_number += 1;
        let created = state.tick();

        state.tests.push(StoredTest {
            key: key.clone(),
            project: test.project.clone(),
            summary: test.summary.clone(),
            created,
            description: test_description(&test.feature_text, &test.description_text),
            labels: test.labels.clone(),
        });
        Ok(key)
    }

    fn update_test(
        &self,
        key: &str,
        summary: &str,
        feature_text: &str,
    ) -> Result<(), TrackerError> {
        let mut state = self.state.borrow_mut();
        let stored = state.test_mut(key)?;
        stored.summary = summary.to_string();
        stored.description = test_description(feature_text, "");
        Ok(())
    }

    fn add_labels(&self, key: &str, labels: &[String]) -> Result<(), TrackerError> {
        let mut state = self.state.borrow_mut();
        let stored = state.test_mut(key)?;
        for label in labels {
            if !stored.labels.contains(label) {
                stored.labels.push(label.clone());
            }
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), TrackerError> {
        let mut state = self.state.borrow_mut();

        if let Some(&retryable) = state.failing_deletes.get(key) {
            return Err(TrackerError::Http {
                status: if retryable { 503 } else { 403 },
                body: format!("refusing to delete {}", key),
            });
        }

        let before = state.tests.len();
        state.tests.retain(|t| t.key != key);
        if state.tests.len() == before {
            return Err(TrackerError::NotFound(key.to_string()));
        }
        state.links.retain(|l| l.from != key && l.to != key);
        Ok(())
    }

    fn linked_tests(
        &self,
        parent_key: &str,
        project_key: &str,
    ) -> Result<Vec<LinkedTest>, TrackerError> {
        let state = self.state.borrow();

        let linked: Vec<&str> = state
            .links
            .iter()
            .filter_map(|l| {
                if l.to == parent_key {
                    Some(l.from.as_str())
                } else if l.from == parent_key {
                    Some(l.to.as_str())
                } else {
                    None
                }
            })
            .collect();

        Ok(state
            .tests
            .iter()
            .filter(|t| t.project == project_key && linked.contains(&t.key.as_str()))
            .map(|t| LinkedTest {
                key: t.key.clone(),
                summary: t.summary.clone(),
                created: t.created.clone(),
                description: Some(t.description.clone()),
            })
            .collect())
    }

    fn link(&self, from_key: &str, to_key: &str, link_type: &str) -> Result<(), TrackerError> {
        let mut state = self.state.borrow_mut();

        if state.rejected_link_types.contains(link_type) {
            return Err(TrackerError::Http {
                status: 400,
                body: format!("no link type named '{}'", link_type),
            });
        }

        state.links.push(IssueLink {
            from: from_key.to_string(),
            to: to_key.to_string(),
            link_type: link_type.to_string(),
        });
        Ok(())
    }
}
