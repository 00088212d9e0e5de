use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sync::{DedupeOutcome, Prefer, ReconciliationPlan, TitleCollision};

// ============================================================================
// Per-action results
// ============================================================================

/// Tracker mutation performed while applying a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Create,
    Link,
    Update,
    Label,
    Delete,
    ListLinked,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Create => "create",
            ActionKind::Link => "link",
            ActionKind::Update => "update",
            ActionKind::Label => "label",
            ActionKind::Delete => "delete",
            ActionKind::ListLinked => "list_linked",
        };
        f.write_str(name)
    }
}

/// A planned action the tracker did not carry out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFailure {
    pub kind: ActionKind,
    /// Issue key, or the intended summary for a failed create.
    pub target: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTest {
    pub key: String,
    pub summary: String,
    pub tc_tag: String,
    /// First 300 characters of the stored feature.
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedTest {
    pub key: String,
    pub summary: String,
}

// ============================================================================
// Sync report
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCounts {
    pub created: usize,
    pub updated: usize,
    pub obsolete: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Outcome of one generate-and-reconcile run.
///
/// `ok` is false when the run could not start (see `error`) or when any
/// planned action ended up in `failures`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub issue_key: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_method: Option<String>,
    pub created: Vec<CreatedTest>,
    pub updated: Vec<UpdatedTest>,
    pub marked_obsolete: Vec<String>,
    pub title_collisions: Vec<TitleCollision>,
    pub dedupe: DedupeOutcome,
    pub failures: Vec<ActionFailure>,
    pub elapsed_ms: u128,
}

impl SyncReport {
    pub fn new(issue_key: &str) -> Self {
        Self {
            issue_key: issue_key.to_string(),
            ok: true,
            ..Self::default()
        }
    }

    /// A run that stopped before touching the tracker.
    pub fn failed(issue_key: &str, error: impl ToString) -> Self {
        Self {
            issue_key: issue_key.to_string(),
            ok: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    pub fn record_failure(&mut self, kind: ActionKind, target: &str, reason: impl ToString) {
        self.ok = false;
        self.failures.push(ActionFailure {
            kind,
            target: target.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn duplicates_deleted(&self) -> &[String] {
        &self.dedupe.deleted
    }

    pub fn counts(&self) -> SyncCounts {
        SyncCounts {
            created: self.created.len(),
            updated: self.updated.len(),
            obsolete: self.marked_obsolete.len(),
            deleted: self.dedupe.deleted.len(),
            failed: self.failures.len() + self.dedupe.failures.len(),
        }
    }
}

// ============================================================================
// Dedupe-only report and dry-run preview
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupeReport {
    pub issue_key: String,
    pub project_key: String,
    pub prefer: Prefer,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub outcome: DedupeOutcome,
}

/// What a sync run would do, computed without writing to the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPreview {
    pub issue_key: String,
    pub generation_method: String,
    pub plan: ReconciliationPlan,
    /// Sequence number the first created test would get.
    pub next_sequence: u32,
    /// Keys of existing duplicates that would be deleted.
    pub duplicate_drops: Vec<String>,
}
