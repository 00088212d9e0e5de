use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::feature::ScenarioRecord;
use crate::identity::Signature;
use crate::tracker::Tracker;

use super::record::ExistingTestRecord;

/// Which member of a duplicate group survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prefer {
    #[default]
    Newest,
    Oldest,
}

impl FromStr for Prefer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(Prefer::Newest),
            "oldest" => Ok(Prefer::Oldest),
            other => Err(format!("unknown preference '{}' (expected newest or oldest)", other)),
        }
    }
}

impl fmt::Display for Prefer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefer::Newest => f.write_str("newest"),
            Prefer::Oldest => f.write_str("oldest"),
        }
    }
}

/// Records sharing a signature, in first-seen order of signatures.
pub type DuplicateGroups = Vec<(Signature, Vec<ExistingTestRecord>)>;

/// Survivors and deletion candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateSplit {
    pub keep: Vec<ExistingTestRecord>,
    pub drop: Vec<ExistingTestRecord>,
}

/// A deletion the tracker did not confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionFailure {
    pub key: String,
    pub reason: String,
    pub retryable: bool,
}

/// Outcome of a dedupe pass. `deleted` is a subset of `dropped`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupeOutcome {
    pub kept: Vec<String>,
    pub dropped: Vec<String>,
    pub deleted: Vec<String>,
    pub failures: Vec<DeletionFailure>,
}

// ============================================================================
// Grouping and survivor selection
// ============================================================================

pub fn group_by_signature(records: &[ExistingTestRecord]) -> DuplicateGroups {
    let mut groups: DuplicateGroups = Vec::new();
    let mut index: HashMap<Signature, usize> = HashMap::new();

    for record in records {
        let signature = record.identity();
        match index.get(&signature) {
            Some(&i) => groups[i].1.push(record.clone()),
            None => {
                index.insert(signature.clone(), groups.len());
                groups.push((signature, vec![record.clone()]));
            }
        }
    }

    groups
}

/// Pick one survivor per signature group.
///
/// Members are ordered by creation timestamp (empty first, stable on ties);
/// `Newest` keeps the last, `Oldest` the first.
pub fn find_duplicates(records: &[ExistingTestRecord], prefer: Prefer) -> DuplicateSplit {
    let mut split = DuplicateSplit::default();

    for (_, mut members) in group_by_signature(records) {
        if members.len() == 1 {
            split.keep.append(&mut members);
            continue;
        }

        members.sort_by(|a, b| a.created.cmp(&b.created));

        let survivor = match prefer {
            Prefer::Oldest => members.remove(0),
            Prefer::Newest => members.remove(members.len() - 1),
        };
        split.keep.push(survivor);
        split.drop.append(&mut members);
    }

    split
}

/// Find duplicates and delete every non-survivor through `tracker`.
///
/// Deletions are best-effort: a failure is logged and recorded, and the
/// remaining candidates are still attempted.
pub fn resolve(
    records: &[ExistingTestRecord],
    prefer: Prefer,
    tracker: &dyn Tracker,
) -> DedupeOutcome {
    let split = find_duplicates(records, prefer);
    let mut outcome = DedupeOutcome {
        kept: split.keep.iter().map(|r| r.key.clone()).collect(),
        dropped: split.drop.iter().map(|r| r.key.clone()).collect(),
        ..DedupeOutcome::default()
    };

    for record in &split.drop {
        match tracker.delete(&record.key) {
            Ok(()) => outcome.deleted.push(record.key.clone()),
            Err(e) => {
                warn!(key = %record.key, error = %e, "could not delete duplicate test");
                outcome.failures.push(DeletionFailure {
                    key: record.key.clone(),
                    reason: e.to_string(),
                    retryable: e.is_retryable(),
                });
            }
        }
    }

    info!(
        kept = outcome.kept.len(),
        dropped = outcome.dropped.len(),
        deleted = outcome.deleted.len(),
        "duplicate resolution finished"
    );

    outcome
}

// ============================================================================
// In-memory scenario dedupe
// ============================================================================

/// Drop generated scenarios whose signature was already seen. First wins.
pub fn dedupe_scenarios(context_key: &str, scenarios: Vec<ScenarioRecord>) -> Vec<ScenarioRecord> {
    let mut seen = HashSet::new();
    scenarios
        .into_iter()
        .filter(|s| seen.insert(s.signature(context_key)))
        .collect()
}
