use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::feature::ScenarioRecord;
use crate::identity::Signature;
use crate::text::{normalize, rederive_summary};

use super::record::ExistingTestRecord;

/// An existing test whose content changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedUpdate {
    pub key: String,
    /// Summary to write: existing key/tag segments with the new title.
    pub summary: String,
    pub title: String,
    pub steps: String,
}

/// Two existing records collapsed onto the same canonical title. Only
/// `kept` takes part in reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleCollision {
    pub title: String,
    pub kept: String,
    pub shadowed: String,
}

/// Create / update / retire partition between desired and existing tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    /// New scenarios, titles already canonical.
    pub to_create: Vec<ScenarioRecord>,
    pub to_update: Vec<PlannedUpdate>,
    pub obsolete: Vec<ExistingTestRecord>,
    pub title_collisions: Vec<TitleCollision>,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.obsolete.is_empty()
    }
}

/// Insertion-ordered map where a repeated key replaces the value in place.
struct LastWins<T> {
    order: Vec<String>,
    entries: HashMap<String, T>,
}

impl<T> LastWins<T> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }

    fn insert(&mut self, key: String, value: T) -> Option<T> {
        let previous = self.entries.insert(key.clone(), value);
        if previous.is_none() {
            self.order.push(key);
        }
        previous
    }

    fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).map(|v| (k, v)))
    }
}

struct Desired {
    title: String,
    steps: String,
    signature: Signature,
}

/// Diff the desired scenarios against the existing tests.
///
/// Matching is by normalized canonical title; a match whose full signature
/// differs becomes an update. Pure: nothing is written anywhere.
pub fn plan(
    context_key: &str,
    existing: &[ExistingTestRecord],
    desired: &[ScenarioRecord],
) -> ReconciliationPlan {
    let mut result = ReconciliationPlan::default();

    let mut existing_map: LastWins<(ExistingTestRecord, Signature)> = LastWins::new();
    for record in existing {
        let title = record.resolved_title(context_key);
        let signature = record.resolved_signature(context_key);
        let fixed = ExistingTestRecord {
            normalized_title: title.clone(),
            signature: Some(signature.clone()),
            ..record.clone()
        };

        let match_key = record.match_key(context_key);
        if let Some((shadowed, _)) = existing_map.insert(match_key, (fixed, signature)) {
            warn!(
                kept = %record.key,
                shadowed = %shadowed.key,
                title = %title,
                "existing tests share a canonical title; only the later one is reconciled"
            );
            result.title_collisions.push(TitleCollision {
                title,
                kept: record.key.clone(),
                shadowed: shadowed.key,
            });
        }
    }

    let mut desired_map: LastWins<Desired> = LastWins::new();
    for scenario in desired {
        let title = scenario.canonical_title(context_key);
        let entry = Desired {
            signature: scenario.signature(context_key),
            title: title.clone(),
            steps: scenario.steps.clone(),
        };
        if desired_map.insert(normalize(&title), entry).is_some() {
            debug!(title = %title, "duplicate desired title; keeping the later scenario");
        }
    }

    for (match_key, wanted) in desired_map.iter() {
        match existing_map.get(match_key) {
            None => result
                .to_create
                .push(ScenarioRecord::new(&wanted.title, &wanted.steps)),
            Some((current, signature)) if *signature != wanted.signature => {
                result.to_update.push(PlannedUpdate {
                    key: current.key.clone(),
                    summary: rederive_summary(context_key, &current.raw_summary, &wanted.title),
                    title: wanted.title.clone(),
                    steps: wanted.steps.clone(),
                });
            }
            Some(_) => {}
        }
    }

    result.obsolete = existing_map
        .iter()
        .filter(|(match_key, _)| !desired_map.contains(match_key))
        .map(|(_, (record, _))| record.clone())
        .collect();

    info!(
        to_create = result.to_create.len(),
        to_update = result.to_update.len(),
        obsolete = result.obsolete.len(),
        "reconciliation planned"
    );

    result
}
