pub mod dedupe;
pub mod plan;
pub mod record;

pub use dedupe::{
    DedupeOutcome, DeletionFailure, DuplicateGroups, DuplicateSplit, Prefer, dedupe_scenarios,
    find_duplicates, group_by_signature, resolve,
};
pub use plan::{PlannedUpdate, ReconciliationPlan, TitleCollision, plan};
pub use record::ExistingTestRecord;
