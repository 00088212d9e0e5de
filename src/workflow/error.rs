use thiserror::Error;

use crate::tracker::TrackerError;

/// Failures that stop a run before any tracker mutation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("could not read issue {key}: {source}")]
    ReadIssue {
        key: String,
        #[source]
        source: TrackerError,
    },

    #[error("could not list tests linked to {key}: {source}")]
    LinkedTests {
        key: String,
        #[source]
        source: TrackerError,
    },

    #[error("scenario generation unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("no project key given and no default project configured")]
    MissingProject,
}
