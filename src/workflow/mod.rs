pub mod error;
pub mod service;

pub use error::WorkflowError;
pub use service::{SyncRequest, SyncWorkflow, TestSuiteService, WorkflowSettings};
