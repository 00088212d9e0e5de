pub mod console;
pub mod report_model;

pub use console::{format_dedupe_report, format_preview, format_sync_report};
pub use report_model::{
    ActionFailure, ActionKind, CreatedTest, DedupeReport, SyncCounts, SyncPreview, SyncReport,
    UpdatedTest,
};
