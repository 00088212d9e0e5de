use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::report::ActionKind;

/// One tracker mutation, as written to the action journal.
#[derive(Debug, Serialize)]
pub struct JournalEvent {
    pub timestamp_ms: u128,
    pub issue: String,
    pub action: ActionKind,

    pub key: Option<String>,
    pub ok: bool,
    pub detail: Option<String>,
}

impl JournalEvent {
    pub fn now(issue: &str, action: ActionKind) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            issue: issue.to_string(),
            action,
            key: None,
            ok: true,
            detail: None,
        }
    }

    pub fn with_key(mut self, key: impl ToString) -> Self {
        self.key = Some(key.to_string());
        self
    }

    /// Mark the event failed on `Err`. The error is appended to any detail
    /// already set.
    pub fn with_outcome<T, E: ToString>(mut self, outcome: &Result<T, E>) -> Self {
        if let Err(e) = outcome {
            self.ok = false;
            let reason = e.to_string();
            self.detail = Some(match self.detail.take() {
                Some(detail) => format!("{}: {}", detail, reason),
                None => reason,
            });
        }
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
