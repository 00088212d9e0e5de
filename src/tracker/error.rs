use thiserror::Error;

/// HTTP statuses worth another attempt.
pub const RETRYABLE_STATUS: &[u16] = &[429, 500, 502, 503, 504];

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Network-level failure (connect, timeout, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// Tracker answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body did not have the expected shape.
    #[error("unexpected response ({context}): {message}")]
    Decode { context: String, message: String },

    #[error("issue not found: {0}")]
    NotFound(String),

    /// Client could not be built from its configuration.
    #[error("tracker configuration: {0}")]
    Config(String),
}

impl TrackerError {
    /// Transport failures and throttling/5xx answers can succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TrackerError::Transport(_) => true,
            TrackerError::Http { status, .. } => RETRYABLE_STATUS.contains(status),
            _ => false,
        }
    }
}
