//! Non-fatal failure taxonomy.
//!
//! Nothing in the engine aborts the view: every failure degrades to an empty
//! list, a raw-text fallback or a dismissable [`Notification`].

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskflowError {
    /// Tool output could not be parsed; `raw` is shown to the user instead.
    #[error("could not parse tool output")]
    ParseFailure { raw: String },
    #[error("recoverable fetch error (code {code}): {message}")]
    RecoverableFetch { code: i64, message: String },
    #[error("fetch failed: {message}")]
    UnrecoverableFetch { message: String },
    #[error("malformed task in snapshot: {reason}")]
    MalformedSnapshot { reason: String },
    #[error("task {task_id} nests deeper than two levels; {dropped} sub-tasks dropped")]
    NestingTooDeep { task_id: String, dropped: usize },
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
    #[error("operation cancelled")]
    Cancelled,
}

/// Tag identifying a [`TaskflowError`] variant for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ParseFailure,
    RecoverableFetch,
    UnrecoverableFetch,
    MalformedSnapshot,
    NestingTooDeep,
    InvalidInput,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParseFailure => "parse_failure",
            Self::RecoverableFetch => "recoverable_fetch",
            Self::UnrecoverableFetch => "unrecoverable_fetch",
            Self::MalformedSnapshot => "malformed_snapshot",
            Self::NestingTooDeep => "nesting_too_deep",
            Self::InvalidInput => "invalid_input",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TaskflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ParseFailure { .. } => ErrorKind::ParseFailure,
            Self::RecoverableFetch { .. } => ErrorKind::RecoverableFetch,
            Self::UnrecoverableFetch { .. } => ErrorKind::UnrecoverableFetch,
            Self::MalformedSnapshot { .. } => ErrorKind::MalformedSnapshot,
            Self::NestingTooDeep { .. } => ErrorKind::NestingTooDeep,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Build the notification shown to the user. Parse failures surface the
    /// raw output itself.
    pub fn to_notification(&self) -> Notification {
        let message = match self {
            Self::ParseFailure { raw } => raw.clone(),
            other => other.to_string(),
        };
        Notification {
            kind: self.kind(),
            message,
        }
    }
}

/// A dismissable, non-blocking message for the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Notification {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&TaskflowError> for Notification {
    fn from(err: &TaskflowError) -> Self {
        err.to_notification()
    }
}
