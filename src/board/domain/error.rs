//! Error types for board domain validation and parsing.

use super::WorkflowStatus;
use thiserror::Error;

/// Errors returned while constructing or validating board domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The command did not carry a task identifier.
    #[error("task identifier is required")]
    MissingTaskId,

    /// The task identifier is not a valid UUID.
    #[error("invalid task identifier '{0}'")]
    InvalidTaskId(String),

    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// The task name exceeds the storage limit.
    #[error("task name exceeds {max} characters")]
    TaskNameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },

    /// A status, column type, sub-status, or priority value was not recognised.
    #[error(transparent)]
    UnknownValue(#[from] ParseStatusError),

    /// A target order was negative.
    #[error("target order must not be negative, got {0}")]
    NegativeOrder(i64),

    /// A target order does not fit the supported range.
    #[error("target order {0} is out of range")]
    OrderOutOfRange(i64),

    /// A board or template lists the same column type twice.
    #[error("duplicate column type '{0}'")]
    DuplicateColumn(WorkflowStatus),

    /// A template does not provide a column for every workflow status.
    #[error("template is missing a column for '{0}'")]
    MissingColumn(WorkflowStatus),

    /// A column display name is empty after trimming.
    #[error("column name must not be empty")]
    EmptyColumnName,

    /// A stored board payload could not be decoded.
    #[error("unreadable board configuration: {0}")]
    UnreadableBoard(String),
}

/// Error returned while parsing an enumerated value from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseStatusError {
    /// Name of the value family being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseStatusError {
    pub(super) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}
