//! Service-level errors shared by board services.

use crate::board::{
    domain::{BoardDomainError, PlacementError, TaskId, WorkflowStatus},
    ports::BoardRepositoryError,
};
use thiserror::Error;

/// Errors returned by board services.
///
/// Everything except [`BoardServiceError::Storage`] describes a request that
/// was refused before any write; see [`BoardServiceError::is_system_failure`].
#[derive(Debug, Error)]
pub enum BoardServiceError {
    /// No task exists with the given identifier.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    /// The board has no column of the given type.
    #[error("column '{0}' not found")]
    ColumnNotFound(WorkflowStatus),

    /// The request was malformed.
    #[error(transparent)]
    Validation(#[from] BoardDomainError),

    /// The destination column enforces a WIP limit it has already reached.
    #[error("column '{column}' has reached its WIP limit of {limit} ({current} cards)")]
    WipLimitExceeded {
        /// Destination column.
        column: WorkflowStatus,
        /// Configured limit.
        limit: u32,
        /// Cards currently in the destination.
        current: usize,
    },

    /// The atomic update could not be applied.
    #[error(transparent)]
    Storage(#[from] BoardRepositoryError),
}

impl BoardServiceError {
    /// Returns `true` for infrastructure failures, `false` for refused
    /// requests.
    #[must_use]
    pub const fn is_system_failure(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<PlacementError> for BoardServiceError {
    fn from(err: PlacementError) -> Self {
        match err {
            PlacementError::ColumnNotFound(column) => Self::ColumnNotFound(column),
            PlacementError::WipLimitExceeded {
                column,
                limit,
                current,
            } => Self::WipLimitExceeded {
                column,
                limit,
                current,
            },
        }
    }
}

/// Result type for board service operations.
pub type BoardServiceResult<T> = Result<T, BoardServiceError>;
