//! Repository port for board snapshots and atomic commits.
//!
//! A parent group's tasks, board, and activity are read together as one
//! snapshot and written together as one changeset. Each commit is
//! conditional on the snapshot's revision, so an adapter either applies the
//! whole changeset or nothing.

use crate::board::domain::{Activity, BoardConfig, ParentGroupId, StoredBoard, Task, TaskId};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for board repository operations.
pub type BoardRepositoryResult<T> = Result<T, BoardRepositoryError>;

/// Per-parent storage revision, bumped by every commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BoardRevision(u64);

impl BoardRevision {
    /// Revision of a parent that has never been written.
    pub const INITIAL: Self = Self(0);

    /// Wraps a stored revision value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the stored value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the revision that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for BoardRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Consistent read of everything stored for one parent group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// Parent group the snapshot describes.
    pub parent: ParentGroupId,
    /// Revision at read time.
    pub revision: BoardRevision,
    /// Stored board, if any.
    pub board: StoredBoard,
    /// Every task of the parent.
    pub tasks: Vec<Task>,
    /// Stored activity, if the parent has been written before.
    pub activity: Option<Activity>,
}

impl BoardSnapshot {
    /// Snapshot of a parent with nothing stored.
    #[must_use]
    pub const fn empty(parent: ParentGroupId) -> Self {
        Self {
            parent,
            revision: BoardRevision::INITIAL,
            board: StoredBoard::Missing,
            tasks: Vec::new(),
            activity: None,
        }
    }

    /// Returns the task with `id`, if it belongs to this parent.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }
}

/// Writes applied atomically to one parent group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardChangeset {
    /// Parent group being written.
    pub parent: ParentGroupId,
    /// Revision the changes were computed from.
    pub expected_revision: BoardRevision,
    /// Recomputed activity.
    pub activity: Activity,
    /// Replacement board, when it changed.
    pub board: Option<BoardConfig>,
    /// Tasks to insert or overwrite.
    pub upserted_tasks: Vec<Task>,
    /// Tasks to delete.
    pub removed_tasks: Vec<TaskId>,
}

impl BoardChangeset {
    /// Creates a changeset carrying only the recomputed activity.
    #[must_use]
    pub const fn new(expected_revision: BoardRevision, activity: Activity) -> Self {
        Self {
            parent: activity.id(),
            expected_revision,
            activity,
            board: None,
            upserted_tasks: Vec::new(),
            removed_tasks: Vec::new(),
        }
    }

    /// Replaces the stored board.
    #[must_use]
    pub fn with_board(mut self, board: BoardConfig) -> Self {
        self.board = Some(board);
        self
    }

    /// Inserts or overwrites tasks.
    #[must_use]
    pub fn with_tasks(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.upserted_tasks.extend(tasks);
        self
    }

    /// Deletes a task.
    #[must_use]
    pub fn with_removed_task(mut self, task_id: TaskId) -> Self {
        self.removed_tasks.push(task_id);
        self
    }
}

/// Board persistence contract.
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Reads the parent's board, tasks, activity, and revision as one
    /// consistent snapshot.
    ///
    /// A board payload that cannot be decoded is returned as
    /// [`StoredBoard::Unreadable`] rather than as an error.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::Persistence`] on storage failure.
    async fn load_snapshot(&self, parent: ParentGroupId) -> BoardRepositoryResult<BoardSnapshot>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::Persistence`] on storage failure.
    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>>;

    /// Applies every write in `changes` atomically and returns the new
    /// revision.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::RevisionConflict`] when the parent was
    /// written since `changes.expected_revision`,
    /// [`BoardRepositoryError::ForeignTask`] when an upserted task belongs to
    /// another parent, or [`BoardRepositoryError::Persistence`] on storage
    /// failure. Nothing is written in any of these cases.
    async fn commit(&self, changes: BoardChangeset) -> BoardRepositoryResult<BoardRevision>;
}

/// Errors returned by board repository implementations.
#[derive(Debug, Clone, Error)]
pub enum BoardRepositoryError {
    /// The parent was written after the snapshot was taken.
    #[error("revision conflict for parent {parent}: expected {expected}, found {actual}")]
    RevisionConflict {
        /// Parent group being written.
        parent: ParentGroupId,
        /// Revision the writer read.
        expected: BoardRevision,
        /// Revision currently stored.
        actual: BoardRevision,
    },

    /// A changeset tried to write a task owned by another parent.
    #[error("task {task} does not belong to parent {parent}")]
    ForeignTask {
        /// The offending task.
        task: TaskId,
        /// Parent group being written.
        parent: ParentGroupId,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BoardRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
