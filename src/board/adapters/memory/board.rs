//! In-memory board repository for tests and single-process use.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::board::{
    domain::{Activity, BoardConfig, ParentGroupId, StoredBoard, Task, TaskId},
    ports::{
        BoardChangeset, BoardRepository, BoardRepositoryError, BoardRepositoryResult,
        BoardRevision, BoardSnapshot,
    },
};

/// Thread-safe in-memory board repository.
///
/// Boards are held in their persisted JSON shape so that decoding runs on
/// every read, exactly as it does against a database. A single write lock
/// around each commit makes the changeset atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoardRepository {
    state: Arc<RwLock<InMemoryBoardState>>,
}

#[derive(Debug, Default)]
struct InMemoryBoardState {
    tasks: HashMap<TaskId, Task>,
    boards: HashMap<ParentGroupId, Value>,
    activities: HashMap<ParentGroupId, Activity>,
    revisions: HashMap<ParentGroupId, BoardRevision>,
}

impl InMemoryBoardRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw board payload for `parent`, bypassing validation and
    /// revision checks.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::Persistence`] if the lock is poisoned.
    pub fn put_raw_board(&self, parent: ParentGroupId, payload: Value) -> BoardRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.boards.insert(parent, payload);
        Ok(())
    }

    /// Returns the raw board payload stored for `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::Persistence`] if the lock is poisoned.
    pub fn raw_board(&self, parent: ParentGroupId) -> BoardRepositoryResult<Option<Value>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.boards.get(&parent).cloned())
    }

    /// Overwrites a task directly, bypassing the revision check, to simulate
    /// an edit made by another system.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::Persistence`] if the lock is poisoned.
    pub fn put_task(&self, task: Task) -> BoardRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.tasks.insert(task.id(), task);
        Ok(())
    }
}

fn lock_error<E: std::fmt::Display>(err: E) -> BoardRepositoryError {
    BoardRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn decode_board(payload: Option<&Value>) -> StoredBoard {
    match payload {
        None => StoredBoard::Missing,
        Some(value) => match BoardConfig::from_persisted(value.clone()) {
            Ok(board) => StoredBoard::Present(board),
            Err(err) => StoredBoard::Unreadable(err.to_string()),
        },
    }
}

#[async_trait]
impl BoardRepository for InMemoryBoardRepository {
    async fn load_snapshot(&self, parent: ParentGroupId) -> BoardRepositoryResult<BoardSnapshot> {
        let state = self.state.read().map_err(lock_error)?;
        let tasks = state
            .tasks
            .values()
            .filter(|task| task.parent_group_id() == parent)
            .cloned()
            .collect();
        Ok(BoardSnapshot {
            parent,
            revision: state.revisions.get(&parent).copied().unwrap_or_default(),
            board: decode_board(state.boards.get(&parent)),
            tasks,
            activity: state.activities.get(&parent).cloned(),
        })
    }

    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn commit(&self, changes: BoardChangeset) -> BoardRepositoryResult<BoardRevision> {
        let BoardChangeset {
            parent,
            expected_revision,
            activity,
            board,
            upserted_tasks,
            removed_tasks,
        } = changes;

        // Everything fallible happens before the first write.
        let payload = board
            .map(|config| config.to_persisted())
            .transpose()
            .map_err(BoardRepositoryError::persistence)?;

        let mut state = self.state.write().map_err(lock_error)?;
        let actual = state.revisions.get(&parent).copied().unwrap_or_default();
        if actual != expected_revision {
            return Err(BoardRepositoryError::RevisionConflict {
                parent,
                expected: expected_revision,
                actual,
            });
        }
        if let Some(foreign) = upserted_tasks
            .iter()
            .find(|task| task.parent_group_id() != parent)
        {
            return Err(BoardRepositoryError::ForeignTask {
                task: foreign.id(),
                parent,
            });
        }
        let foreign_removal = removed_tasks.iter().copied().find(|task_id| {
            state
                .tasks
                .get(task_id)
                .is_some_and(|task| task.parent_group_id() != parent)
        });
        if let Some(task) = foreign_removal {
            return Err(BoardRepositoryError::ForeignTask { task, parent });
        }

        for task_id in &removed_tasks {
            state.tasks.remove(task_id);
        }
        for task in upserted_tasks {
            state.tasks.insert(task.id(), task);
        }
        if let Some(value) = payload {
            state.boards.insert(parent, value);
        }
        state.activities.insert(parent, activity);
        let next = actual.next();
        state.revisions.insert(parent, next);
        Ok(next)
    }
}
