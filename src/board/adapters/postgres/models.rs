//! Diesel row models and row conversions for board persistence.

use super::schema::{activities, board_configs, tasks};
use crate::board::{
    domain::{
        Activity, ActivityStatus, BoardConfig, ParentGroupId, PersistedTaskData, StoredBoard, Task,
        TaskId, TaskName, TaskPriority, WorkflowStatus,
    },
    ports::{BoardRepositoryError, BoardRepositoryResult, BoardRevision},
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Task row, used for reads, inserts, and upserts.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning parent group.
    pub parent_group_id: uuid::Uuid,
    /// Task name.
    pub name: String,
    /// Workflow status.
    pub status: String,
    /// Order within the status group.
    pub order_key: i32,
    /// Optional category.
    pub category: Option<String>,
    /// Priority.
    pub priority: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Board row keyed by parent group.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = board_configs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BoardConfigRow {
    /// Owning parent group.
    pub parent_group_id: uuid::Uuid,
    /// Persisted column array.
    pub layout: Value,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Activity row carrying the parent group's revision.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = activities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityRow {
    /// Parent group identifier.
    pub id: uuid::Uuid,
    /// Rolled-up status.
    pub status: String,
    /// Write revision.
    pub revision: i64,
    /// Last status change timestamp.
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn task_to_row(task: &Task) -> BoardRepositoryResult<TaskRow> {
    Ok(TaskRow {
        id: task.id().into_inner(),
        parent_group_id: task.parent_group_id().into_inner(),
        name: task.name().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        order_key: i32::try_from(task.order_key()).map_err(BoardRepositoryError::persistence)?,
        category: task.category().map(str::to_owned),
        priority: task.priority().as_str().to_owned(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

pub(crate) fn row_to_task(row: TaskRow) -> BoardRepositoryResult<Task> {
    let TaskRow {
        id,
        parent_group_id,
        name,
        status,
        order_key,
        category,
        priority,
        created_at,
        updated_at,
    } = row;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        parent_group_id: ParentGroupId::from_uuid(parent_group_id),
        name: TaskName::new(name).map_err(BoardRepositoryError::persistence)?,
        status: WorkflowStatus::try_from(status.as_str())
            .map_err(BoardRepositoryError::persistence)?,
        order_key: u32::try_from(order_key).map_err(BoardRepositoryError::persistence)?,
        category,
        priority: TaskPriority::try_from(priority.as_str())
            .map_err(BoardRepositoryError::persistence)?,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}

/// Decodes a stored board; a bad payload becomes [`StoredBoard::Unreadable`].
pub(crate) fn row_to_stored_board(row: Option<BoardConfigRow>) -> StoredBoard {
    match row {
        None => StoredBoard::Missing,
        Some(found) => match BoardConfig::from_persisted(found.layout) {
            Ok(board) => StoredBoard::Present(board),
            Err(err) => StoredBoard::Unreadable(err.to_string()),
        },
    }
}

pub(crate) fn row_to_activity(row: ActivityRow) -> BoardRepositoryResult<(Activity, BoardRevision)> {
    let status =
        ActivityStatus::try_from(row.status.as_str()).map_err(BoardRepositoryError::persistence)?;
    let revision = u64::try_from(row.revision).map_err(BoardRepositoryError::persistence)?;
    let activity = Activity::from_persisted(ParentGroupId::from_uuid(row.id), status, row.updated_at);
    Ok((activity, BoardRevision::new(revision)))
}
