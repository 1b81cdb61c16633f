//! `PostgreSQL` repository implementation for board consistency storage.

use super::{
    models::{
        ActivityRow, BoardConfigRow, TaskRow, row_to_activity, row_to_stored_board, row_to_task,
        task_to_row,
    },
    schema::{activities, board_configs, tasks},
};
use crate::board::{
    domain::{ParentGroupId, Task, TaskId},
    ports::{
        BoardChangeset, BoardRepository, BoardRepositoryError, BoardRepositoryResult,
        BoardRevision, BoardSnapshot,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;
use diesel::upsert::excluded;
use serde_json::Value;

/// `PostgreSQL` connection pool type used by board adapters.
pub type BoardPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed board repository.
///
/// The `activities` row doubles as the parent's revision record, so every
/// commit touches it and concurrent writers serialize on that row.
#[derive(Debug, Clone)]
pub struct PostgresBoardRepository {
    pool: BoardPgPool,
}

impl PostgresBoardRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: BoardPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> BoardRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> BoardRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(BoardRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(BoardRepositoryError::persistence)?
    }
}

/// Failure inside a commit transaction. Any variant rolls the transaction
/// back.
#[derive(Debug)]
enum CommitFailure {
    Rejected(BoardRepositoryError),
    Database(DieselError),
}

impl From<DieselError> for CommitFailure {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

impl From<CommitFailure> for BoardRepositoryError {
    fn from(failure: CommitFailure) -> Self {
        match failure {
            CommitFailure::Rejected(err) => err,
            CommitFailure::Database(err) => Self::persistence(err),
        }
    }
}

struct PreparedCommit {
    parent: uuid::Uuid,
    expected: BoardRevision,
    expected_value: i64,
    next_value: i64,
    activity: ActivityRow,
    board: Option<Value>,
    task_rows: Vec<TaskRow>,
    removed: Vec<uuid::Uuid>,
}

type SnapshotRows = (Vec<TaskRow>, Option<BoardConfigRow>, Option<ActivityRow>);

#[async_trait]
impl BoardRepository for PostgresBoardRepository {
    async fn load_snapshot(&self, parent: ParentGroupId) -> BoardRepositoryResult<BoardSnapshot> {
        let parent_id = parent.into_inner();
        let (task_rows, board_row, activity_row) = self
            .run_blocking(move |connection| {
                connection
                    .build_transaction()
                    .read_only()
                    .repeatable_read()
                    .run(|tx| load_rows(tx, parent_id))
                    .map_err(BoardRepositoryError::persistence)
            })
            .await?;

        let tasks = task_rows
            .into_iter()
            .map(row_to_task)
            .collect::<BoardRepositoryResult<Vec<Task>>>()?;
        let (activity, revision) = match activity_row.map(row_to_activity).transpose()? {
            Some((stored, revision)) => (Some(stored), revision),
            None => (None, BoardRevision::INITIAL),
        };

        Ok(BoardSnapshot {
            parent,
            revision,
            board: row_to_stored_board(board_row),
            tasks,
            activity,
        })
    }

    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(BoardRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn commit(&self, changes: BoardChangeset) -> BoardRepositoryResult<BoardRevision> {
        let prepared = prepare_commit(changes)?;
        let next = prepared.expected.next();
        self.run_blocking(move |connection| {
            connection
                .transaction::<_, CommitFailure, _>(|tx| apply_commit(tx, &prepared))
                .map_err(BoardRepositoryError::from)
        })
        .await?;
        Ok(next)
    }
}

fn load_rows(connection: &mut PgConnection, parent: uuid::Uuid) -> QueryResult<SnapshotRows> {
    let task_rows = tasks::table
        .filter(tasks::parent_group_id.eq(parent))
        .order((tasks::order_key.asc(), tasks::created_at.asc(), tasks::id.asc()))
        .select(TaskRow::as_select())
        .load::<TaskRow>(connection)?;
    let board_row = board_configs::table
        .find(parent)
        .select(BoardConfigRow::as_select())
        .first::<BoardConfigRow>(connection)
        .optional()?;
    let activity_row = activities::table
        .find(parent)
        .select(ActivityRow::as_select())
        .first::<ActivityRow>(connection)
        .optional()?;
    Ok((task_rows, board_row, activity_row))
}

fn prepare_commit(changes: BoardChangeset) -> BoardRepositoryResult<PreparedCommit> {
    let BoardChangeset {
        parent,
        expected_revision,
        activity,
        board,
        upserted_tasks,
        removed_tasks,
    } = changes;

    if let Some(foreign) = upserted_tasks
        .iter()
        .find(|task| task.parent_group_id() != parent)
    {
        return Err(BoardRepositoryError::ForeignTask {
            task: foreign.id(),
            parent,
        });
    }

    let expected_value =
        i64::try_from(expected_revision.value()).map_err(BoardRepositoryError::persistence)?;
    let next_value = i64::try_from(expected_revision.next().value())
        .map_err(BoardRepositoryError::persistence)?;
    let payload = board
        .map(|config| config.to_persisted())
        .transpose()
        .map_err(BoardRepositoryError::persistence)?;
    let task_rows = upserted_tasks
        .iter()
        .map(task_to_row)
        .collect::<BoardRepositoryResult<Vec<_>>>()?;

    Ok(PreparedCommit {
        parent: parent.into_inner(),
        expected: expected_revision,
        expected_value,
        next_value,
        activity: ActivityRow {
            id: parent.into_inner(),
            status: activity.status().as_str().to_owned(),
            revision: next_value,
            updated_at: activity.updated_at(),
        },
        board: payload,
        task_rows,
        removed: removed_tasks.into_iter().map(TaskId::into_inner).collect(),
    })
}

fn apply_commit(
    connection: &mut PgConnection,
    prepared: &PreparedCommit,
) -> Result<(), CommitFailure> {
    claim_revision(connection, prepared)?;
    reject_foreign_tasks(connection, prepared)?;

    if let Some(layout) = &prepared.board {
        diesel::insert_into(board_configs::table)
            .values((
                board_configs::parent_group_id.eq(prepared.parent),
                board_configs::layout.eq(layout),
                board_configs::updated_at.eq(prepared.activity.updated_at),
            ))
            .on_conflict(board_configs::parent_group_id)
            .do_update()
            .set((
                board_configs::layout.eq(excluded(board_configs::layout)),
                board_configs::updated_at.eq(excluded(board_configs::updated_at)),
            ))
            .execute(connection)?;
    }

    for row in &prepared.task_rows {
        diesel::insert_into(tasks::table)
            .values(row)
            .on_conflict(tasks::id)
            .do_update()
            .set(row)
            .execute(connection)?;
    }

    if !prepared.removed.is_empty() {
        diesel::delete(
            tasks::table
                .filter(tasks::parent_group_id.eq(prepared.parent))
                .filter(tasks::id.eq_any(&prepared.removed)),
        )
        .execute(connection)?;
    }
    Ok(())
}

/// Bumps the parent's revision, failing when another writer got there first.
fn claim_revision(
    connection: &mut PgConnection,
    prepared: &PreparedCommit,
) -> Result<(), CommitFailure> {
    let claimed = if prepared.expected == BoardRevision::INITIAL {
        diesel::insert_into(activities::table)
            .values(&prepared.activity)
            .on_conflict(activities::id)
            .do_nothing()
            .execute(connection)?
    } else {
        diesel::update(
            activities::table
                .filter(activities::id.eq(prepared.parent))
                .filter(activities::revision.eq(prepared.expected_value)),
        )
        .set((
            activities::status.eq(&prepared.activity.status),
            activities::revision.eq(prepared.next_value),
            activities::updated_at.eq(prepared.activity.updated_at),
        ))
        .execute(connection)?
    };

    if claimed == 1 {
        return Ok(());
    }

    let stored = activities::table
        .find(prepared.parent)
        .select(activities::revision)
        .first::<i64>(connection)
        .optional()?
        .unwrap_or_default();
    let actual = u64::try_from(stored)
        .map(BoardRevision::new)
        .map_err(|err| CommitFailure::Rejected(BoardRepositoryError::persistence(err)))?;
    Err(CommitFailure::Rejected(
        BoardRepositoryError::RevisionConflict {
            parent: ParentGroupId::from_uuid(prepared.parent),
            expected: prepared.expected,
            actual,
        },
    ))
}

/// Refuses to overwrite or delete task rows owned by another parent.
fn reject_foreign_tasks(
    connection: &mut PgConnection,
    prepared: &PreparedCommit,
) -> Result<(), CommitFailure> {
    let touched: Vec<uuid::Uuid> = prepared
        .task_rows
        .iter()
        .map(|row| row.id)
        .chain(prepared.removed.iter().copied())
        .collect();
    if touched.is_empty() {
        return Ok(());
    }

    let foreign = tasks::table
        .filter(tasks::id.eq_any(&touched))
        .filter(tasks::parent_group_id.ne(prepared.parent))
        .select(tasks::id)
        .first::<uuid::Uuid>(connection)
        .optional()?;
    match foreign {
        Some(task) => Err(CommitFailure::Rejected(BoardRepositoryError::ForeignTask {
            task: TaskId::from_uuid(task),
            parent: ParentGroupId::from_uuid(prepared.parent),
        })),
        None => Ok(()),
    }
}
