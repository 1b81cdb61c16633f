//! Snapshot, compute, and conditionally commit, retrying on revision
//! conflicts.

use super::{BoardServiceError, BoardServiceResult};
use crate::board::{
    domain::{
        Activity, BoardConfig, BoardTemplate, ParentGroupId, Placement, Reconciliation, StoredBoard,
        SubStatus, Task, TaskId, WorkflowStatus, reconcile,
    },
    ports::{BoardChangeset, BoardRepository, BoardRepositoryError, BoardSnapshot},
};
use mockable::Clock;
use std::collections::HashSet;
use tracing::{debug, error, warn};

/// Outcome of planning one write against a snapshot.
pub(super) enum Prepared<T> {
    /// Commit the changeset, then return the value.
    Commit(Box<BoardChangeset>, T),
    /// Nothing to write.
    Skip(T),
}

/// Loads a snapshot of `parent`, plans the write with `prepare`, and commits
/// it conditionally. A revision conflict re-runs the whole cycle until
/// `max_attempts` is spent.
pub(super) async fn apply_with_retry<R, T, F>(
    repository: &R,
    parent: ParentGroupId,
    max_attempts: u8,
    mut prepare: F,
) -> BoardServiceResult<T>
where
    R: BoardRepository + ?Sized,
    F: FnMut(BoardSnapshot) -> BoardServiceResult<Prepared<T>> + Send,
    T: Send,
{
    let mut attempt: u8 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        let snapshot = load_snapshot(repository, parent).await?;
        let (changes, value) = match prepare(snapshot)? {
            Prepared::Skip(value) => return Ok(value),
            Prepared::Commit(changes, value) => (changes, value),
        };
        match repository.commit(*changes).await {
            Ok(revision) => {
                debug!(%parent, %revision, attempt, "board changes committed");
                return Ok(value);
            }
            Err(BoardRepositoryError::RevisionConflict {
                expected, actual, ..
            }) if attempt < max_attempts => {
                debug!(%parent, %expected, %actual, attempt, "revision conflict, retrying");
            }
            Err(err) => return Err(storage_failure(parent, err)),
        }
    }
}

/// Logs a repository failure for `parent` and wraps it as a storage error.
pub(super) fn storage_failure(
    parent: ParentGroupId,
    err: BoardRepositoryError,
) -> BoardServiceError {
    error!(%parent, error = %err, "board storage failure");
    BoardServiceError::Storage(err)
}

/// Loads the snapshot of `parent`, logging a failed read.
pub(super) async fn load_snapshot<R>(
    repository: &R,
    parent: ParentGroupId,
) -> BoardServiceResult<BoardSnapshot>
where
    R: BoardRepository + ?Sized,
{
    repository
        .load_snapshot(parent)
        .await
        .map_err(|err| storage_failure(parent, err))
}

/// Resolves a task by id, logging a failed lookup.
pub(super) async fn find_existing_task<R>(
    repository: &R,
    task_id: TaskId,
) -> BoardServiceResult<Task>
where
    R: BoardRepository + ?Sized,
{
    repository
        .find_task(task_id)
        .await
        .map_err(|err| {
            error!(%task_id, error = %err, "task lookup failed");
            BoardServiceError::Storage(err)
        })?
        .ok_or(BoardServiceError::TaskNotFound(task_id))
}

/// Reconciles the snapshot's board, logging any repairs.
pub(super) fn reconcile_snapshot(
    snapshot: &mut BoardSnapshot,
    template: &BoardTemplate,
) -> Reconciliation {
    let stored = std::mem::replace(&mut snapshot.board, StoredBoard::Missing);
    if let StoredBoard::Unreadable(reason) = &stored {
        warn!(parent = %snapshot.parent, %reason, "regenerating unreadable board");
    }
    let reconciliation = reconcile(stored, &snapshot.tasks, template);
    if !reconciliation.report.is_clean() {
        warn!(
            parent = %snapshot.parent,
            repairs = reconciliation.report.repairs(),
            report = ?reconciliation.report,
            "board repaired"
        );
    }
    reconciliation
}

/// Sets every task's order key to its card position. Returns the ids of the
/// tasks that changed.
pub(super) fn realign_order_keys(
    tasks: &mut [Task],
    board: &BoardConfig,
    clock: &impl Clock,
) -> HashSet<TaskId> {
    let mut changed = HashSet::new();
    for column in board.columns() {
        for card in column.cards() {
            let Some(task) = tasks.iter_mut().find(|task| task.id() == card.task_id()) else {
                continue;
            };
            if task.set_order_key(card.order(), clock) {
                changed.insert(task.id());
            }
        }
    }
    changed
}

/// Recomputes the parent's activity from `tasks`.
pub(super) fn refreshed_activity(
    parent: ParentGroupId,
    stored: Option<Activity>,
    tasks: &[Task],
    clock: &impl Clock,
) -> Activity {
    let mut activity = stored.unwrap_or_else(|| Activity::new(parent, clock));
    activity.refresh(tasks.iter().map(Task::status), clock);
    activity
}

/// Clones the tasks whose ids are in `ids`.
pub(super) fn select_tasks(tasks: &[Task], ids: &HashSet<TaskId>) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| ids.contains(&task.id()))
        .cloned()
        .collect()
}

/// One card placement to plan against a snapshot.
#[derive(Debug, Clone, Copy)]
pub(super) struct PlacementRequest {
    pub(super) task_id: TaskId,
    pub(super) to: Option<WorkflowStatus>,
    pub(super) target_order: u32,
    pub(super) sub_status: Option<SubStatus>,
}

/// A planned placement, ready to commit.
pub(super) struct PlannedPlacement {
    pub(super) changes: BoardChangeset,
    pub(super) placement: Placement,
    pub(super) task: Task,
    pub(super) column_name: String,
}

/// Reconciles the snapshot, places the card, moves the task to the
/// destination status, and realigns order keys. `request.to` of `None`
/// reorders within the task's current column.
pub(super) fn plan_placement(
    mut snapshot: BoardSnapshot,
    request: PlacementRequest,
    template: &BoardTemplate,
    clock: &impl Clock,
) -> BoardServiceResult<PlannedPlacement> {
    let current = snapshot
        .task(request.task_id)
        .map(Task::status)
        .ok_or(BoardServiceError::TaskNotFound(request.task_id))?;
    let destination = request.to.unwrap_or(current);

    let Reconciliation { mut board, .. } = reconcile_snapshot(&mut snapshot, template);
    let placement = board.place_card(
        request.task_id,
        destination,
        request.target_order,
        request.sub_status,
    )?;

    let BoardSnapshot {
        parent,
        revision,
        mut tasks,
        activity: stored_activity,
        ..
    } = snapshot;

    let mut changed = HashSet::new();
    if let Some(task) = tasks.iter_mut().find(|task| task.id() == request.task_id)
        && task.set_status(destination, placement.order, clock)
    {
        changed.insert(task.id());
    }
    changed.extend(realign_order_keys(&mut tasks, &board, clock));

    let task = tasks
        .iter()
        .find(|task| task.id() == request.task_id)
        .cloned()
        .ok_or(BoardServiceError::TaskNotFound(request.task_id))?;
    let column_name = board
        .column(destination)
        .map(|column| column.name().to_owned())
        .ok_or(BoardServiceError::ColumnNotFound(destination))?;

    let activity = refreshed_activity(parent, stored_activity, &tasks, clock);
    let changes = BoardChangeset::new(revision, activity)
        .with_board(board)
        .with_tasks(select_tasks(&tasks, &changed));

    Ok(PlannedPlacement {
        changes,
        placement,
        task,
        column_name,
    })
}
