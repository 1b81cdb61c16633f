//! Authoritative task records: lifecycle, status, and order.

use super::{
    BoardServiceError, BoardServiceResult, EngineConfig,
    unit_of_work::{
        PlacementRequest, Prepared, apply_with_retry, find_existing_task, load_snapshot,
        plan_placement, realign_order_keys, reconcile_snapshot, refreshed_activity, select_tasks,
    },
};
use crate::board::{
    domain::{
        BoardDomainError, ParentGroupId, Reconciliation, SubStatus, Task, TaskId, TaskName,
        TaskPriority, WorkflowStatus,
    },
    ports::{BoardChangeset, BoardRepository, BoardSnapshot},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    parent_group_id: ParentGroupId,
    name: String,
    category: Option<String>,
    priority: TaskPriority,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(parent_group_id: ParentGroupId, name: impl Into<String>) -> Self {
        Self {
            parent_group_id,
            name: name.into(),
            category: None,
            priority: TaskPriority::default(),
        }
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// Task record service.
///
/// Creation, deletion, and reordering keep the board in step. Setting a
/// status directly does not: the card is left where it is and the next
/// board read relocates it.
#[derive(Clone)]
pub struct TaskStore<R, C>
where
    R: BoardRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    config: EngineConfig,
}

impl<R, C> TaskStore<R, C>
where
    R: BoardRepository,
    C: Clock + Send + Sync,
{
    /// Creates a store with the default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            config: EngineConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Creates a task in todo, appended to the todo column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] for an invalid name,
    /// [`BoardServiceError::WipLimitExceeded`] when the todo column is full
    /// and blocking, or [`BoardServiceError::Storage`] when the commit fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> BoardServiceResult<Task> {
        let CreateTaskRequest {
            parent_group_id: parent,
            name,
            category,
            priority,
        } = request;
        let clock = &*self.clock;
        let base = Task::new(parent, TaskName::new(name)?, 0, clock).with_priority(priority);
        let draft = match category {
            Some(value) => base.with_category(value),
            None => base,
        };
        let task_id = draft.id();
        let template = &self.config.template;

        let created = apply_with_retry(
            &*self.repository,
            parent,
            self.config.max_commit_attempts,
            |mut snapshot| {
                let Reconciliation { mut board, .. } = reconcile_snapshot(&mut snapshot, template);
                board.admit_card(task_id, WorkflowStatus::Todo, SubStatus::default())?;
                let BoardSnapshot {
                    revision,
                    mut tasks,
                    activity: stored_activity,
                    ..
                } = snapshot;
                tasks.push(draft.clone());
                let mut changed = realign_order_keys(&mut tasks, &board, clock);
                changed.insert(task_id);

                let stored = tasks
                    .iter()
                    .find(|task| task.id() == task_id)
                    .cloned()
                    .ok_or(BoardServiceError::TaskNotFound(task_id))?;
                let activity = refreshed_activity(parent, stored_activity, &tasks, clock);
                let changes = BoardChangeset::new(revision, activity)
                    .with_board(board)
                    .with_tasks(select_tasks(&tasks, &changed));
                Ok(Prepared::Commit(Box::new(changes), stored))
            },
        )
        .await?;

        info!(%parent, %task_id, "task created");
        Ok(created)
    }

    /// Returns the task with `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskNotFound`] for an unknown id or
    /// [`BoardServiceError::Storage`] when the lookup fails.
    pub async fn get(&self, task_id: TaskId) -> BoardServiceResult<Task> {
        find_existing_task(&*self.repository, task_id).await
    }

    /// Sets a task's workflow status directly, outside the move contract.
    ///
    /// The card is appended to the end of the new status column in the same
    /// commit, skipping the WIP check, and order keys are realigned to card
    /// positions. The parent's activity is recomputed. Setting the current
    /// status is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] for an unknown status,
    /// [`BoardServiceError::TaskNotFound`] for an unknown task, or
    /// [`BoardServiceError::Storage`] when the commit fails.
    pub async fn set_status(&self, task_id: TaskId, status: &str) -> BoardServiceResult<Task> {
        let target = WorkflowStatus::try_from(status).map_err(BoardDomainError::from)?;
        let parent = self.get(task_id).await?.parent_group_id();
        let template = &self.config.template;
        let clock = &*self.clock;

        let updated = apply_with_retry(
            &*self.repository,
            parent,
            self.config.max_commit_attempts,
            |mut snapshot| {
                let current = snapshot
                    .task(task_id)
                    .cloned()
                    .ok_or(BoardServiceError::TaskNotFound(task_id))?;
                if current.status() == target {
                    return Ok(Prepared::Skip(current));
                }
                let Reconciliation { mut board, .. } = reconcile_snapshot(&mut snapshot, template);
                let position = board.relocate_card(task_id, target)?;
                let BoardSnapshot {
                    revision,
                    mut tasks,
                    activity: stored_activity,
                    ..
                } = snapshot;

                let mut changed = realign_order_keys(&mut tasks, &board, clock);
                if let Some(task) = tasks.iter_mut().find(|task| task.id() == task_id)
                    && task.set_status(target, position, clock)
                {
                    changed.insert(task_id);
                }
                let updated = tasks
                    .iter()
                    .find(|task| task.id() == task_id)
                    .cloned()
                    .ok_or(BoardServiceError::TaskNotFound(task_id))?;

                let activity = refreshed_activity(parent, stored_activity, &tasks, clock);
                let changes = BoardChangeset::new(revision, activity)
                    .with_board(board)
                    .with_tasks(select_tasks(&tasks, &changed));
                Ok(Prepared::Commit(Box::new(changes), updated))
            },
        )
        .await?;

        info!(%parent, %task_id, status = %target, "task status set");
        Ok(updated)
    }

    /// Moves a task to `order` within its status group and resequences the
    /// group. The card moves to the same position in its column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] for a negative or oversized
    /// order, [`BoardServiceError::TaskNotFound`] for an unknown task, or
    /// [`BoardServiceError::Storage`] when the commit fails.
    pub async fn set_order(&self, task_id: TaskId, order: i64) -> BoardServiceResult<Task> {
        if order < 0 {
            return Err(BoardDomainError::NegativeOrder(order).into());
        }
        let target_order =
            u32::try_from(order).map_err(|_| BoardDomainError::OrderOutOfRange(order))?;
        let parent = self.get(task_id).await?.parent_group_id();
        let template = &self.config.template;
        let clock = &*self.clock;

        let reordered = apply_with_retry(
            &*self.repository,
            parent,
            self.config.max_commit_attempts,
            |snapshot| {
                let planned = plan_placement(
                    snapshot,
                    PlacementRequest {
                        task_id,
                        to: None,
                        target_order,
                        sub_status: None,
                    },
                    template,
                    clock,
                )?;
                Ok(Prepared::Commit(Box::new(planned.changes), planned.task))
            },
        )
        .await?;

        info!(%parent, %task_id, order = reordered.order_key(), "task reordered");
        Ok(reordered)
    }

    /// Lists the tasks of `parent` by status, then order key.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Storage`] when the read fails.
    pub async fn list_by_parent(&self, parent: ParentGroupId) -> BoardServiceResult<Vec<Task>> {
        let mut tasks = load_snapshot(&*self.repository, parent).await?.tasks;
        tasks.sort_by_key(|task| (task.status(), task.order_key(), task.created_at(), task.id()));
        Ok(tasks)
    }

    /// Deletes a task together with its card.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskNotFound`] for an unknown task or
    /// [`BoardServiceError::Storage`] when the commit fails.
    pub async fn delete_task(&self, task_id: TaskId) -> BoardServiceResult<()> {
        let parent = self.get(task_id).await?.parent_group_id();
        let template = &self.config.template;
        let clock = &*self.clock;

        apply_with_retry(
            &*self.repository,
            parent,
            self.config.max_commit_attempts,
            |mut snapshot| {
                if snapshot.task(task_id).is_none() {
                    return Err(BoardServiceError::TaskNotFound(task_id));
                }
                let Reconciliation { mut board, .. } = reconcile_snapshot(&mut snapshot, template);
                board.remove_card(task_id);
                let BoardSnapshot {
                    revision,
                    mut tasks,
                    activity: stored_activity,
                    ..
                } = snapshot;
                tasks.retain(|task| task.id() != task_id);
                let changed = realign_order_keys(&mut tasks, &board, clock);

                let activity = refreshed_activity(parent, stored_activity, &tasks, clock);
                let changes = BoardChangeset::new(revision, activity)
                    .with_board(board)
                    .with_tasks(select_tasks(&tasks, &changed))
                    .with_removed_task(task_id);
                Ok(Prepared::Commit(Box::new(changes), ()))
            },
        )
        .await?;

        info!(%parent, %task_id, "task deleted");
        Ok(())
    }
}
