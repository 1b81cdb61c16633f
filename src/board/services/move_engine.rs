//! Move and reorder commands applied atomically to tasks and board.

use super::{
    BoardServiceResult, EngineConfig,
    unit_of_work::{
        PlacementRequest, PlannedPlacement, Prepared, apply_with_retry, find_existing_task,
        plan_placement,
    },
};
use crate::board::{
    domain::{BoardDomainError, SubStatus, Task, TaskId, WorkflowStatus},
    ports::BoardRepository,
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Client command moving a card to a column and position.
///
/// Values arrive as text and are checked by [`MoveCommand::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCommand {
    /// Task being moved.
    #[serde(default)]
    pub task_id: String,
    /// Column the client believes the card is in. Used only as a hint.
    #[serde(default)]
    pub from_column_type: Option<String>,
    /// Destination column type.
    pub to_column_type: String,
    /// Zero-based destination position.
    pub target_order: i64,
    /// Presentation sub-status for the card.
    #[serde(default)]
    pub sub_status: Option<String>,
}

impl MoveCommand {
    /// Creates a command without a hint or sub-status.
    #[must_use]
    pub fn new(
        task_id: impl Into<String>,
        to_column_type: impl Into<String>,
        target_order: i64,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            from_column_type: None,
            to_column_type: to_column_type.into(),
            target_order,
            sub_status: None,
        }
    }

    /// Sets the client's origin hint.
    #[must_use]
    pub fn with_from(mut self, from_column_type: impl Into<String>) -> Self {
        self.from_column_type = Some(from_column_type.into());
        self
    }

    /// Sets the card's sub-status.
    #[must_use]
    pub fn with_sub_status(mut self, sub_status: impl Into<String>) -> Self {
        self.sub_status = Some(sub_status.into());
        self
    }

    /// Parses every field.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError`] for a missing or malformed task id, an
    /// unknown column type or sub-status, or a negative or oversized order.
    pub fn validate(&self) -> Result<ValidatedMove, BoardDomainError> {
        let task_id = TaskId::parse(&self.task_id)?;
        let to = WorkflowStatus::try_from(self.to_column_type.as_str())?;
        let from_hint = self
            .from_column_type
            .as_deref()
            .map(WorkflowStatus::try_from)
            .transpose()?;
        if self.target_order < 0 {
            return Err(BoardDomainError::NegativeOrder(self.target_order));
        }
        let target_order = u32::try_from(self.target_order)
            .map_err(|_| BoardDomainError::OrderOutOfRange(self.target_order))?;
        let sub_status = self
            .sub_status
            .as_deref()
            .map(SubStatus::try_from)
            .transpose()?;
        Ok(ValidatedMove {
            task_id,
            from_hint,
            to,
            target_order,
            sub_status,
        })
    }
}

/// A move command with every field parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedMove {
    /// Task being moved.
    pub task_id: TaskId,
    /// Client's origin hint.
    pub from_hint: Option<WorkflowStatus>,
    /// Destination column type.
    pub to: WorkflowStatus,
    /// Destination position, clamped on placement.
    pub target_order: u32,
    /// Sub-status to set; `None` keeps the card's current one.
    pub sub_status: Option<SubStatus>,
}

/// Result of a successful move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    /// Always `true`; failures are returned as errors.
    pub success: bool,
    /// Task status after the move.
    pub new_status: WorkflowStatus,
    /// Display name of the destination column.
    pub new_column: String,
    /// Final position in the destination column.
    pub new_order: u32,
    /// The move went past a non-blocking WIP limit.
    pub wip_limit_exceeded: bool,
}

/// Applies move commands to a parent's tasks and board as one unit.
#[derive(Clone)]
pub struct MoveEngine<R, C>
where
    R: BoardRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    config: EngineConfig,
}

impl<R, C> MoveEngine<R, C>
where
    R: BoardRepository,
    C: Clock + Send + Sync,
{
    /// Creates an engine with the default configuration.
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

    /// Moves or reorders a card.
    ///
    /// The task is resolved server-side and the loaded board is reconciled
    /// before placement. A blocking WIP limit on the destination refuses the
    /// move with nothing written. A cross-column move sets the task's status
    /// to the destination type; a same-column move only reorders.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::Validation`] for a malformed
    /// command, [`super::BoardServiceError::TaskNotFound`] for an unknown
    /// task, [`super::BoardServiceError::WipLimitExceeded`] when the
    /// destination is full and blocking, and
    /// [`super::BoardServiceError::Storage`] when the commit fails.
    pub async fn move_task(&self, command: &MoveCommand) -> BoardServiceResult<MoveResponse> {
        let request = command.validate()?;
        let parent = find_existing_task(&*self.repository, request.task_id)
            .await?
            .parent_group_id();

        let template = &self.config.template;
        let clock = &*self.clock;
        let (placement, moved, column_name) = apply_with_retry(
            &*self.repository,
            parent,
            self.config.max_commit_attempts,
            |snapshot| {
                if let Some(hint) = request.from_hint
                    && let Some(actual) = snapshot.task(request.task_id).map(Task::status)
                    && hint != actual
                {
                    debug!(
                        %parent,
                        task_id = %request.task_id,
                        %hint,
                        %actual,
                        "ignoring stale origin hint"
                    );
                }
                let PlannedPlacement {
                    changes,
                    placement,
                    task: moved,
                    column_name,
                } = plan_placement(
                    snapshot,
                    PlacementRequest {
                        task_id: request.task_id,
                        to: Some(request.to),
                        target_order: request.target_order,
                        sub_status: request.sub_status,
                    },
                    template,
                    clock,
                )?;
                Ok(Prepared::Commit(
                    Box::new(changes),
                    (placement, moved, column_name),
                ))
            },
        )
        .await?;

        info!(
            %parent,
            task_id = %request.task_id,
            from = ?placement.from,
            to = %placement.to,
            order = placement.order,
            "task moved"
        );
        Ok(MoveResponse {
            success: true,
            new_status: moved.status(),
            new_column: column_name,
            new_order: placement.order,
            wip_limit_exceeded: placement.exceeded_soft_limit(),
        })
    }
}
