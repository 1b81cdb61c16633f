//! Column settings: display name, WIP limit, visibility, and styling.

use super::{
    BoardServiceError, BoardServiceResult, EngineConfig,
    unit_of_work::{Prepared, apply_with_retry, reconcile_snapshot, refreshed_activity},
};
use crate::board::{
    domain::{
        BoardDomainError, Column, ColumnSettingsUpdate, ParentGroupId, Reconciliation,
        WorkflowStatus,
    },
    ports::{BoardChangeset, BoardRepository, BoardSnapshot},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Updates per-column settings on a parent's board.
///
/// Lowering a WIP limit below the current card count is accepted; only
/// later entries are refused.
#[derive(Clone)]
pub struct ColumnSettingsService<R, C>
where
    R: BoardRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    config: EngineConfig,
}

impl<R, C> ColumnSettingsService<R, C>
where
    R: BoardRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service with the default configuration.
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

    /// Applies `update` to the column of type `column_type` and returns the
    /// updated column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] for an unknown column type
    /// or a blank name, [`BoardServiceError::ColumnNotFound`] when the board
    /// lacks the column, or [`BoardServiceError::Storage`] when the commit
    /// fails.
    pub async fn configure_column(
        &self,
        parent: ParentGroupId,
        column_type: &str,
        update: &ColumnSettingsUpdate,
    ) -> BoardServiceResult<Column> {
        let status = WorkflowStatus::try_from(column_type).map_err(BoardDomainError::from)?;
        let template = &self.config.template;
        let clock = &*self.clock;

        let column = apply_with_retry(
            &*self.repository,
            parent,
            self.config.max_commit_attempts,
            |mut snapshot| {
                let Reconciliation { mut board, .. } = reconcile_snapshot(&mut snapshot, template);
                let configured = board
                    .configure_column(status, update)?
                    .cloned()
                    .ok_or(BoardServiceError::ColumnNotFound(status))?;
                let BoardSnapshot {
                    revision,
                    tasks,
                    activity: stored_activity,
                    ..
                } = snapshot;
                let activity = refreshed_activity(parent, stored_activity, &tasks, clock);
                let changes = BoardChangeset::new(revision, activity).with_board(board);
                Ok(Prepared::Commit(Box::new(changes), configured))
            },
        )
        .await?;

        info!(
            %parent,
            column = %status,
            wip_limit = ?column.wip_limit(),
            blocking = column.block_on_wip_reached(),
            "column configured"
        );
        Ok(column)
    }
}
