//! Read-side board assembly with self-healing.

use super::{
    BoardServiceResult, EngineConfig,
    unit_of_work::{load_snapshot, reconcile_snapshot, refreshed_activity},
};
use crate::board::{
    domain::{
        ActivityStatus, BoardConfig, ParentGroupId, Reconciliation, RepairReport, Task,
        rollup_project_status,
    },
    ports::{BoardChangeset, BoardRepository, BoardRevision, BoardSnapshot},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// A reconciled board ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    /// Parent group the board belongs to.
    pub parent: ParentGroupId,
    /// Consistent board.
    pub board: BoardConfig,
    /// Tasks of the parent.
    pub tasks: Vec<Task>,
    /// Repairs made while building the view.
    pub report: RepairReport,
    /// Derived activity status.
    pub activity_status: ActivityStatus,
    /// Stored revision the view reflects.
    pub revision: BoardRevision,
}

impl BoardView {
    /// Total repairs made while building the view.
    #[must_use]
    pub const fn repairs(&self) -> usize {
        self.report.repairs()
    }
}

/// Builds board views, healing stored boards that drifted from the tasks.
#[derive(Clone)]
pub struct BoardBuilder<R, C>
where
    R: BoardRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    config: EngineConfig,
}

impl<R, C> BoardBuilder<R, C>
where
    R: BoardRepository,
    C: Clock + Send + Sync,
{
    /// Creates a builder with the default configuration.
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

    /// Loads and reconciles the board of `parent`.
    ///
    /// A missing board is created from the template; an unreadable one is
    /// regenerated. When the result differs from storage it is written back.
    /// A failed write-back is logged and the view is still returned.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::Storage`] when the snapshot cannot
    /// be read.
    pub async fn build(&self, parent: ParentGroupId) -> BoardServiceResult<BoardView> {
        let mut snapshot = load_snapshot(&*self.repository, parent).await?;
        let reconciliation = reconcile_snapshot(&mut snapshot, &self.config.template);
        let write_back = reconciliation.needs_write_back();
        let Reconciliation { board, report, .. } = reconciliation;
        let BoardSnapshot {
            revision,
            tasks,
            activity: stored_activity,
            ..
        } = snapshot;

        let clock = &*self.clock;
        let activity = refreshed_activity(parent, stored_activity, &tasks, clock);
        let activity_status = activity.status();

        let stored_revision = if write_back {
            let changes = BoardChangeset::new(revision, activity).with_board(board.clone());
            match self.repository.commit(changes).await {
                Ok(next) => {
                    info!(%parent, repairs = report.repairs(), %next, "board written back");
                    next
                }
                Err(err) => {
                    warn!(%parent, error = %err, "board write-back failed");
                    revision
                }
            }
        } else {
            revision
        };

        Ok(BoardView {
            parent,
            board,
            tasks,
            report,
            activity_status,
            revision: stored_revision,
        })
    }

    /// Rolls the activity statuses of `parents` up to a project status.
    /// A parent with no tasks keeps its last stored status, or counts as
    /// todo if it was never written.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::Storage`] when a snapshot cannot
    /// be read.
    pub async fn project_status<I>(&self, parents: I) -> BoardServiceResult<ActivityStatus>
    where
        I: IntoIterator<Item = ParentGroupId> + Send,
        I::IntoIter: Send,
    {
        let clock = &*self.clock;
        let mut statuses = Vec::new();
        for parent in parents {
            let snapshot = load_snapshot(&*self.repository, parent).await?;
            let activity = refreshed_activity(parent, snapshot.activity, &snapshot.tasks, clock);
            statuses.push(activity.status());
        }
        Ok(rollup_project_status(statuses, None))
    }
}
