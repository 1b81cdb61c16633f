//! Shared test helpers for in-memory board integration tests.

use kanban_sync::board::{
    adapters::memory::InMemoryBoardRepository,
    domain::{BoardConfig, ParentGroupId, Task},
    services::{
        BoardBuilder, BoardView, CreateTaskRequest, EngineConfig, MoveCommand, MoveEngine,
        MoveResponse, TaskStore,
    },
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Task store over the in-memory repository.
pub type TestStore = TaskStore<InMemoryBoardRepository, DefaultClock>;
/// Move engine over the in-memory repository.
pub type TestEngine = MoveEngine<InMemoryBoardRepository, DefaultClock>;
/// Board builder over the in-memory repository.
pub type TestBuilder = BoardBuilder<InMemoryBoardRepository, DefaultClock>;

/// Services sharing one repository, scoped to one parent group.
pub struct BoardServices {
    pub repository: Arc<InMemoryBoardRepository>,
    pub store: Arc<TestStore>,
    pub engine: Arc<TestEngine>,
    pub builder: TestBuilder,
    pub parent: ParentGroupId,
}

impl BoardServices {
    /// Wires every service with `config`.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let repository = Arc::new(InMemoryBoardRepository::new());
        let clock = Arc::new(DefaultClock);
        Self {
            store: Arc::new(
                TaskStore::new(Arc::clone(&repository), Arc::clone(&clock))
                    .with_config(config.clone()),
            ),
            engine: Arc::new(
                MoveEngine::new(Arc::clone(&repository), Arc::clone(&clock))
                    .with_config(config.clone()),
            ),
            builder: BoardBuilder::new(Arc::clone(&repository), clock).with_config(config.clone()),
            repository,
            parent: ParentGroupId::new(),
        }
    }

    /// Creates named todo tasks in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any creation fails.
    pub async fn create_all(&self, names: &[&str]) -> Result<Vec<Task>, eyre::Report> {
        let mut created = Vec::with_capacity(names.len());
        for name in names {
            let task = self
                .store
                .create_task(CreateTaskRequest::new(self.parent, *name))
                .await?;
            created.push(task);
        }
        Ok(created)
    }

    /// Moves `task` to column `to` at `order`.
    ///
    /// # Errors
    ///
    /// Returns an error if the move is refused.
    pub async fn move_to(
        &self,
        task: &Task,
        to: &str,
        order: i64,
    ) -> Result<MoveResponse, eyre::Report> {
        let command = MoveCommand::new(task.id().to_string(), to, order);
        Ok(self.engine.move_task(&command).await?)
    }

    /// Builds the board view of the parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read.
    pub async fn view(&self) -> Result<BoardView, eyre::Report> {
        Ok(self.builder.build(self.parent).await?)
    }
}

/// Provides services with no WIP limits.
#[fixture]
pub fn services() -> BoardServices {
    BoardServices::new(&EngineConfig::unlimited())
}

/// Checks that every card sits in its task's status column at the task's
/// order key, and that each column is ordered `0..len`.
///
/// # Errors
///
/// Returns an error describing the first inconsistency found.
pub fn ensure_consistent(board: &BoardConfig, tasks: &[Task]) -> Result<(), eyre::Report> {
    eyre::ensure!(
        board.card_count() == tasks.len(),
        "board holds {} cards for {} tasks",
        board.card_count(),
        tasks.len()
    );
    for column in board.columns() {
        eyre::ensure!(
            column.is_contiguous(),
            "column {} is not contiguous",
            column.column_type()
        );
    }
    for task in tasks {
        let location = board
            .locate(task.id())
            .ok_or_else(|| eyre::eyre!("task {} has no card", task.id()))?;
        eyre::ensure!(
            location.column == task.status(),
            "task {} is in {} but has status {}",
            task.id(),
            location.column,
            task.status()
        );
        let position = u32::try_from(location.position)?;
        eyre::ensure!(
            position == task.order_key(),
            "task {} sits at {position} with order key {}",
            task.id(),
            task.order_key()
        );
    }
    Ok(())
}
