//! Shared world state for board move BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use kanban_sync::board::{
    adapters::memory::InMemoryBoardRepository,
    domain::{BoardTemplate, ParentGroupId, Task},
    services::{
        BoardBuilder, BoardServiceError, BoardView, EngineConfig, MoveEngine, MoveResponse,
        TaskStore,
    },
};
use mockable::DefaultClock;
use rstest::fixture;

/// Scenario world for board move behaviour tests.
pub struct BoardMoveWorld {
    pub repository: Arc<InMemoryBoardRepository>,
    pub store: TaskStore<InMemoryBoardRepository, DefaultClock>,
    pub engine: MoveEngine<InMemoryBoardRepository, DefaultClock>,
    pub builder: BoardBuilder<InMemoryBoardRepository, DefaultClock>,
    pub parent: ParentGroupId,
    pub tasks: HashMap<String, Task>,
    pub last_move: Option<Result<MoveResponse, BoardServiceError>>,
    pub last_view: Option<BoardView>,
}

impl BoardMoveWorld {
    /// Creates a world whose services use `template`.
    #[must_use]
    pub fn with_template(template: BoardTemplate) -> Self {
        let config = EngineConfig::default().with_template(template);
        let repository = Arc::new(InMemoryBoardRepository::new());
        let clock = Arc::new(DefaultClock);
        Self {
            store: TaskStore::new(Arc::clone(&repository), Arc::clone(&clock))
                .with_config(config.clone()),
            engine: MoveEngine::new(Arc::clone(&repository), Arc::clone(&clock))
                .with_config(config.clone()),
            builder: BoardBuilder::new(Arc::clone(&repository), clock).with_config(config),
            repository,
            parent: ParentGroupId::new(),
            tasks: HashMap::new(),
            last_move: None,
            last_view: None,
        }
    }

    /// Returns the task created under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if no task was created with that name.
    pub fn task(&self, name: &str) -> Result<&Task, eyre::Report> {
        self.tasks
            .get(name)
            .ok_or_else(|| eyre::eyre!("no task named {name} in scenario world"))
    }
}

impl Default for BoardMoveWorld {
    fn default() -> Self {
        Self::with_template(BoardTemplate::without_wip_limits())
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardMoveWorld {
    BoardMoveWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Splits a comma-separated list of task names.
pub fn names(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|name| !name.is_empty())
}
