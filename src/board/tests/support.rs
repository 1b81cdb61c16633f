//! Shared builders for board unit tests.

use crate::board::{
    adapters::memory::InMemoryBoardRepository,
    domain::{
        BoardConfig, BoardTemplate, ColumnTemplate, ParentGroupId, PersistedTaskData, Task,
        TaskId, TaskName, TaskPriority, WorkflowStatus,
    },
    services::{
        BoardBuilder, BoardView, ColumnSettingsService, CreateTaskRequest, EngineConfig,
        MoveCommand, MoveEngine, MoveResponse, TaskStore,
    },
};
use chrono::{Duration, TimeZone, Utc};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Builds a persisted-looking task. `seq` orders creation times.
pub(super) fn task_at(
    parent: ParentGroupId,
    name: &str,
    status: WorkflowStatus,
    order_key: u32,
    seq: i64,
) -> Task {
    let created_at = Utc
        .with_ymd_and_hms(2026, 1, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
        + Duration::minutes(seq);
    Task::from_persisted(PersistedTaskData {
        id: TaskId::new(),
        parent_group_id: parent,
        name: TaskName::new(name).expect("valid task name"),
        status,
        order_key,
        category: None,
        priority: TaskPriority::Medium,
        created_at,
        updated_at: created_at,
    })
}

/// Template without WIP limits except one on `limited`.
pub(super) fn template_with_limit(
    limited: WorkflowStatus,
    limit: u32,
    blocking: bool,
) -> BoardTemplate {
    let columns = BoardTemplate::without_wip_limits()
        .columns()
        .iter()
        .cloned()
        .map(|column| {
            if column.column_type == limited {
                column.with_wip_limit(limit, blocking)
            } else {
                column
            }
        })
        .collect::<Vec<ColumnTemplate>>();
    BoardTemplate::new(columns).expect("valid template")
}

/// Empty board without WIP limits.
pub(super) fn open_board() -> BoardConfig {
    BoardConfig::from_template(&BoardTemplate::without_wip_limits())
}

/// Places `tasks` on `board` in order, each in its status column.
pub(super) fn place_all(board: &mut BoardConfig, tasks: &[Task]) {
    for task in tasks {
        board
            .place_card(task.id(), task.status(), u32::MAX, None)
            .expect("placement should succeed");
    }
}

/// Asserts every column is ordered `0..len`.
pub(super) fn assert_contiguous(board: &BoardConfig) {
    for column in board.columns() {
        assert!(
            column.is_contiguous(),
            "column {} is not contiguous",
            column.column_type()
        );
    }
}

/// Services wired to one in-memory repository.
pub(super) struct Harness {
    pub(super) repository: Arc<InMemoryBoardRepository>,
    pub(super) store: TaskStore<InMemoryBoardRepository, DefaultClock>,
    pub(super) engine: MoveEngine<InMemoryBoardRepository, DefaultClock>,
    pub(super) builder: BoardBuilder<InMemoryBoardRepository, DefaultClock>,
    pub(super) columns: ColumnSettingsService<InMemoryBoardRepository, DefaultClock>,
    pub(super) parent: ParentGroupId,
}

impl Harness {
    pub(super) fn new(config: &EngineConfig) -> Self {
        let repository = Arc::new(InMemoryBoardRepository::new());
        let clock = Arc::new(DefaultClock);
        Self {
            store: TaskStore::new(Arc::clone(&repository), Arc::clone(&clock))
                .with_config(config.clone()),
            engine: MoveEngine::new(Arc::clone(&repository), Arc::clone(&clock))
                .with_config(config.clone()),
            builder: BoardBuilder::new(Arc::clone(&repository), Arc::clone(&clock))
                .with_config(config.clone()),
            columns: ColumnSettingsService::new(Arc::clone(&repository), clock)
                .with_config(config.clone()),
            repository,
            parent: ParentGroupId::new(),
        }
    }

    /// Creates a todo task on the harness parent.
    pub(super) async fn create(&self, name: &str) -> Task {
        self.store
            .create_task(CreateTaskRequest::new(self.parent, name))
            .await
            .expect("task creation should succeed")
    }

    /// Moves a task, panicking on failure.
    pub(super) async fn move_to(&self, task: &Task, to: &str, order: i64) -> MoveResponse {
        self.engine
            .move_task(&MoveCommand::new(task.id().to_string(), to, order))
            .await
            .expect("move should succeed")
    }

    /// Reads the board through the builder.
    pub(super) async fn view(&self) -> BoardView {
        self.builder
            .build(self.parent)
            .await
            .expect("board should build")
    }

    /// Returns the stored task.
    pub(super) async fn reload(&self, task: &Task) -> Task {
        self.store.get(task.id()).await.expect("task should exist")
    }
}

#[fixture]
pub(super) fn harness() -> Harness {
    Harness::new(&EngineConfig::unlimited())
}
