//! Concurrent writers against one parent group.

use super::helpers::{BoardServices, ensure_consistent};
use kanban_sync::board::{
    domain::WorkflowStatus,
    services::{CreateTaskRequest, EngineConfig, MoveCommand},
};
use rstest::{fixture, rstest};
use std::sync::Arc;
use tokio::task::JoinSet;

const WRITERS: usize = 8;

#[fixture]
fn services() -> BoardServices {
    let config = EngineConfig {
        max_commit_attempts: 64,
        ..EngineConfig::unlimited()
    };
    BoardServices::new(&config)
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_moves_leave_a_consistent_board(
    services: BoardServices,
) -> Result<(), eyre::Report> {
    let names: Vec<String> = (0..WRITERS).map(|index| format!("Task {index}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let tasks = services.create_all(&refs).await?;

    let mut writers = JoinSet::new();
    for task in &tasks {
        let engine = Arc::clone(&services.engine);
        let command = MoveCommand::new(task.id().to_string(), "in_progress", 0);
        writers.spawn(async move { engine.move_task(&command).await });
    }
    while let Some(joined) = writers.join_next().await {
        joined??;
    }

    let view = services.view().await?;
    eyre::ensure!(view.repairs() == 0, "concurrent moves left drift behind");
    eyre::ensure!(view.board.task_ids(WorkflowStatus::InProgress).len() == WRITERS);
    eyre::ensure!(view.board.task_ids(WorkflowStatus::Todo).is_empty());
    ensure_consistent(&view.board, &view.tasks)?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_distinct_order_keys(
    services: BoardServices,
) -> Result<(), eyre::Report> {
    let mut writers = JoinSet::new();
    for index in 0..WRITERS {
        let store = Arc::clone(&services.store);
        let request = CreateTaskRequest::new(services.parent, format!("Task {index}"));
        writers.spawn(async move { store.create_task(request).await });
    }
    while let Some(joined) = writers.join_next().await {
        joined??;
    }

    let tasks = services.store.list_by_parent(services.parent).await?;
    let mut keys: Vec<u32> = tasks.iter().map(|task| task.order_key()).collect();
    keys.sort_unstable();
    let expected: Vec<u32> = (0..u32::try_from(WRITERS)?).collect();
    eyre::ensure!(keys == expected, "order keys {keys:?} are not 0..{WRITERS}");
    let view = services.view().await?;
    ensure_consistent(&view.board, &view.tasks)?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn interleaved_reorders_and_moves_stay_consistent(
    services: BoardServices,
) -> Result<(), eyre::Report> {
    let tasks = services.create_all(&["A", "B", "C", "D", "E", "F"]).await?;

    let mut writers = JoinSet::new();
    let targets = ["review", "todo"].into_iter().cycle();
    for ((index, task), target) in tasks.iter().enumerate().zip(targets) {
        let engine = Arc::clone(&services.engine);
        let order = i64::try_from(tasks.len() - index)?;
        let command = MoveCommand::new(task.id().to_string(), target, order);
        writers.spawn(async move { engine.move_task(&command).await });
    }
    while let Some(joined) = writers.join_next().await {
        joined??;
    }

    let view = services.view().await?;
    eyre::ensure!(view.repairs() == 0);
    eyre::ensure!(view.board.task_ids(WorkflowStatus::Review).len() == 3);
    ensure_consistent(&view.board, &view.tasks)?;
    Ok(())
}
