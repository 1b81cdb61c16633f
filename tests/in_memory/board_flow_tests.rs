//! End-to-end board flows through the public services.

use super::helpers::{BoardServices, ensure_consistent, services};
use kanban_sync::board::{
    domain::{ActivityStatus, WorkflowStatus},
    services::{BoardServiceError, EngineConfig, MoveCommand},
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sprint_flow_keeps_tasks_and_board_in_step(
    services: BoardServices,
) -> Result<(), eyre::Report> {
    let tasks = services
        .create_all(&["Design", "Build", "Test", "Release"])
        .await?;
    let [design, build, test, release] = tasks.as_slice() else {
        eyre::bail!("expected four tasks");
    };

    services.move_to(design, "in_progress", 0).await?;
    services.move_to(build, "in_progress", 0).await?;
    services.move_to(design, "review", 0).await?;
    services.move_to(release, "todo", 0).await?;
    services.move_to(test, "blocked", 0).await?;
    services.move_to(design, "done", 0).await?;

    let view = services.view().await?;
    eyre::ensure!(view.repairs() == 0, "expected a clean board");
    ensure_consistent(&view.board, &view.tasks)?;
    eyre::ensure!(view.board.task_ids(WorkflowStatus::Todo) == vec![release.id()]);
    eyre::ensure!(view.board.task_ids(WorkflowStatus::InProgress) == vec![build.id()]);
    eyre::ensure!(view.board.task_ids(WorkflowStatus::Done) == vec![design.id()]);
    eyre::ensure!(view.activity_status == ActivityStatus::Blocked);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn move_response_serializes_in_camel_case(
    services: BoardServices,
) -> Result<(), eyre::Report> {
    let tasks = services.create_all(&["Only"]).await?;
    let task = tasks.first().ok_or_else(|| eyre::eyre!("missing task"))?;

    let response = services.move_to(task, "review", 3).await?;

    eyre::ensure!(
        serde_json::to_value(&response)?
            == json!({
                "success": true,
                "newStatus": "review",
                "newColumn": "Review",
                "newOrder": 0,
                "wipLimitExceeded": false
            })
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn move_command_decodes_wire_payload(services: BoardServices) -> Result<(), eyre::Report> {
    let tasks = services.create_all(&["A", "B"]).await?;
    let task = tasks.last().ok_or_else(|| eyre::eyre!("missing task"))?;
    let command: MoveCommand = serde_json::from_value(json!({
        "taskId": task.id(),
        "fromColumnType": "todo",
        "toColumnType": "blocked",
        "targetOrder": 0,
        "subStatus": "done"
    }))?;

    let response = services.engine.move_task(&command).await?;

    eyre::ensure!(response.new_status == WorkflowStatus::Blocked);
    let view = services.view().await?;
    ensure_consistent(&view.board, &view.tasks)?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn standard_template_blocks_sixth_task_in_progress() -> Result<(), eyre::Report> {
    let services = BoardServices::new(&EngineConfig::default());
    let tasks = services
        .create_all(&["One", "Two", "Three", "Four", "Five", "Six"])
        .await?;
    let (last, first_five) = tasks
        .split_last()
        .ok_or_else(|| eyre::eyre!("missing tasks"))?;
    for task in first_five {
        services.move_to(task, "in_progress", 0).await?;
    }

    let result = services.move_to(last, "in_progress", 0).await;

    let err = result
        .err()
        .ok_or_else(|| eyre::eyre!("sixth move should be refused"))?;
    eyre::ensure!(matches!(
        err.downcast_ref::<BoardServiceError>(),
        Some(BoardServiceError::WipLimitExceeded { limit: 5, current: 5, .. })
    ));
    let view = services.view().await?;
    ensure_consistent(&view.board, &view.tasks)?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn corrupted_board_heals_and_moves_continue(
    services: BoardServices,
) -> Result<(), eyre::Report> {
    let tasks = services.create_all(&["A", "B", "C"]).await?;
    services
        .repository
        .put_raw_board(services.parent, json!([{ "name": "Todo", "type": "todo", "cards": "?" }]))?;

    let task = tasks.get(1).ok_or_else(|| eyre::eyre!("missing task"))?;
    let response = services.move_to(task, "done", 0).await?;

    eyre::ensure!(response.new_order == 0);
    let view = services.view().await?;
    eyre::ensure!(view.repairs() == 0, "move should have persisted the repair");
    ensure_consistent(&view.board, &view.tasks)?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_every_task_leaves_an_empty_board(
    services: BoardServices,
) -> Result<(), eyre::Report> {
    let tasks = services.create_all(&["A", "B", "C"]).await?;
    for task in &tasks {
        services.store.delete_task(task.id()).await?;
    }

    let view = services.view().await?;
    eyre::ensure!(view.board.card_count() == 0);
    eyre::ensure!(view.tasks.is_empty());
    eyre::ensure!(view.board.columns().len() == WorkflowStatus::ALL.len());
    Ok(())
}
