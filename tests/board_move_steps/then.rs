//! Then steps for board move BDD scenarios.

use super::world::{BoardMoveWorld, names, run_async};
use eyre::WrapErr;
use kanban_sync::board::{
    domain::{ActivityStatus, Task, TaskId, WorkflowStatus},
    services::{BoardServiceError, BoardView, MoveResponse},
};
use rstest_bdd_macros::then;

fn successful_move(world: &BoardMoveWorld) -> Result<&MoveResponse, eyre::Report> {
    match world.last_move.as_ref() {
        Some(Ok(response)) => Ok(response),
        Some(Err(err)) => Err(eyre::eyre!("expected the move to succeed, got {err}")),
        None => Err(eyre::eyre!("no move was attempted")),
    }
}

fn last_view(world: &BoardMoveWorld) -> Result<&BoardView, eyre::Report> {
    world
        .last_view
        .as_ref()
        .ok_or_else(|| eyre::eyre!("the board was not read"))
}

#[then(r#"the move succeeds into column "{column}""#)]
fn move_succeeds_into(world: &BoardMoveWorld, column: String) -> Result<(), eyre::Report> {
    let response = successful_move(world)?;
    eyre::ensure!(response.success, "move response reports failure");
    eyre::ensure!(
        response.new_column == column,
        "expected column {column}, got {}",
        response.new_column
    );
    Ok(())
}

#[then("the move succeeds with a WIP warning")]
fn move_succeeds_with_warning(world: &BoardMoveWorld) -> Result<(), eyre::Report> {
    let response = successful_move(world)?;
    eyre::ensure!(response.wip_limit_exceeded, "expected a WIP warning");
    Ok(())
}

#[then("the move is refused for exceeding the WIP limit")]
fn move_is_refused(world: &BoardMoveWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_move
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no move was attempted"))?;
    if !matches!(result, Err(BoardServiceError::WipLimitExceeded { .. })) {
        return Err(eyre::eyre!("expected WipLimitExceeded, got {result:?}"));
    }
    Ok(())
}

#[then(r#"column "{column}" lists "{list}""#)]
fn column_lists(world: &BoardMoveWorld, column: String, list: String) -> Result<(), eyre::Report> {
    let status = WorkflowStatus::try_from(column.as_str())
        .map_err(|err| eyre::eyre!("invalid column in scenario: {err}"))?;
    let expected = names(&list)
        .map(|name| world.task(name).map(Task::id))
        .collect::<Result<Vec<TaskId>, _>>()?;
    let view = run_async(world.builder.build(world.parent)).wrap_err("build board view")?;
    let actual = view.board.task_ids(status);
    eyre::ensure!(
        actual == expected,
        "column {column} holds {actual:?}, expected {expected:?}"
    );
    Ok(())
}

#[then("every card matches its task order key")]
fn cards_match_order_keys(world: &BoardMoveWorld) -> Result<(), eyre::Report> {
    let view = run_async(world.builder.build(world.parent)).wrap_err("build board view")?;
    for task in &view.tasks {
        let location = view
            .board
            .locate(task.id())
            .ok_or_else(|| eyre::eyre!("task {} has no card", task.id()))?;
        eyre::ensure!(location.column == task.status(), "card in wrong column");
        eyre::ensure!(
            u32::try_from(location.position)? == task.order_key(),
            "card position does not match order key"
        );
    }
    Ok(())
}

#[then("the board was regenerated")]
fn board_was_regenerated(world: &BoardMoveWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(
        last_view(world)?.report.regenerated,
        "expected the board to be regenerated"
    );
    Ok(())
}

#[then("{count:usize} card was relocated")]
fn cards_relocated(world: &BoardMoveWorld, count: usize) -> Result<(), eyre::Report> {
    let relocated = last_view(world)?.report.relocated;
    eyre::ensure!(
        relocated == count,
        "expected {count} relocated cards, got {relocated}"
    );
    Ok(())
}

#[then(r#"the activity status is "{status}""#)]
fn activity_status_is(world: &BoardMoveWorld, status: String) -> Result<(), eyre::Report> {
    let expected = ActivityStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid activity status in scenario: {err}"))?;
    let actual = last_view(world)?.activity_status;
    eyre::ensure!(actual == expected, "expected {expected}, got {actual}");
    Ok(())
}
