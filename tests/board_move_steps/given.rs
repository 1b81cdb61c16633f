//! Given steps for board move BDD scenarios.

use super::world::{BoardMoveWorld, names, run_async};
use eyre::WrapErr;
use kanban_sync::board::{
    domain::{BoardTemplate, ColumnTemplate, WorkflowStatus},
    services::{CreateTaskRequest, MoveCommand},
};
use mockable::DefaultClock;
use rstest_bdd_macros::given;
use serde_json::json;

fn limited_template(
    column: &str,
    limit: u32,
    blocking: bool,
) -> Result<BoardTemplate, eyre::Report> {
    let limited = WorkflowStatus::try_from(column)
        .map_err(|err| eyre::eyre!("invalid column in scenario: {err}"))?;
    let columns: Vec<ColumnTemplate> = BoardTemplate::without_wip_limits()
        .columns()
        .iter()
        .cloned()
        .map(|template| {
            if template.column_type == limited {
                template.with_wip_limit(limit, blocking)
            } else {
                template
            }
        })
        .collect();
    BoardTemplate::new(columns).wrap_err("build scenario template")
}

#[given("a board without WIP limits")]
fn board_without_limits(world: &mut BoardMoveWorld) {
    *world = BoardMoveWorld::with_template(BoardTemplate::without_wip_limits());
}

#[given(r#"a board whose "{column}" column has a blocking WIP limit of {limit:u32}"#)]
fn board_with_blocking_limit(
    world: &mut BoardMoveWorld,
    column: String,
    limit: u32,
) -> Result<(), eyre::Report> {
    *world = BoardMoveWorld::with_template(limited_template(&column, limit, true)?);
    Ok(())
}

#[given(r#"a board whose "{column}" column has a soft WIP limit of {limit:u32}"#)]
fn board_with_soft_limit(
    world: &mut BoardMoveWorld,
    column: String,
    limit: u32,
) -> Result<(), eyre::Report> {
    *world = BoardMoveWorld::with_template(limited_template(&column, limit, false)?);
    Ok(())
}

#[given(r#"tasks "{list}" exist"#)]
fn tasks_exist(world: &mut BoardMoveWorld, list: String) -> Result<(), eyre::Report> {
    for name in names(&list) {
        let task = run_async(
            world
                .store
                .create_task(CreateTaskRequest::new(world.parent, name)),
        )
        .wrap_err_with(|| format!("create task {name}"))?;
        world.tasks.insert(name.to_owned(), task);
    }
    Ok(())
}

#[given(r#""{name}" has been moved to "{column}" at position {order:i64}"#)]
fn task_has_been_moved(
    world: &mut BoardMoveWorld,
    name: String,
    column: String,
    order: i64,
) -> Result<(), eyre::Report> {
    let command = MoveCommand::new(world.task(&name)?.id().to_string(), column, order);
    run_async(world.engine.move_task(&command)).wrap_err("move task in scenario setup")?;
    Ok(())
}

#[given("the stored board is corrupted")]
fn stored_board_is_corrupted(world: &mut BoardMoveWorld) -> Result<(), eyre::Report> {
    world
        .repository
        .put_raw_board(world.parent, json!({ "columns": 5 }))
        .wrap_err("overwrite stored board")?;
    Ok(())
}

#[given(r#""{name}" has its status set to "{status}" directly"#)]
fn status_set_directly(
    world: &mut BoardMoveWorld,
    name: String,
    status: String,
) -> Result<(), eyre::Report> {
    let target = WorkflowStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let mut task = run_async(world.store.get(world.task(&name)?.id()))
        .wrap_err("reload task for direct edit")?;
    eyre::ensure!(
        task.set_status(target, 0, &DefaultClock),
        "task {name} already has status {status}"
    );
    world
        .repository
        .put_task(task)
        .wrap_err("write task directly")?;
    Ok(())
}
