//! When steps for board move BDD scenarios.

use super::world::{BoardMoveWorld, run_async};
use eyre::WrapErr;
use kanban_sync::board::services::MoveCommand;
use rstest_bdd_macros::when;

#[when(r#""{name}" is moved to "{column}" at position {order:i64}"#)]
fn task_is_moved(
    world: &mut BoardMoveWorld,
    name: String,
    column: String,
    order: i64,
) -> Result<(), eyre::Report> {
    let command = MoveCommand::new(world.task(&name)?.id().to_string(), column, order);
    world.last_move = Some(run_async(world.engine.move_task(&command)));
    Ok(())
}

#[when("the board is read")]
fn board_is_read(world: &mut BoardMoveWorld) -> Result<(), eyre::Report> {
    let view = run_async(world.builder.build(world.parent)).wrap_err("build board view")?;
    world.last_view = Some(view);
    Ok(())
}
