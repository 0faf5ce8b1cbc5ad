//! When steps for task move BDD scenarios.

use super::world::{TaskMoveWorld, run_async};
use rstest_bdd_macros::when;
use taskboard::board::{domain::TaskStatus, services::MoveTaskRequest};

fn apply_move(world: &mut TaskMoveWorld, request: MoveTaskRequest) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(world.lifecycle.move_task(task_id, request));
    run_async(world.runtime.effects().settle());
    let reloaded = run_async(world.lifecycle.get(task_id))
        .map_err(|err| eyre::eyre!("reload task after move: {err}"))?;
    world.task = Some(reloaded);
    world.last_move = Some(result);
    Ok(())
}

fn parse_status(status: &str) -> Result<TaskStatus, eyre::Report> {
    TaskStatus::try_from(status).map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))
}

#[when(r#"the task is moved to "{status}""#)]
fn task_is_moved(world: &mut TaskMoveWorld, status: String) -> Result<(), eyre::Report> {
    let request = MoveTaskRequest::new(parse_status(&status)?);
    apply_move(world, request)
}

#[when(r#""{agent}" moves the task to "{status}""#)]
fn agent_moves_task(
    world: &mut TaskMoveWorld,
    agent: String,
    status: String,
) -> Result<(), eyre::Report> {
    let request = MoveTaskRequest::new(parse_status(&status)?).by(agent);
    apply_move(world, request)
}
