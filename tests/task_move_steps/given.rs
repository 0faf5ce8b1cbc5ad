//! Given steps for task move BDD scenarios.

use super::world::{TaskMoveWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::board::{
    domain::TaskStatus,
    services::{CreateTaskRequest, MoveTaskRequest},
};

#[given(r#"a task "{title}" assigned to "{agent}""#)]
fn task_assigned(
    world: &mut TaskMoveWorld,
    title: String,
    agent: String,
) -> Result<(), eyre::Report> {
    let task = run_async(
        world
            .lifecycle
            .create(CreateTaskRequest::new(title).with_agent(agent)),
    )
    .wrap_err("create task for move scenario")?;
    world.task = Some(task);
    Ok(())
}

#[given(r#"the task has been moved to "{status}""#)]
fn task_has_been_moved(world: &mut TaskMoveWorld, status: String) -> Result<(), eyre::Report> {
    let status = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let task_id = world.task()?.id();
    let outcome = run_async(
        world
            .lifecycle
            .move_task(task_id, MoveTaskRequest::new(status)),
    )
    .wrap_err("move task in scenario setup")?;
    run_async(world.runtime.effects().settle());
    let task = run_async(world.lifecycle.get(outcome.task.id())).wrap_err("reload task")?;
    world.released_session = task
        .agent_session_key()
        .map(|key| key.as_str().to_owned());
    world.task = Some(task);
    Ok(())
}
