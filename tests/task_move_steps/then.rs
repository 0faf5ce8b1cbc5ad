//! Then steps for task move BDD scenarios.

use super::world::{TaskMoveWorld, run_async};
use rstest_bdd_macros::then;
use taskboard::board::{
    domain::{ActionItemFilter, TaskStatus},
    services::BoardServiceError,
};

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskMoveWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let actual = world.task()?.status();
    if actual != expected {
        return Err(eyre::eyre!("expected status {expected}, found {actual}"));
    }
    Ok(())
}

#[then("the task has {count:usize} open action item")]
fn open_action_items(world: &TaskMoveWorld, count: usize) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let items = run_async(
        world
            .action_items
            .list(task_id, ActionItemFilter::default()),
    )
    .map_err(|err| eyre::eyre!("list action items: {err}"))?;
    if items.len() != count {
        return Err(eyre::eyre!(
            "expected {count} open action items, found {}",
            items.len()
        ));
    }
    Ok(())
}

#[then("the move is refused for lack of permission")]
fn move_refused(world: &TaskMoveWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_move
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move result"))?;
    if !matches!(result, Err(BoardServiceError::PermissionDenied { .. })) {
        return Err(eyre::eyre!("expected PermissionDenied, got {result:?}"));
    }
    Ok(())
}

#[then(r#"a session is spawned for agent "{agent_id}""#)]
fn session_spawned(world: &TaskMoveWorld, agent_id: String) -> Result<(), eyre::Report> {
    let spawned = world.coordinator.spawned();
    if !spawned
        .iter()
        .any(|request| request.agent_id.as_str() == agent_id)
    {
        return Err(eyre::eyre!("no session spawned for {agent_id}: {spawned:?}"));
    }
    Ok(())
}

#[then("the task is bound to a session")]
fn task_bound(world: &TaskMoveWorld) -> Result<(), eyre::Report> {
    if world.task()?.agent_session_key().is_none() {
        return Err(eyre::eyre!("expected a bound session"));
    }
    Ok(())
}

#[then("the task has no bound session")]
fn task_unbound(world: &TaskMoveWorld) -> Result<(), eyre::Report> {
    if let Some(key) = world.task()?.agent_session_key() {
        return Err(eyre::eyre!("expected no bound session, found {}", key.as_str()));
    }
    Ok(())
}

#[then("the released session was told the task is done")]
fn released_session_told(world: &TaskMoveWorld) -> Result<(), eyre::Report> {
    let released = world
        .released_session
        .as_deref()
        .ok_or_else(|| eyre::eyre!("no session was bound before completion"))?;
    let told = world.coordinator.sent().iter().any(|delivered| {
        delivered.session_key.as_str() == released && delivered.message.contains("marked as Done")
    });
    if !told {
        return Err(eyre::eyre!("no completion notice sent to {released}"));
    }
    Ok(())
}
