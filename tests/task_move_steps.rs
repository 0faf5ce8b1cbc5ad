//! Behaviour tests for column moves and their side effects.
#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

#[path = "task_move_steps/mod.rs"]
mod task_move_steps_defs;

use rstest_bdd_macros::scenario;
use task_move_steps_defs::world::{TaskMoveWorld, world};

#[scenario(
    path = "tests/features/task_moves.feature",
    name = "Moving a task to review raises a completion item"
)]
#[tokio::test(flavor = "multi_thread")]
async fn review_raises_completion_item(world: TaskMoveWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_moves.feature",
    name = "Only the supervisor can complete a task"
)]
#[tokio::test(flavor = "multi_thread")]
async fn only_supervisor_completes(world: TaskMoveWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_moves.feature",
    name = "Starting work spawns a session for the assignee"
)]
#[tokio::test(flavor = "multi_thread")]
async fn in_progress_spawns_session(world: TaskMoveWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_moves.feature",
    name = "Completing a task releases the working session"
)]
#[tokio::test(flavor = "multi_thread")]
async fn done_releases_session(world: TaskMoveWorld) {
    let _ = world;
}
