//! Shared world state for task move BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::{
    agent::adapters::InMemorySessionCoordinator,
    board::{
        adapters::memory::InMemoryBoardStore,
        domain::Task,
        services::{
            ActionItemService, BoardRuntime, BoardServiceError, MoveOutcome, TaskLifecycleService,
        },
    },
    config::BoardConfig,
    effects::DetachedEffects,
};

/// Lifecycle service type used by the BDD world.
pub type TestLifecycle = TaskLifecycleService<InMemoryBoardStore, DefaultClock>;

/// Scenario world for task move behaviour tests.
pub struct TaskMoveWorld {
    pub runtime: BoardRuntime<InMemoryBoardStore, DefaultClock>,
    pub lifecycle: TestLifecycle,
    pub action_items: ActionItemService<InMemoryBoardStore, DefaultClock>,
    pub coordinator: InMemorySessionCoordinator,
    pub task: Option<Task>,
    pub released_session: Option<String>,
    pub last_move: Option<Result<MoveOutcome, BoardServiceError>>,
}

impl TaskMoveWorld {
    /// Creates a board over in-memory adapters with the default roster.
    #[must_use]
    pub fn new() -> Self {
        let roster = BoardConfig::default()
            .agent_roster()
            .expect("default roster is valid");
        let coordinator = InMemorySessionCoordinator::new();
        let runtime = BoardRuntime::new(
            Arc::new(InMemoryBoardStore::new()),
            Arc::new(DefaultClock),
            Arc::new(roster),
        )
        .with_coordinator(Arc::new(coordinator.clone()))
        .with_effects(Arc::new(DetachedEffects::new(Duration::from_secs(5), 16)));

        Self {
            lifecycle: TaskLifecycleService::new(runtime.clone()),
            action_items: ActionItemService::new(runtime.clone()),
            runtime,
            coordinator,
            task: None,
            released_session: None,
            last_move: None,
        }
    }

    /// Returns the scenario task.
    ///
    /// # Errors
    ///
    /// Fails when no task has been created yet.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for TaskMoveWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskMoveWorld {
    TaskMoveWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
