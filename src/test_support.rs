//! Shared fixtures for unit tests: a board over in-memory adapters with a
//! recording viewer and a recording session coordinator.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;

use crate::agent::{
    adapters::InMemorySessionCoordinator,
    domain::{AgentRoster, ExternalAgentId, RosterAgent},
    ports::SessionCoordinator,
};
use crate::board::{
    adapters::memory::InMemoryBoardStore,
    domain::{Task, TaskId},
    services::{BoardRuntime, CreateTaskRequest, TaskLifecycleService},
};
use crate::effects::DetachedEffects;
use crate::live::{adapters::RecordingChannel, services::Broadcaster};

pub(crate) type TestRuntime = BoardRuntime<InMemoryBoardStore, DefaultClock>;

/// Roster used across unit tests: Jarvis (main), Architect, Code Reviewer,
/// with `User` supervising and `System` authoring automated comments.
pub(crate) fn roster() -> AgentRoster {
    let agent = |name: &str, id: &str| {
        RosterAgent::new(
            name,
            ExternalAgentId::new(id).expect("valid agent id"),
            format!("You are the {name}."),
        )
        .expect("valid roster agent")
    };
    AgentRoster::new(
        vec![
            agent("Jarvis", "main"),
            agent("Architect", "architect"),
            agent("Code Reviewer", "code-reviewer"),
        ],
        "User",
        "System",
    )
    .expect("valid roster")
}

/// A board wired to recording adapters.
pub(crate) struct TestBoard {
    pub(crate) store: Arc<InMemoryBoardStore>,
    pub(crate) coordinator: InMemorySessionCoordinator,
    pub(crate) viewer: RecordingChannel,
    pub(crate) runtime: TestRuntime,
}

impl TestBoard {
    pub(crate) fn new() -> Self {
        let coordinator = InMemorySessionCoordinator::new();
        Self::with_coordinator(coordinator.clone(), Arc::new(coordinator))
    }

    /// Builds a board whose runtime talks to `port` while `recorder` is kept
    /// for assertions.
    pub(crate) fn with_coordinator(
        recorder: InMemorySessionCoordinator,
        port: Arc<dyn SessionCoordinator>,
    ) -> Self {
        let store = Arc::new(InMemoryBoardStore::new());
        let viewer = RecordingChannel::new();
        let broadcaster = Arc::new(Broadcaster::new());
        broadcaster.connect(Arc::new(viewer.clone()));
        let runtime = BoardRuntime::new(
            Arc::clone(&store),
            Arc::new(DefaultClock),
            Arc::new(roster()),
        )
        .with_broadcaster(broadcaster)
        .with_coordinator(port)
        .with_effects(Arc::new(DetachedEffects::new(Duration::from_secs(5), 32)));
        Self {
            store,
            coordinator: recorder,
            viewer,
            runtime,
        }
    }

    pub(crate) fn lifecycle(&self) -> TaskLifecycleService<InMemoryBoardStore, DefaultClock> {
        TaskLifecycleService::new(self.runtime.clone())
    }

    /// Creates a backlog task assigned to `agent`.
    pub(crate) async fn task(&self, title: &str, agent: &str) -> Task {
        self.lifecycle()
            .create(CreateTaskRequest::new(title).with_agent(agent))
            .await
            .expect("task creation should succeed")
    }

    /// Waits for every scheduled secondary effect.
    pub(crate) async fn settle(&self) {
        self.runtime.effects().settle().await;
    }

    pub(crate) async fn reload(&self, task_id: TaskId) -> Task {
        self.lifecycle()
            .get(task_id)
            .await
            .expect("task should exist")
    }
}
