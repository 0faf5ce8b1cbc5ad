//! `PostgreSQL` store tests.
//!
//! These run against the database named by `TASKBOARD_TEST_DATABASE_URL` and
//! return early when it is unset. Each test works on its own board so runs
//! against a shared database do not interfere.
#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use taskboard::{
    agent::adapters::InMemorySessionCoordinator,
    board::{
        adapters::postgres::PostgresBoardStore,
        domain::{ActionItemFilter, ActivityAction, NewTask, TaskPriority, TaskStatus},
        ports::{
            ActivityRepository, BoardStoreError, CommentRepository, TaskCommit, TaskFilter,
            TaskRepository,
        },
        services::{
            ActionItemService, BoardRuntime, CommentService, CreateTaskRequest, MoveTaskRequest,
            TaskLifecycleService,
        },
    },
    config::BoardConfig,
    effects::DetachedEffects,
};
use uuid::Uuid;

const DATABASE_URL_VAR: &str = "TASKBOARD_TEST_DATABASE_URL";

struct PreparedStore {
    store: Arc<PostgresBoardStore>,
    board: String,
}

#[fixture]
async fn prepared() -> Option<PreparedStore> {
    let url = std::env::var(DATABASE_URL_VAR).ok()?;
    let store = PostgresBoardStore::connect(&url, 2).expect("pool builds");
    store.ensure_schema().await.expect("schema applies");
    Some(PreparedStore {
        store: Arc::new(store),
        board: format!("test-{}", Uuid::new_v4()),
    })
}

fn runtime(store: &Arc<PostgresBoardStore>) -> BoardRuntime<PostgresBoardStore, DefaultClock> {
    let roster = BoardConfig::default()
        .agent_roster()
        .expect("default roster is valid");
    BoardRuntime::new(Arc::clone(store), Arc::new(DefaultClock), Arc::new(roster))
        .with_coordinator(Arc::new(InMemorySessionCoordinator::new()))
        .with_effects(Arc::new(DetachedEffects::new(StdDuration::from_secs(5), 16)))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moves_persist_items_and_activity(#[future] prepared: Option<PreparedStore>) {
    let Some(PreparedStore { store, board }) = prepared.await else {
        return;
    };
    let runtime = runtime(&store);
    let lifecycle = TaskLifecycleService::new(runtime.clone());
    let task = lifecycle
        .create(
            CreateTaskRequest::new("Threat model")
                .with_agent("Architect")
                .with_board(board.as_str()),
        )
        .await
        .expect("task created");

    let outcome = lifecycle
        .move_task(task.id(), MoveTaskRequest::new(TaskStatus::Review))
        .await
        .expect("move succeeds");

    assert_eq!(outcome.task.status(), TaskStatus::Review);
    let items = ActionItemService::new(runtime.clone())
        .list(task.id(), ActionItemFilter::default())
        .await
        .expect("items readable");
    assert_eq!(items.len(), 1);
    let listed = store
        .list_tasks(&TaskFilter::new(board.as_str()))
        .await
        .expect("tasks readable");
    assert_eq!(listed.len(), 1);
    let actions: Vec<ActivityAction> = store
        .task_activity(task.id())
        .await
        .expect("activity readable")
        .into_iter()
        .map(|entry| entry.action)
        .collect();
    assert_eq!(actions, vec![ActivityAction::Created, ActivityAction::Moved]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_cascades_comments(#[future] prepared: Option<PreparedStore>) {
    let Some(PreparedStore { store, board }) = prepared.await else {
        return;
    };
    let runtime = runtime(&store);
    let lifecycle = TaskLifecycleService::new(runtime.clone());
    let task = lifecycle
        .create(CreateTaskRequest::new("Scratch").with_board(board.as_str()))
        .await
        .expect("task created");
    CommentService::new(runtime.clone())
        .add_comment(task.id(), "User", "temporary note")
        .await
        .expect("comment stored");

    lifecycle.delete(task.id()).await.expect("delete succeeds");

    assert!(store.find_task(task.id()).await.expect("readable").is_none());
    assert!(
        store
            .list_comments(task.id())
            .await
            .expect("readable")
            .is_empty()
    );
    assert!(
        !store
            .task_activity(task.id())
            .await
            .expect("readable")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_commits_are_refused(#[future] prepared: Option<PreparedStore>) {
    let Some(PreparedStore { store, board }) = prepared.await else {
        return;
    };
    let task = store
        .insert_task(NewTask {
            title: "Versioned".to_owned(),
            description: String::new(),
            status: TaskStatus::Backlog,
            priority: TaskPriority::Medium,
            agent: "Architect".to_owned(),
            due_date: None,
            board,
            source_file: None,
            source_ref: None,
            created_at: Utc::now(),
        })
        .await
        .expect("task stored");
    let stale = task.updated_at() - Duration::seconds(1);

    let err = store
        .commit_task(TaskCommit::new(task.clone(), stale))
        .await
        .expect_err("stale write refused");
    assert!(matches!(err, BoardStoreError::Conflict(id) if id == task.id()));

    store
        .commit_task(TaskCommit::new(task.clone(), task.updated_at()))
        .await
        .expect("current write accepted");
}
