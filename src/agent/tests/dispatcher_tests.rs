//! Mention dispatch, reply forwarding and coordinator notification.

use std::sync::Arc;

use crate::agent::{
    adapters::InMemorySessionCoordinator,
    domain::SessionCleanup,
    ports::{MockSessionCoordinator, SessionCoordinatorError},
    services::CommentDispatch,
};
use crate::board::{
    domain::{Task, TaskStatus},
    ports::CommentRepository,
    services::{CommentService, MoveTaskRequest, PostedComment},
};
use crate::test_support::TestBoard;
use rstest::{fixture, rstest};

#[fixture]
fn board() -> TestBoard {
    TestBoard::new()
}

async fn post(board: &TestBoard, task: &Task, agent: &str, content: &str) -> PostedComment {
    CommentService::new(board.runtime.clone())
        .add_comment(task.id(), agent, content)
        .await
        .expect("comment accepted")
}

/// Moves the task into progress and waits for its session to be bound.
async fn working(board: &TestBoard, title: &str) -> Task {
    let task = board.task(title, "Architect").await;
    board
        .lifecycle()
        .move_task(task.id(), MoveTaskRequest::new(TaskStatus::InProgress))
        .await
        .expect("move succeeds");
    board.settle().await;
    board.reload(task.id()).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mentions_spawn_review_sessions_except_for_the_author(board: TestBoard) {
    let task = board.task("API design", "Architect").await;

    let posted = post(
        &board,
        &task,
        "Architect",
        "@Architect notes done, @code reviewer and @Jarvis please check. cc @Code Reviewer",
    )
    .await;
    board.settle().await;

    assert_eq!(posted.dispatch.mentioned, vec!["Code Reviewer", "Jarvis"]);
    assert!(!posted.dispatch.forwarded);
    assert!(!posted.dispatch.notified);

    let mut labels: Vec<(String, SessionCleanup)> = board
        .coordinator
        .spawned()
        .into_iter()
        .map(|request| (request.label, request.cleanup))
        .collect();
    labels.sort_by(|left, right| left.0.cmp(&right.0));
    assert_eq!(
        labels,
        vec![
            (
                format!("task-{}-mention-code-reviewer", task.id()),
                SessionCleanup::Delete
            ),
            (format!("task-{}-mention-main", task.id()), SessionCleanup::Delete),
        ]
    );

    let notes: Vec<String> = board
        .store
        .list_comments(task.id())
        .await
        .expect("comments readable")
        .into_iter()
        .filter(|comment| comment.agent == "System")
        .map(|comment| comment.content)
        .collect();
    assert_eq!(notes.len(), 2);
    assert!(notes.contains(
        &"📢 **Code Reviewer** was tagged by Architect and is now reviewing this task.".to_owned()
    ));
    assert_eq!(board.reload(task.id()).await.agent_session_key(), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mention_prompts_carry_prior_comments(board: TestBoard) {
    let task = board.task("Context", "Architect").await;
    post(&board, &task, "User", "first thought").await;
    post(&board, &task, "User", "@Code Reviewer what do you think?").await;
    board.settle().await;

    let spawned = board.coordinator.spawned();
    let prompt = &spawned.first().expect("one spawn").prompt;
    assert!(prompt.contains("**User:** first thought"));
    assert!(!prompt.contains("**User:** @Code Reviewer"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn supervisor_replies_reach_the_bound_session(board: TestBoard) {
    let task = working(&board, "Bound").await;

    let posted = post(&board, &task, "User", "Please also cover retries.").await;
    board.settle().await;

    assert!(posted.dispatch.forwarded);
    assert!(!posted.dispatch.notified);
    let sent = board.coordinator.sent();
    let delivered = sent.first().expect("one delivery");
    assert_eq!(delivered.session_key.as_str(), "agent:architect:subagent:1");
    assert!(
        delivered
            .message
            .starts_with(&format!("💬 **User replied on Task #{}:**", task.id()))
    );
    assert!(delivered.message.contains("Please also cover retries."));
    assert_eq!(board.coordinator.spawned().len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refused_replies_start_a_follow_up_session(board: TestBoard) {
    let task = working(&board, "Expired").await;
    board.coordinator.reject_messages(true);

    post(&board, &task, "User", "Still there?").await;
    board.settle().await;

    let spawned = board.coordinator.spawned();
    assert_eq!(spawned.len(), 2);
    let followup = spawned.last().expect("follow-up spawn");
    assert_eq!(followup.label, format!("task-{}-followup", task.id()));
    assert_eq!(followup.cleanup, SessionCleanup::Keep);
    assert!(followup.prompt.contains("Still there?"));
    assert_eq!(
        board
            .reload(task.id())
            .await
            .agent_session_key()
            .map(|key| key.as_str().to_owned()),
        Some("agent:architect:subagent:2".to_owned())
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn replies_to_unbound_review_tasks_spawn_a_follow_up(board: TestBoard) {
    let task = board.task("Unbound", "Architect").await;
    board
        .lifecycle()
        .move_task(task.id(), MoveTaskRequest::new(TaskStatus::Review))
        .await
        .expect("move succeeds");

    let posted = post(&board, &task, "User", "Looks good, one question").await;
    board.settle().await;

    assert!(posted.dispatch.forwarded);
    assert!(board.coordinator.sent().is_empty());
    let spawned = board.coordinator.spawned();
    assert_eq!(
        spawned.first().map(|request| request.label.clone()),
        Some(format!("task-{}-followup", task.id()))
    );
}

#[rstest]
#[case(TaskStatus::Backlog)]
#[case(TaskStatus::Blocked)]
#[tokio::test(flavor = "multi_thread")]
async fn replies_on_idle_tasks_are_not_forwarded(board: TestBoard, #[case] status: TaskStatus) {
    let task = board.task("Idle", "Architect").await;
    board
        .lifecycle()
        .move_task(task.id(), MoveTaskRequest::new(status))
        .await
        .expect("move succeeds");

    let posted = post(&board, &task, "User", "noted").await;
    board.settle().await;

    assert!(!posted.dispatch.forwarded);
    assert!(board.coordinator.spawned().is_empty());
    assert!(board.coordinator.sent().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outside_authors_wake_the_coordinator(board: TestBoard) {
    let task = board.task("Public", "Architect").await;
    let long = "x".repeat(250);

    let posted = post(&board, &task, "Visitor", &long).await;
    board.settle().await;

    assert!(posted.dispatch.notified);
    let notifications = board.coordinator.notifications();
    let text = notifications.first().expect("one notification");
    assert!(text.starts_with(&format!(
        "💬 Task Board: New comment on #{} (Public) from Visitor:",
        task.id()
    )));
    assert!(text.contains(&format!("{}...", "x".repeat(200))));
    assert!(!text.contains(&"x".repeat(201)));
    assert!(text.ends_with("Check and respond: http://localhost:8080"));
}

#[rstest]
#[case("System")]
#[case("Code Reviewer")]
#[tokio::test(flavor = "multi_thread")]
async fn known_authors_trigger_nothing_without_mentions(
    board: TestBoard,
    #[case] author: &str,
) {
    let task = working(&board, "Quiet").await;

    let posted = post(&board, &task, author, "status update").await;
    board.settle().await;

    assert_eq!(posted.dispatch, CommentDispatch::default());
    assert!(board.coordinator.sent().is_empty());
    assert!(board.coordinator.notifications().is_empty());
    assert_eq!(
        board.viewer.event_types().last().map(String::as_str),
        Some("comment_added")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unavailable_orchestration_only_reaches_the_failure_log() {
    let mut coordinator = MockSessionCoordinator::new();
    coordinator
        .expect_spawn_session()
        .times(1)
        .returning(|_| Err(SessionCoordinatorError::Unavailable));
    let board = TestBoard::with_coordinator(
        InMemorySessionCoordinator::new(),
        Arc::new(coordinator),
    );
    let task = board.task("Offline", "Architect").await;

    let posted = post(&board, &task, "Architect", "@Jarvis are you there?").await;
    board.settle().await;

    assert_eq!(posted.dispatch.mentioned, vec!["Jarvis"]);
    let failures = board.runtime.effects().failures();
    assert_eq!(failures.len(), 1);
    assert!(
        failures
            .first()
            .is_some_and(|failure| failure.reason == "agent orchestration is unavailable")
    );
    let comments = board
        .store
        .list_comments(task.id())
        .await
        .expect("comments readable");
    assert_eq!(comments.len(), 1);
}
