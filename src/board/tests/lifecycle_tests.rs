//! Task creation, editing, deletion and work indicator tests.

use crate::board::{
    domain::{
        ActivityAction, BoardDomainError, DEFAULT_BOARD, Task, TaskChanges, TaskId, TaskPriority,
        TaskStatus,
    },
    ports::{ActivityRepository, CommentRepository, TaskFilter},
    services::{BoardServiceError, CreateTaskRequest, MoveTaskRequest},
};
use crate::test_support::TestBoard;
use rstest::{fixture, rstest};

#[fixture]
fn board() -> TestBoard {
    TestBoard::new()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_applies_defaults_and_logs_activity(board: TestBoard) {
    let task = board
        .lifecycle()
        .create(CreateTaskRequest::new("  Audit login flow  "))
        .await
        .expect("creation should succeed");

    assert_eq!(task.title(), "Audit login flow");
    assert_eq!(task.status(), TaskStatus::Backlog);
    assert_eq!(task.priority(), TaskPriority::Medium);
    assert_eq!(task.agent(), "Unassigned");
    assert_eq!(task.board(), DEFAULT_BOARD);
    assert_eq!(task.created_at(), task.updated_at());

    let history = board
        .store
        .task_activity(task.id())
        .await
        .expect("activity readable");
    assert_eq!(history.len(), 1);
    let entry = history.first().expect("one entry");
    assert_eq!(entry.action, ActivityAction::Created);
    assert_eq!(entry.details, "Created: Audit login flow");
    assert_eq!(board.viewer.event_types(), vec!["task_created"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assignees_are_resolved_to_roster_spelling(board: TestBoard) {
    let task = board.task("Review schema", "architect").await;
    assert_eq!(task.agent(), "Architect");

    let supervised = board.task("Sign off", "user").await;
    assert_eq!(supervised.agent(), "User");
}

#[rstest]
#[case("   ", None, BoardDomainError::EmptyTitle)]
#[case("Valid", Some("Ghost"), BoardDomainError::UnknownAgent("Ghost".to_owned()))]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_creations_are_rejected_without_writes(
    board: TestBoard,
    #[case] title: &str,
    #[case] agent: Option<&str>,
    #[case] expected: BoardDomainError,
) {
    let mut request = CreateTaskRequest::new(title);
    if let Some(name) = agent {
        request = request.with_agent(name);
    }

    let err = board
        .lifecycle()
        .create(request)
        .await
        .expect_err("creation should fail");

    assert!(matches!(err, BoardServiceError::Validation(inner) if inner == expected));
    let tasks = board
        .lifecycle()
        .list(&TaskFilter::new(DEFAULT_BOARD))
        .await
        .expect("listing works");
    assert!(tasks.is_empty());
    assert!(board.viewer.frames().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_summarises_only_changed_fields(board: TestBoard) {
    let task = board.task("Draft plan", "Architect").await;

    let updated = board
        .lifecycle()
        .update(
            task.id(),
            TaskChanges {
                title: Some("Draft plan".to_owned()),
                priority: Some(TaskPriority::High),
                description: Some("Outline milestones".to_owned()),
                ..TaskChanges::default()
            },
            Some("Architect"),
        )
        .await
        .expect("update should succeed");

    assert_eq!(updated.priority(), TaskPriority::High);
    assert_eq!(updated.description(), "Outline milestones");
    let history = board
        .store
        .task_activity(task.id())
        .await
        .expect("activity readable");
    let entry = history.last().expect("update entry");
    assert_eq!(entry.action, ActivityAction::Updated);
    assert_eq!(
        entry.details,
        "description:  → Outline milestones; priority: Medium → High"
    );
    assert_eq!(entry.agent.as_deref(), Some("Architect"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_without_effective_changes_writes_nothing(board: TestBoard) {
    let task = board.task("Steady", "Architect").await;

    let unchanged = board
        .lifecycle()
        .update(
            task.id(),
            TaskChanges {
                title: Some("Steady".to_owned()),
                agent: Some("architect".to_owned()),
                ..TaskChanges::default()
            },
            None,
        )
        .await
        .expect("no-op update should succeed");

    assert_eq!(unchanged.updated_at(), task.updated_at());
    let history = board
        .store
        .task_activity(task.id())
        .await
        .expect("activity readable");
    assert_eq!(history.len(), 1);
    assert_eq!(board.viewer.event_types(), vec!["task_created"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_to_done_requires_the_supervisor(board: TestBoard) {
    let task = board.task("Ship it", "Architect").await;
    let to_done = TaskChanges {
        status: Some(TaskStatus::Done),
        ..TaskChanges::default()
    };

    let err = board
        .lifecycle()
        .update(task.id(), to_done.clone(), Some("Architect"))
        .await
        .expect_err("agents may not finish tasks");
    assert!(matches!(err, BoardServiceError::PermissionDenied { .. }));

    let done = board
        .lifecycle()
        .update(task.id(), to_done, Some("User"))
        .await
        .expect("supervisor may finish tasks");
    assert_eq!(done.status(), TaskStatus::Done);
    assert_eq!(done.working_agent(), None);
    assert_eq!(done.agent_session_key(), None);

    board.settle().await;
    assert!(board.coordinator.sent().is_empty());
    assert!(board.coordinator.spawned().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_rejects_blank_titles_and_unknown_agents(board: TestBoard) {
    let task = board.task("Named", "Architect").await;

    let blank = board
        .lifecycle()
        .update(
            task.id(),
            TaskChanges {
                title: Some("  ".to_owned()),
                ..TaskChanges::default()
            },
            None,
        )
        .await;
    assert!(matches!(
        blank,
        Err(BoardServiceError::Validation(BoardDomainError::EmptyTitle))
    ));

    let unknown = board
        .lifecycle()
        .update(
            task.id(),
            TaskChanges {
                agent: Some("Nobody".to_owned()),
                ..TaskChanges::default()
            },
            None,
        )
        .await;
    assert!(matches!(
        unknown,
        Err(BoardServiceError::Validation(BoardDomainError::UnknownAgent(_)))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_cascades_records_but_keeps_activity(board: TestBoard) {
    let task = board.task("Temporary", "Architect").await;
    board
        .runtime
        .post_system_comment(task.id(), "note".to_owned())
        .await
        .expect("comment stored");
    board
        .lifecycle()
        .move_task(task.id(), MoveTaskRequest::new(TaskStatus::Blocked))
        .await
        .expect("move succeeds");

    let deleted = board
        .lifecycle()
        .delete(task.id())
        .await
        .expect("delete succeeds");

    assert_eq!(deleted.id(), task.id());
    assert!(matches!(
        board.lifecycle().get(task.id()).await,
        Err(BoardServiceError::TaskNotFound(_))
    ));
    assert!(
        board
            .store
            .list_comments(task.id())
            .await
            .expect("comments readable")
            .is_empty()
    );
    let actions: Vec<ActivityAction> = board
        .store
        .task_activity(task.id())
        .await
        .expect("activity readable")
        .into_iter()
        .map(|entry| entry.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            ActivityAction::Created,
            ActivityAction::Moved,
            ActivityAction::Deleted
        ]
    );
    assert_eq!(
        board.viewer.event_types().last().map(String::as_str),
        Some("task_deleted")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_missing_task_reports_not_found(board: TestBoard) {
    let err = board
        .lifecycle()
        .delete(TaskId::new(404))
        .await
        .expect_err("nothing to delete");
    assert!(matches!(err, BoardServiceError::TaskNotFound(id) if id.value() == 404));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listings_order_by_priority_then_age(board: TestBoard) {
    let lifecycle = board.lifecycle();
    let ranked = |title: &str, priority: TaskPriority| {
        CreateTaskRequest::new(title)
            .with_priority(priority)
            .with_agent("Architect")
    };
    let low = lifecycle
        .create(ranked("low", TaskPriority::Low))
        .await
        .expect("created");
    let first_high = lifecycle
        .create(ranked("high one", TaskPriority::High))
        .await
        .expect("created");
    let second_high = lifecycle
        .create(ranked("high two", TaskPriority::High))
        .await
        .expect("created");
    let blocked = lifecycle
        .create(ranked("stuck", TaskPriority::Critical).with_status(TaskStatus::Blocked))
        .await
        .expect("created");
    lifecycle
        .create(CreateTaskRequest::new("elsewhere").with_board("ops"))
        .await
        .expect("created");

    let board_ids: Vec<_> = lifecycle
        .list(&TaskFilter::new(DEFAULT_BOARD))
        .await
        .expect("listing works")
        .iter()
        .map(Task::id)
        .collect();
    assert_eq!(
        board_ids,
        vec![blocked.id(), second_high.id(), first_high.id(), low.id()]
    );

    let queue_ids: Vec<_> = lifecycle
        .agent_tasks("Architect")
        .await
        .expect("queue works")
        .iter()
        .map(Task::id)
        .collect();
    assert_eq!(queue_ids, vec![first_high.id(), second_high.id(), low.id()]);

    let filtered = lifecycle
        .list(&TaskFilter::new(DEFAULT_BOARD).with_status(TaskStatus::Blocked))
        .await
        .expect("listing works");
    assert_eq!(filtered.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn work_indicator_round_trip(board: TestBoard) {
    let task = board.task("Indicator", "Architect").await;

    let started = board
        .lifecycle()
        .start_work(task.id(), " Architect ")
        .await
        .expect("start succeeds");
    assert_eq!(started.working_agent(), Some("Architect"));

    let stopped = board
        .lifecycle()
        .stop_work(task.id())
        .await
        .expect("stop succeeds");
    assert_eq!(stopped.working_agent(), None);

    let idle = board
        .lifecycle()
        .stop_work(task.id())
        .await
        .expect("stopping an idle task succeeds");
    assert_eq!(idle.updated_at(), stopped.updated_at());
    assert_eq!(
        board.viewer.event_types(),
        vec!["task_created", "work_started", "work_stopped"]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn start_work_rejects_blank_agents(board: TestBoard) {
    let task = board.task("Indicator", "Architect").await;
    let err = board
        .lifecycle()
        .start_work(task.id(), "  ")
        .await
        .expect_err("blank agent");
    assert!(matches!(
        err,
        BoardServiceError::Validation(BoardDomainError::EmptyAgentName)
    ));
}
