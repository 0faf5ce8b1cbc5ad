//! In-memory store contract tests.

use chrono::{Duration, TimeZone, Utc};

use crate::board::{
    adapters::memory::InMemoryBoardStore,
    domain::{
        ActivityAction, CommentId, NewActivityEntry, NewComment, NewTask, Task, TaskId,
        TaskPriority, TaskStatus,
    },
    ports::{
        ActivityRepository, BoardStoreError, ChatRepository, CommentRepository, TaskCommit,
        TaskRepository,
    },
};
use rstest::{fixture, rstest};

#[fixture]
fn store() -> InMemoryBoardStore {
    InMemoryBoardStore::new()
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_owned(),
        description: String::new(),
        status: TaskStatus::Backlog,
        priority: TaskPriority::Medium,
        agent: "Architect".to_owned(),
        due_date: None,
        board: "tasks".to_owned(),
        source_file: None,
        source_ref: None,
        created_at: Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).single().expect("valid time"),
    }
}

async fn comment(store: &InMemoryBoardStore, task: &Task, content: &str) -> CommentId {
    store
        .insert_comment(NewComment {
            task_id: task.id(),
            agent: "User".to_owned(),
            content: content.to_owned(),
            created_at: Utc::now(),
        })
        .await
        .expect("comment stored")
        .id
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_commits_are_refused(store: InMemoryBoardStore) {
    let task = store.insert_task(new_task("Versioned")).await.expect("stored");
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

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commits_to_missing_tasks_report_not_found(store: InMemoryBoardStore) {
    let ghost = new_task("Ghost").into_task(TaskId::new(41));

    let err = store
        .commit_task(TaskCommit::new(ghost.clone(), ghost.updated_at()))
        .await
        .expect_err("nothing to update");

    assert!(matches!(err, BoardStoreError::TaskNotFound(_)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn identifiers_are_assigned_per_kind(store: InMemoryBoardStore) {
    let first = store.insert_task(new_task("one")).await.expect("stored");
    let second = store.insert_task(new_task("two")).await.expect("stored");
    let note = comment(&store, &first, "hello").await;

    assert_eq!(first.id(), TaskId::new(1));
    assert_eq!(second.id(), TaskId::new(2));
    assert_eq!(note, CommentId::new(1));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn recent_comments_skip_the_current_one(store: InMemoryBoardStore) {
    let task = store.insert_task(new_task("Thread")).await.expect("stored");
    comment(&store, &task, "first").await;
    comment(&store, &task, "second").await;
    comment(&store, &task, "third").await;
    let current = comment(&store, &task, "current").await;

    let context: Vec<String> = store
        .recent_comments(task.id(), 2, Some(current))
        .await
        .expect("readable")
        .into_iter()
        .map(|entry| entry.content)
        .collect();

    assert_eq!(context, vec!["second".to_owned(), "third".to_owned()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comments_need_an_existing_task(store: InMemoryBoardStore) {
    let err = store
        .insert_comment(NewComment {
            task_id: TaskId::new(3),
            agent: "User".to_owned(),
            content: "orphan".to_owned(),
            created_at: Utc::now(),
        })
        .await
        .expect_err("task missing");
    assert!(matches!(err, BoardStoreError::TaskNotFound(_)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activity_feed_is_newest_first(store: InMemoryBoardStore) {
    let base = Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).single().expect("valid time");
    for offset in 0..3 {
        store
            .append_activity(NewActivityEntry {
                task_id: TaskId::new(1),
                action: ActivityAction::Updated,
                agent: None,
                details: format!("change {offset}"),
                timestamp: base + Duration::minutes(offset),
            })
            .await
            .expect("appended");
    }

    let feed: Vec<String> = store
        .recent_activity(2)
        .await
        .expect("readable")
        .into_iter()
        .map(|entry| entry.details)
        .collect();

    assert_eq!(feed, vec!["change 2".to_owned(), "change 1".to_owned()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_sessions_can_be_forgotten(store: InMemoryBoardStore) {
    store
        .record_deleted_session("agent:b:subagent:2", Utc::now())
        .await
        .expect("recorded");
    store
        .record_deleted_session("agent:a:subagent:1", Utc::now())
        .await
        .expect("recorded");

    assert_eq!(
        store.deleted_sessions().await.expect("readable"),
        vec![
            "agent:a:subagent:1".to_owned(),
            "agent:b:subagent:2".to_owned()
        ]
    );

    store
        .forget_deleted_sessions(&["agent:a:subagent:1".to_owned()])
        .await
        .expect("forgotten");
    assert_eq!(
        store.deleted_sessions().await.expect("readable"),
        vec!["agent:b:subagent:2".to_owned()]
    );
}
