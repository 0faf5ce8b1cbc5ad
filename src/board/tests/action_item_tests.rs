//! Action item visibility and state changes.

use crate::board::{
    domain::{
        ActionItem, ActionItemFilter, ActionItemId, ActionItemType, BoardDomainError, TaskId,
    },
    services::{ActionItemService, BoardServiceError, CreateActionItemRequest},
};
use crate::test_support::TestBoard;
use rstest::{fixture, rstest};

#[fixture]
fn board() -> TestBoard {
    TestBoard::new()
}

fn question(agent: &str, content: &str) -> CreateActionItemRequest {
    CreateActionItemRequest {
        agent: agent.to_owned(),
        content: content.to_owned(),
        item_type: ActionItemType::Question,
        comment_id: None,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resolution_and_archiving_are_independent(board: TestBoard) {
    let task = board.task("Questions", "Architect").await;
    let items = ActionItemService::new(board.runtime.clone());
    let open = items
        .create(task.id(), question("Architect", "Which region?"))
        .await
        .expect("created");
    let resolved = items
        .create(task.id(), question("Architect", "Which port?"))
        .await
        .expect("created");
    let shelved = items
        .create(task.id(), question("Architect", "Which cipher?"))
        .await
        .expect("created");

    let after_resolve = items.resolve(resolved.id).await.expect("resolve works");
    assert!(after_resolve.resolved);
    assert!(after_resolve.resolved_at.is_some());
    items.resolve(shelved.id).await.expect("resolve works");
    items.archive(shelved.id).await.expect("archive works");

    let ids = |list: Vec<ActionItem>| -> Vec<ActionItemId> {
        list.into_iter().map(|item| item.id).collect()
    };
    let unresolved = items
        .list(task.id(), ActionItemFilter::default())
        .await
        .expect("listing works");
    assert_eq!(ids(unresolved), vec![open.id]);
    let done = items
        .list(
            task.id(),
            ActionItemFilter {
                resolved: true,
                archived: false,
            },
        )
        .await
        .expect("listing works");
    assert_eq!(ids(done), vec![resolved.id]);
    let archived = items
        .list(
            task.id(),
            ActionItemFilter {
                resolved: false,
                archived: true,
            },
        )
        .await
        .expect("listing works");
    assert_eq!(ids(archived), vec![shelved.id]);

    let restored = items.unarchive(shelved.id).await.expect("unarchive works");
    assert!(restored.resolved);
    assert!(!restored.archived);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn every_change_is_broadcast(board: TestBoard) {
    let task = board.task("Events", "Architect").await;
    let items = ActionItemService::new(board.runtime.clone());
    let item = items
        .create(task.id(), question("Architect", "Proceed?"))
        .await
        .expect("created");

    items.resolve(item.id).await.expect("resolve");
    items.archive(item.id).await.expect("archive");
    items.unarchive(item.id).await.expect("unarchive");
    let deleted = items.delete(item.id).await.expect("delete");

    assert_eq!(deleted.task_id, task.id());
    assert_eq!(
        board.viewer.event_types(),
        vec![
            "task_created",
            "action_item_added",
            "action_item_resolved",
            "action_item_archived",
            "action_item_unarchived",
            "action_item_deleted",
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_items_and_tasks_are_reported(board: TestBoard) {
    let items = ActionItemService::new(board.runtime.clone());

    let missing_item = items
        .resolve(ActionItemId::new(7))
        .await
        .expect_err("no such item");
    assert!(matches!(missing_item, BoardServiceError::ActionItemNotFound(_)));

    let missing_task = items
        .create(TaskId::new(7), question("Architect", "Anyone there?"))
        .await
        .expect_err("no such task");
    assert!(matches!(missing_task, BoardServiceError::TaskNotFound(_)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn authors_are_validated(board: TestBoard) {
    let task = board.task("Validation", "Architect").await;
    let items = ActionItemService::new(board.runtime.clone());

    let err = items
        .create(task.id(), question(" ", "Who wrote this?"))
        .await
        .expect_err("blank author");

    assert!(matches!(
        err,
        BoardServiceError::Validation(BoardDomainError::EmptyAgentName)
    ));
}
