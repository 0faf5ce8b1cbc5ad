//! Action item endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use mockable::Clock;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiResult, AppState};
use crate::board::{
    domain::{
        ActionItem, ActionItemFilter, ActionItemId, ActionItemType, BoardDomainError, CommentId,
        TaskId,
    },
    ports::BoardStore,
    services::CreateActionItemRequest,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ListParams {
    resolved: bool,
    archived: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateBody {
    agent: String,
    content: String,
    item_type: Option<String>,
    comment_id: Option<i64>,
}

pub(super) async fn list<S, C>(
    State(state): State<AppState<S, C>>,
    Path(task_id): Path<i64>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<ActionItem>>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let filter = ActionItemFilter {
        resolved: params.resolved,
        archived: params.archived,
    };
    Ok(Json(
        state
            .action_items
            .list(TaskId::new(task_id), filter)
            .await?,
    ))
}

pub(super) async fn create<S, C>(
    State(state): State<AppState<S, C>>,
    Path(task_id): Path<i64>,
    Json(body): Json<CreateBody>,
) -> ApiResult<Json<ActionItem>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let item_type = match body.item_type.as_deref() {
        Some(raw) => ActionItemType::try_from(raw).map_err(BoardDomainError::from)?,
        None => ActionItemType::Question,
    };
    let request = CreateActionItemRequest {
        agent: body.agent,
        content: body.content,
        item_type,
        comment_id: body.comment_id.map(CommentId::new),
    };
    Ok(Json(
        state
            .action_items
            .create(TaskId::new(task_id), request)
            .await?,
    ))
}

fn acknowledged(item: &ActionItem) -> Json<Value> {
    Json(json!({ "success": true, "item_id": item.id }))
}

pub(super) async fn resolve<S, C>(
    State(state): State<AppState<S, C>>,
    Path(item_id): Path<i64>,
) -> ApiResult<Json<Value>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let item = state
        .action_items
        .resolve(ActionItemId::new(item_id))
        .await?;
    Ok(acknowledged(&item))
}

pub(super) async fn archive<S, C>(
    State(state): State<AppState<S, C>>,
    Path(item_id): Path<i64>,
) -> ApiResult<Json<Value>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let item = state
        .action_items
        .archive(ActionItemId::new(item_id))
        .await?;
    Ok(acknowledged(&item))
}

pub(super) async fn unarchive<S, C>(
    State(state): State<AppState<S, C>>,
    Path(item_id): Path<i64>,
) -> ApiResult<Json<Value>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let item = state
        .action_items
        .unarchive(ActionItemId::new(item_id))
        .await?;
    Ok(acknowledged(&item))
}

pub(super) async fn delete<S, C>(
    State(state): State<AppState<S, C>>,
    Path(item_id): Path<i64>,
) -> ApiResult<Json<Value>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let item = state
        .action_items
        .delete(ActionItemId::new(item_id))
        .await?;
    Ok(acknowledged(&item))
}
