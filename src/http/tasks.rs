//! Task, work indicator and comment endpoints.

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
        BoardDomainError, Comment, DEFAULT_BOARD, Task, TaskChanges, TaskId, TaskPriority,
        TaskStatus, parse_due_date,
    },
    ports::{BoardStore, TaskFilter},
    services::{CreateTaskRequest, MoveTaskRequest},
};

#[derive(Debug, Deserialize)]
pub(super) struct ListParams {
    board: Option<String>,
    agent: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateBody {
    title: String,
    #[serde(default)]
    description: String,
    status: Option<String>,
    priority: Option<String>,
    agent: Option<String>,
    due_date: Option<String>,
    board: Option<String>,
    source_file: Option<String>,
    source_ref: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct UpdateBody {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    agent: Option<String>,
    due_date: Option<String>,
    source_file: Option<String>,
    source_ref: Option<String>,
    /// Identity performing the update, when it differs from the assignee.
    actor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MoveParams {
    status: String,
    agent: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StartWorkParams {
    agent: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommentBody {
    agent: String,
    content: String,
}

fn parse_status(value: &str) -> Result<TaskStatus, BoardDomainError> {
    Ok(TaskStatus::try_from(value)?)
}

fn parse_priority(value: &str) -> Result<TaskPriority, BoardDomainError> {
    Ok(TaskPriority::try_from(value)?)
}

pub(super) async fn list<S, C>(
    State(state): State<AppState<S, C>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Task>>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut filter = TaskFilter::new(params.board.as_deref().unwrap_or(DEFAULT_BOARD));
    if let Some(agent) = params.agent.filter(|agent| !agent.is_empty()) {
        filter = filter.with_agent(agent);
    }
    if let Some(status) = params.status.as_deref().filter(|status| !status.is_empty()) {
        filter = filter.with_status(parse_status(status)?);
    }
    Ok(Json(state.tasks.list(&filter).await?))
}

pub(super) async fn get<S, C>(
    State(state): State<AppState<S, C>>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<Task>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    Ok(Json(state.tasks.get(TaskId::new(task_id)).await?))
}

pub(super) async fn create<S, C>(
    State(state): State<AppState<S, C>>,
    Json(body): Json<CreateBody>,
) -> ApiResult<Json<Task>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut request = CreateTaskRequest::new(body.title)
        .with_description(body.description)
        .with_source(body.source_file, body.source_ref);
    if let Some(status) = body.status.as_deref() {
        request = request.with_status(parse_status(status)?);
    }
    if let Some(priority) = body.priority.as_deref() {
        request = request.with_priority(parse_priority(priority)?);
    }
    if let Some(agent) = body.agent {
        request = request.with_agent(agent);
    }
    if let Some(due_date) = body.due_date.as_deref().filter(|date| !date.is_empty()) {
        request = request.with_due_date(parse_due_date(due_date)?);
    }
    if let Some(board) = body.board {
        request = request.with_board(board);
    }
    Ok(Json(state.tasks.create(request).await?))
}

pub(super) async fn update<S, C>(
    State(state): State<AppState<S, C>>,
    Path(task_id): Path<i64>,
    Json(body): Json<UpdateBody>,
) -> ApiResult<Json<Task>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let changes = TaskChanges {
        title: body.title,
        description: body.description,
        status: body.status.as_deref().map(parse_status).transpose()?,
        priority: body.priority.as_deref().map(parse_priority).transpose()?,
        agent: body.agent,
        due_date: body.due_date.as_deref().map(parse_due_date).transpose()?,
        source_file: body.source_file,
        source_ref: body.source_ref,
    };
    let task = state
        .tasks
        .update(TaskId::new(task_id), changes, body.actor.as_deref())
        .await?;
    Ok(Json(task))
}

pub(super) async fn delete<S, C>(
    State(state): State<AppState<S, C>>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<Value>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task = state.tasks.delete(TaskId::new(task_id)).await?;
    Ok(Json(json!({ "status": "deleted", "id": task.id() })))
}

pub(super) async fn move_task<S, C>(
    State(state): State<AppState<S, C>>,
    Path(task_id): Path<i64>,
    Query(params): Query<MoveParams>,
) -> ApiResult<Json<Value>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut request = MoveTaskRequest::new(parse_status(&params.status)?);
    if let Some(agent) = params.agent {
        request = request.by(agent);
    }
    if let Some(reason) = params.reason {
        request = request.with_reason(reason);
    }
    let outcome = state.tasks.move_task(TaskId::new(task_id), request).await?;
    Ok(Json(json!({
        "status": "moved",
        "new_status": outcome.task.status(),
        "action_item_created": outcome.action_item_created(),
        "agent_spawned": outcome.agent_spawned,
        "session_cleared": outcome.session_cleared,
        "task": outcome.task,
    })))
}

pub(super) async fn start_work<S, C>(
    State(state): State<AppState<S, C>>,
    Path(task_id): Path<i64>,
    Query(params): Query<StartWorkParams>,
) -> ApiResult<Json<Value>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task = state
        .tasks
        .start_work(TaskId::new(task_id), &params.agent)
        .await?;
    Ok(Json(json!({
        "status": "working",
        "task_id": task.id(),
        "agent": task.working_agent(),
    })))
}

pub(super) async fn stop_work<S, C>(
    State(state): State<AppState<S, C>>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<Value>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task = state.tasks.stop_work(TaskId::new(task_id)).await?;
    Ok(Json(json!({ "status": "stopped", "task_id": task.id() })))
}

pub(super) async fn agent_tasks<S, C>(
    State(state): State<AppState<S, C>>,
    Path(agent): Path<String>,
) -> ApiResult<Json<Vec<Task>>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    Ok(Json(state.tasks.agent_tasks(&agent).await?))
}

pub(super) async fn comments<S, C>(
    State(state): State<AppState<S, C>>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<Vec<Comment>>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    Ok(Json(
        state.comments.list_comments(TaskId::new(task_id)).await?,
    ))
}

pub(super) async fn add_comment<S, C>(
    State(state): State<AppState<S, C>>,
    Path(task_id): Path<i64>,
    Json(body): Json<CommentBody>,
) -> ApiResult<Json<Value>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let posted = state
        .comments
        .add_comment(TaskId::new(task_id), &body.agent, &body.content)
        .await?;
    Ok(Json(json!({
        "id": posted.comment.id,
        "task_id": posted.comment.task_id,
        "agent": posted.comment.agent,
        "content": posted.comment.content,
        "created_at": posted.comment.created_at,
        "mentions": posted.dispatch.mentioned,
    })))
}
