//! Session management endpoints.
//!
//! Orchestration failures are reported in the body with `success: false`,
//! never as HTTP errors.

use axum::{
    Json,
    extract::{Path, State},
};
use mockable::Clock;
use serde::Deserialize;

use super::{ApiResult, AppState};
use crate::agent::services::{CreateSessionRequest, SessionListing, SessionOutcome, StopAllOutcome};
use crate::board::ports::BoardStore;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct CreateBody {
    agent_id: Option<String>,
    label: Option<String>,
    task: Option<String>,
}

pub(super) async fn list<S, C>(
    State(state): State<AppState<S, C>>,
) -> ApiResult<Json<SessionListing>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    Ok(Json(state.sessions.list().await?))
}

pub(super) async fn create<S, C>(
    State(state): State<AppState<S, C>>,
    body: Option<Json<CreateBody>>,
) -> Json<SessionOutcome>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Json(body) = body.unwrap_or_default();
    let request = CreateSessionRequest {
        agent_id: body.agent_id,
        label: body.label,
        task: body.task,
    };
    Json(state.sessions.create(request).await)
}

pub(super) async fn stop<S, C>(
    State(state): State<AppState<S, C>>,
    Path(session_key): Path<String>,
) -> Json<SessionOutcome>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    Json(state.sessions.stop(&session_key).await)
}

pub(super) async fn stop_all<S, C>(State(state): State<AppState<S, C>>) -> Json<StopAllOutcome>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    Json(state.sessions.stop_all().await)
}

pub(super) async fn delete<S, C>(
    State(state): State<AppState<S, C>>,
    Path(session_key): Path<String>,
) -> ApiResult<Json<SessionOutcome>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    Ok(Json(state.sessions.delete(&session_key).await?))
}
