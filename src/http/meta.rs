//! Board configuration and activity feed endpoints.

use axum::{
    Json,
    extract::{Query, State},
};
use mockable::Clock;
use serde::Deserialize;
use serde_json::{Value, json};
use std::future::{Ready, ready};

use super::{ApiResult, AppState};
use crate::board::{
    domain::{ActivityEntry, TaskPriority, TaskStatus},
    ports::BoardStore,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ActivityParams {
    limit: Option<usize>,
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "axum extractors are taken by value"
)]
pub(super) fn config<S, C>(State(state): State<AppState<S, C>>) -> Ready<Json<Value>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let roster = state.runtime.roster();
    let branding = &state.branding;
    ready(Json(json!({
        "agents": roster.assignable_names(),
        "statuses": TaskStatus::ALL.map(TaskStatus::as_str),
        "priorities": TaskPriority::ALL.map(TaskPriority::as_str),
        "branding": {
            "mainAgentName": branding.main_agent_name,
            "mainAgentEmoji": branding.main_agent_emoji,
            "humanName": branding.human_name,
            "humanSupervisorLabel": branding.supervisor_label,
            "boardTitle": branding.board_title,
        },
    })))
}

pub(super) async fn activity<S, C>(
    State(state): State<AppState<S, C>>,
    Query(params): Query<ActivityParams>,
) -> ApiResult<Json<Vec<ActivityEntry>>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    Ok(Json(state.activity.recent(params.limit).await?))
}
