//! Command-bar chat endpoints.

use axum::{
    Json,
    extract::{Query, State},
};
use mockable::Clock;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiResult, AppState};
use crate::board::{
    domain::{ChatAttachment, DEFAULT_CHAT_SESSION},
    ports::BoardStore,
    services::{ChatSendOutcome, SendChatRequest},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct HistoryParams {
    session: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SendBody {
    message: String,
    session: Option<String>,
    #[serde(default)]
    attachments: Vec<ChatAttachment>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RespondBody {
    response: String,
    session: Option<String>,
}

pub(super) async fn history<S, C>(
    State(state): State<AppState<S, C>>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Value>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let messages = state
        .chat
        .history(params.session.as_deref(), params.limit)
        .await?;
    let session = params
        .session
        .unwrap_or_else(|| DEFAULT_CHAT_SESSION.to_owned());
    Ok(Json(json!({ "history": messages, "session": session })))
}

pub(super) async fn send<S, C>(
    State(state): State<AppState<S, C>>,
    Json(body): Json<SendBody>,
) -> ApiResult<Json<ChatSendOutcome>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let request = SendChatRequest {
        message: body.message,
        session: body.session,
        attachments: body.attachments,
    };
    Ok(Json(state.chat.send(request).await?))
}

pub(super) async fn respond<S, C>(
    State(state): State<AppState<S, C>>,
    Json(body): Json<RespondBody>,
) -> ApiResult<Json<Value>>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let stored = state
        .chat
        .record_assistant_reply(body.response, body.session.as_deref())
        .await?;
    Ok(Json(json!({ "delivered": true, "id": stored.id })))
}
