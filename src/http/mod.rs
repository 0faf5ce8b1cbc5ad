//! JSON and WebSocket surface of the board.
//!
//! [`router`] wires every endpoint onto an [`AppState`] holding the board
//! services. Failures render as `{"detail": ...}` with the status chosen by
//! [`ApiError::status`].

mod action_items;
mod auth;
mod chat;
mod error;
mod meta;
mod sessions;
mod socket;
mod tasks;

pub use auth::{API_KEY_HEADER, ApiKey};
pub use error::{ApiError, ApiResult};

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use mockable::Clock;
use std::sync::Arc;

use crate::agent::services::SessionAdminService;
use crate::board::{
    ports::BoardStore,
    services::{
        ActionItemService, ActivityRecorder, BoardRuntime, ChatService, CommentService,
        TaskLifecycleService,
    },
};
use crate::config::BrandingConfig;
use crate::live::services::Broadcaster;

/// Shared state handed to every handler.
pub struct AppState<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    runtime: BoardRuntime<S, C>,
    tasks: TaskLifecycleService<S, C>,
    comments: CommentService<S, C>,
    action_items: ActionItemService<S, C>,
    activity: ActivityRecorder<S, C>,
    chat: ChatService<S, C>,
    sessions: SessionAdminService<S, C>,
    branding: Arc<BrandingConfig>,
    api_key: ApiKey,
}

impl<S, C> Clone for AppState<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            tasks: self.tasks.clone(),
            comments: self.comments.clone(),
            action_items: self.action_items.clone(),
            activity: self.activity.clone(),
            chat: self.chat.clone(),
            sessions: self.sessions.clone(),
            branding: Arc::clone(&self.branding),
            api_key: self.api_key.clone(),
        }
    }
}

impl<S, C> AppState<S, C>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Builds every service over one runtime.
    #[must_use]
    pub fn new(runtime: BoardRuntime<S, C>, branding: BrandingConfig) -> Self {
        let sessions = SessionAdminService::new(runtime.clone()).with_main_label(format!(
            "{} {} (Main)",
            branding.main_agent_emoji, branding.main_agent_name
        ));
        Self {
            tasks: TaskLifecycleService::new(runtime.clone()),
            comments: CommentService::new(runtime.clone()),
            action_items: ActionItemService::new(runtime.clone()),
            activity: ActivityRecorder::new(runtime.clone()),
            chat: ChatService::new(runtime.clone()),
            sessions,
            runtime,
            branding: Arc::new(branding),
            api_key: ApiKey::default(),
        }
    }

    /// Requires `key` on agent push endpoints.
    #[must_use]
    pub fn with_api_key(mut self, key: ApiKey) -> Self {
        self.api_key = key;
        self
    }

    /// Returns the shared runtime.
    #[must_use]
    pub const fn runtime(&self) -> &BoardRuntime<S, C> {
        &self.runtime
    }

    /// Returns the task lifecycle service.
    #[must_use]
    pub const fn tasks(&self) -> &TaskLifecycleService<S, C> {
        &self.tasks
    }

    fn broadcaster(&self) -> &Arc<Broadcaster> {
        self.runtime.broadcaster()
    }
}

/// Builds the board router.
pub fn router<S, C>(state: AppState<S, C>) -> Router
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let agent_push = Router::new()
        .route("/api/chat/respond", post(chat::respond::<S, C>))
        .route_layer(middleware::from_fn_with_state(
            state.api_key.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/ws", get(socket::connect::<S, C>))
        .route("/api/config", get(meta::config::<S, C>))
        .route("/api/activity", get(meta::activity::<S, C>))
        .route(
            "/api/tasks",
            get(tasks::list::<S, C>).post(tasks::create::<S, C>),
        )
        .route(
            "/api/tasks/{task_id}",
            get(tasks::get::<S, C>)
                .patch(tasks::update::<S, C>)
                .delete(tasks::delete::<S, C>),
        )
        .route("/api/tasks/{task_id}/move", post(tasks::move_task::<S, C>))
        .route(
            "/api/tasks/{task_id}/start-work",
            post(tasks::start_work::<S, C>),
        )
        .route(
            "/api/tasks/{task_id}/stop-work",
            post(tasks::stop_work::<S, C>),
        )
        .route("/api/agents/{agent}/tasks", get(tasks::agent_tasks::<S, C>))
        .route(
            "/api/tasks/{task_id}/comments",
            get(tasks::comments::<S, C>).post(tasks::add_comment::<S, C>),
        )
        .route(
            "/api/tasks/{task_id}/action-items",
            get(action_items::list::<S, C>).post(action_items::create::<S, C>),
        )
        .route(
            "/api/action-items/{item_id}/resolve",
            post(action_items::resolve::<S, C>),
        )
        .route(
            "/api/action-items/{item_id}/archive",
            post(action_items::archive::<S, C>),
        )
        .route(
            "/api/action-items/{item_id}/unarchive",
            post(action_items::unarchive::<S, C>),
        )
        .route(
            "/api/action-items/{item_id}",
            delete(action_items::delete::<S, C>),
        )
        .route("/api/sessions", get(sessions::list::<S, C>))
        .route("/api/sessions/create", post(sessions::create::<S, C>))
        .route("/api/sessions/stop-all", post(sessions::stop_all::<S, C>))
        .route(
            "/api/sessions/{session_key}/stop",
            post(sessions::stop::<S, C>),
        )
        .route(
            "/api/sessions/{session_key}",
            delete(sessions::delete::<S, C>),
        )
        .route("/api/chat/history", get(chat::history::<S, C>))
        .route("/api/chat/send", post(chat::send::<S, C>))
        .merge(agent_push)
        .with_state(state)
}
