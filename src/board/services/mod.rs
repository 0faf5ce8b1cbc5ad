//! Application services for the task board.

mod action_items;
mod activity;
mod chat;
mod comments;
mod error;
mod lifecycle;
mod locks;
mod runtime;

pub use action_items::{ActionItemService, CreateActionItemRequest};
pub use activity::{ActivityRecorder, DEFAULT_ACTIVITY_LIMIT};
pub use chat::{ChatSendOutcome, ChatService, DEFAULT_CHAT_HISTORY_LIMIT, SendChatRequest};
pub use comments::{CommentService, PostedComment};
pub use error::{BoardServiceError, BoardServiceResult};
pub use lifecycle::{CreateTaskRequest, MoveOutcome, MoveTaskRequest, TaskLifecycleService};
pub use locks::TaskLocks;
pub use runtime::BoardRuntime;
