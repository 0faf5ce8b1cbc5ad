//! Application services for agent orchestration.

mod dispatcher;
mod prompts;
mod sessions;

pub use dispatcher::{AgentDispatcher, CommentDispatch, DispatchError};
pub use prompts::{PromptContext, PromptRenderer, format_prior_comments};
pub use sessions::{
    CreateSessionRequest, SessionAdminService, SessionListing, SessionOutcome, StopAllOutcome,
};
