//! Port contracts for board persistence.
//!
//! The store is split by record kind; [`BoardStore`] bundles them for
//! services that need the whole board.

pub mod chat;
pub mod error;
pub mod records;
pub mod task;

pub use chat::ChatRepository;
pub use error::{BoardStoreError, BoardStoreResult};
pub use records::{ActionItemRepository, ActivityRepository, CommentRepository};
pub use task::{CommittedTask, TaskCommit, TaskFilter, TaskOrder, TaskRepository};

/// Every board persistence contract in one bound.
pub trait BoardStore:
    TaskRepository + CommentRepository + ActionItemRepository + ActivityRepository + ChatRepository
{
}

impl<T> BoardStore for T where
    T: TaskRepository
        + CommentRepository
        + ActionItemRepository
        + ActivityRepository
        + ChatRepository
{
}
