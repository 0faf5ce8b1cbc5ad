//! In-memory board store for tests and single-process deployments.

mod store;

pub use store::InMemoryBoardStore;
