//! Port contracts for agent orchestration.

pub mod session_coordinator;

#[cfg(test)]
pub use session_coordinator::MockSessionCoordinator;
pub use session_coordinator::{
    SessionCoordinator, SessionCoordinatorError, SessionCoordinatorResult,
};
