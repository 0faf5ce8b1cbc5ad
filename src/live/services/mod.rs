//! Live update services.

pub mod broadcaster;

pub use broadcaster::{BroadcastReport, Broadcaster};
