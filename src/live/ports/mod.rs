//! Port contracts for live update delivery.

pub mod channel;

#[cfg(test)]
pub use channel::MockLiveChannel;
pub use channel::{LiveChannel, LiveChannelError, LiveChannelResult};
