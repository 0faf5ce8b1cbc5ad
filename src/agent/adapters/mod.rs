//! Adapter implementations of the session coordinator port.

pub mod disabled;
pub mod gateway;
pub mod memory;

pub use disabled::DisabledSessionCoordinator;
pub use gateway::{GatewayOptions, GatewaySessionCoordinator};
pub use memory::{DeliveredMessage, InMemorySessionCoordinator};
