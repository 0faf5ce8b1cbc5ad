//! Live channel adapters.

pub mod memory;
pub mod websocket;

pub use memory::RecordingChannel;
pub use websocket::{DEFAULT_OUTBOX_CAPACITY, WebSocketChannel};
