//! Live update fan-out.
//!
//! Every committed board mutation is pushed to all connected viewers as a
//! tagged JSON event. Delivery is best-effort: there is no replay, so a
//! viewer that misses events resynchronises by refetching board state.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The broadcaster in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
