//! Unit tests for the board context.

mod action_item_tests;
mod domain_tests;
mod lifecycle_tests;
mod store_tests;
