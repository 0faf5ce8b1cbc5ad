//! Unit tests for the agent context.

mod dispatcher_tests;
mod prompt_tests;
