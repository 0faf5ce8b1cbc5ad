//! Unit tests for the live update context.
