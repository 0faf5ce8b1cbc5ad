//! Configuration error types.

use thiserror::Error;

use crate::agent::domain::AgentDomainError;

/// Errors returned while loading or interpreting [`super::BoardConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("configuration error: {0}")]
    Figment(Box<figment::Error>),

    /// The configured roster is inconsistent.
    #[error("invalid roster: {0}")]
    Roster(#[from] AgentDomainError),

    /// A configuration field has an invalid value.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}
