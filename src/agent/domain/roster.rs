//! The closed roster of agents known to the board.

use super::AgentDomainError;
use serde::Serialize;
use std::fmt;

/// Name used for tasks without an owner.
pub const UNASSIGNED: &str = "Unassigned";

/// Identifier of an agent in the external orchestration system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ExternalAgentId(String);

impl ExternalAgentId {
    /// Identifier of the coordinating agent.
    pub const MAIN: &'static str = "main";

    /// Validates and wraps an external identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::EmptyExternalId`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, AgentDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AgentDomainError::EmptyExternalId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalAgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A spawnable, mentionable agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterAgent {
    name: String,
    external_id: ExternalAgentId,
    role_prompt: String,
}

impl RosterAgent {
    /// Creates a roster entry.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::EmptyAgentName`] when the name is blank.
    pub fn new(
        name: impl Into<String>,
        external_id: ExternalAgentId,
        role_prompt: impl Into<String>,
    ) -> Result<Self, AgentDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AgentDomainError::EmptyAgentName);
        }
        Ok(Self {
            name: trimmed.to_owned(),
            external_id,
            role_prompt: role_prompt.into(),
        })
    }

    /// Returns the board display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the external orchestration identifier.
    #[must_use]
    pub const fn external_id(&self) -> &ExternalAgentId {
        &self.external_id
    }

    /// Returns the role description injected into prompts.
    #[must_use]
    pub fn role_prompt(&self) -> &str {
        &self.role_prompt
    }
}

/// Immutable roster of agents plus the reserved human and system identities.
///
/// Built once at startup and shared by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRoster {
    agents: Vec<RosterAgent>,
    supervisor: String,
    system_author: String,
}

impl AgentRoster {
    /// Builds a roster.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::DuplicateAgent`] when two agents share a
    /// name and [`AgentDomainError::ReservedName`] when an agent reuses the
    /// supervisor, system or unassigned identity.
    pub fn new(
        agents: Vec<RosterAgent>,
        supervisor: impl Into<String>,
        system_author: impl Into<String>,
    ) -> Result<Self, AgentDomainError> {
        let supervisor_name = supervisor.into();
        let system_name = system_author.into();
        if supervisor_name.trim().is_empty() || system_name.trim().is_empty() {
            return Err(AgentDomainError::EmptyAgentName);
        }

        for (position, agent) in agents.iter().enumerate() {
            let reserved = [supervisor_name.as_str(), system_name.as_str(), UNASSIGNED];
            if reserved
                .iter()
                .any(|name| name.eq_ignore_ascii_case(agent.name()))
            {
                return Err(AgentDomainError::ReservedName(agent.name().to_owned()));
            }
            let duplicate = agents
                .iter()
                .take(position)
                .any(|earlier| earlier.name().to_lowercase() == agent.name().to_lowercase());
            if duplicate {
                return Err(AgentDomainError::DuplicateAgent(agent.name().to_owned()));
            }
        }

        Ok(Self {
            agents,
            supervisor: supervisor_name,
            system_author: system_name,
        })
    }

    /// Returns every roster agent in configuration order.
    #[must_use]
    pub fn agents(&self) -> &[RosterAgent] {
        &self.agents
    }

    /// Returns the human supervisor identity.
    #[must_use]
    pub fn supervisor(&self) -> &str {
        &self.supervisor
    }

    /// Returns the identity used for system-authored comments.
    #[must_use]
    pub fn system_author(&self) -> &str {
        &self.system_author
    }

    /// Finds a roster agent by name, ignoring case.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&RosterAgent> {
        let wanted = name.trim().to_lowercase();
        self.agents
            .iter()
            .find(|agent| agent.name().to_lowercase() == wanted)
    }

    /// Finds a roster agent by its external identifier.
    #[must_use]
    pub fn lookup_external(&self, external_id: &str) -> Option<&RosterAgent> {
        self.agents
            .iter()
            .find(|agent| agent.external_id().as_str() == external_id)
    }

    /// Returns `true` when `name` is the human supervisor.
    #[must_use]
    pub fn is_supervisor(&self, name: &str) -> bool {
        name == self.supervisor
    }

    /// Returns `true` when `name` is the system author.
    #[must_use]
    pub fn is_system(&self, name: &str) -> bool {
        name == self.system_author
    }

    /// Returns `true` for the supervisor, the system author and roster agents.
    #[must_use]
    pub fn is_known_identity(&self, name: &str) -> bool {
        self.is_supervisor(name)
            || self.is_system(name)
            || self.agents.iter().any(|agent| agent.name() == name)
    }

    /// Returns the agent a session should be spawned for when `assignee`
    /// owns a task. The supervisor and unassigned tasks get no session.
    #[must_use]
    pub fn spawnable(&self, assignee: &str) -> Option<&RosterAgent> {
        if self.is_supervisor(assignee) {
            return None;
        }
        self.agents.iter().find(|agent| agent.name() == assignee)
    }

    /// Names a task may be assigned to: roster agents, the supervisor and
    /// [`UNASSIGNED`].
    #[must_use]
    pub fn assignable_names(&self) -> Vec<&str> {
        self.agents
            .iter()
            .map(RosterAgent::name)
            .chain([self.supervisor.as_str(), UNASSIGNED])
            .collect()
    }

    /// Resolves an assignee to its canonical spelling, ignoring case.
    ///
    /// Returns `None` when the name is not assignable.
    #[must_use]
    pub fn canonical_assignee(&self, name: &str) -> Option<&str> {
        let wanted = name.trim().to_lowercase();
        self.assignable_names()
            .into_iter()
            .find(|candidate| candidate.to_lowercase() == wanted)
    }
}
