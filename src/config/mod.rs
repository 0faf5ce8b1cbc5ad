//! Layered configuration loading using figment.
//!
//! Sources in priority order, highest wins:
//! 1. Environment variables (`TASKBOARD_*` prefix, `__` separates sections)
//! 2. `taskboard.toml` in the working directory
//! 3. Built-in defaults
//!
//! `TASKBOARD_GATEWAY__TOKEN` maps to `gateway.token`,
//! `TASKBOARD_STORAGE__DATABASE_URL` to `storage.database_url`, and so on.
//!
//! ```no_run
//! use taskboard::config::BoardConfig;
//!
//! let config = BoardConfig::load_with_dotenv().expect("config");
//! assert!(!config.server.bind.is_empty());
//! ```

mod error;
mod roles;


pub use error::ConfigError;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::agent::{
    adapters::GatewayOptions,
    domain::{AgentRoster, ExternalAgentId, RosterAgent},
    services::PromptContext,
};
use crate::board::domain::ContentLimits;
use crate::effects::DEFAULT_FAILURE_CAPACITY;

/// File name of the optional TOML layer.
pub const CONFIG_FILE: &str = "taskboard.toml";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "TASKBOARD_";

/// Complete board configuration, immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BoardConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Display names shown in the UI and prompts.
    #[serde(default)]
    pub branding: BrandingConfig,
    /// Mentionable agents and reserved identities.
    #[serde(default)]
    pub roster: RosterConfig,
    /// Orchestration gateway connection.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Project and company context substituted into prompts.
    #[serde(default)]
    pub project: ProjectConfig,
    /// Content bounds.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Persistence backend.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Log filtering.
    #[serde(default)]
    pub log: LogConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub bind: String,
    /// Key required by agent push endpoints. Empty disables the check.
    pub api_key: String,
    /// Base URL agents use to call back into the board.
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_owned(),
            api_key: String::new(),
            public_url: "http://localhost:8080".to_owned(),
        }
    }
}

/// Display names shown in the UI and prompts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BrandingConfig {
    /// Name of the coordinating agent behind the `main` session.
    pub main_agent_name: String,
    /// Emoji shown next to the coordinating agent.
    pub main_agent_emoji: String,
    /// Human display name.
    pub human_name: String,
    /// How prompts and notices refer to the human supervisor.
    pub supervisor_label: String,
    /// Board title.
    pub board_title: String,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            main_agent_name: "Jarvis".to_owned(),
            main_agent_emoji: "\u{1F6E1}".to_owned(),
            human_name: "User".to_owned(),
            supervisor_label: "User".to_owned(),
            board_title: "Task Board".to_owned(),
        }
    }
}

/// One configured roster agent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgentEntry {
    /// Board display name, also the mention token.
    pub name: String,
    /// Agent identifier understood by the gateway.
    pub id: String,
    /// Role prompt template.
    #[serde(default)]
    pub role_prompt: String,
}

impl AgentEntry {
    fn new(name: &str, id: &str, role_prompt: &str) -> Self {
        Self {
            name: name.to_owned(),
            id: id.to_owned(),
            role_prompt: role_prompt.to_owned(),
        }
    }
}

/// Mentionable agents and reserved identities.
///
/// The coordinating agent from [`BrandingConfig::main_agent_name`] joins the
/// roster with the `main` id unless an entry already claims that id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Specialist agents.
    pub agents: Vec<AgentEntry>,
    /// Identity allowed to complete tasks.
    pub supervisor: String,
    /// Author of automated comments.
    pub system_author: String,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            agents: vec![
                AgentEntry::new("Architect", "architect", roles::ARCHITECT),
                AgentEntry::new(
                    "Security Auditor",
                    "security-auditor",
                    roles::SECURITY_AUDITOR,
                ),
                AgentEntry::new("Code Reviewer", "code-reviewer", roles::CODE_REVIEWER),
                AgentEntry::new("UX Manager", "ux-manager", roles::UX_MANAGER),
            ],
            supervisor: "User".to_owned(),
            system_author: "System".to_owned(),
        }
    }
}

/// Orchestration gateway connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway base URL.
    pub url: String,
    /// Bearer token. Empty disables the integration.
    pub token: String,
    /// Bound for short calls, in seconds.
    pub request_timeout_secs: u64,
    /// Bound for spawning a session, in seconds.
    pub spawn_timeout_secs: u64,
    /// Bound for a conversational round trip, in seconds.
    pub converse_timeout_secs: u64,
    /// Bound for any detached secondary effect, in seconds.
    pub effect_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: "http://host.docker.internal:18789".to_owned(),
            token: String::new(),
            request_timeout_secs: 10,
            spawn_timeout_secs: 60,
            converse_timeout_secs: 120,
            effect_timeout_secs: 180,
        }
    }
}

impl GatewayConfig {
    /// Reports whether a token is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// Returns the detached effect timeout.
    #[must_use]
    pub const fn effect_timeout(&self) -> Duration {
        Duration::from_secs(self.effect_timeout_secs)
    }
}

/// Project and company context substituted into prompts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project the agents work on.
    pub project_name: String,
    /// Company the agents work for.
    pub company_name: String,
    /// Free-text company description.
    pub company_context: String,
    /// Filesystem paths agents may touch.
    pub allowed_paths: String,
    /// Compliance frameworks agents must respect.
    pub compliance_frameworks: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project_name: "My Project".to_owned(),
            company_name: "Acme Corp".to_owned(),
            company_context: "software development".to_owned(),
            allowed_paths: "/workspace, /project".to_owned(),
            compliance_frameworks: "your security requirements".to_owned(),
        }
    }
}

/// Content bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum comment and chat size in bytes.
    pub max_content_bytes: usize,
    /// Maximum author name length in characters.
    pub max_agent_name_chars: usize,
    /// Maximum assistant reply size in bytes.
    pub max_response_bytes: usize,
    /// Prior comments supplied to spawned sessions.
    pub context_window: usize,
    /// Per-comment truncation of prior context, in characters.
    pub context_truncate_chars: usize,
    /// Detached effect failures kept for inspection.
    pub failure_capacity: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let limits = ContentLimits::default();
        Self {
            max_content_bytes: limits.max_content_bytes,
            max_agent_name_chars: limits.max_agent_name_chars,
            max_response_bytes: limits.max_response_bytes,
            context_window: limits.context_window,
            context_truncate_chars: limits.context_truncate_chars,
            failure_capacity: DEFAULT_FAILURE_CAPACITY,
        }
    }
}

/// Persistence backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// PostgreSQL URL. The board runs in memory when unset.
    pub database_url: Option<String>,
    /// Connection pool size.
    pub max_connections: Option<u32>,
}

/// Log filtering.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
        }
    }
}

impl BoardConfig {
    /// Loads configuration from defaults, `taskboard.toml` and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source fails to parse or a
    /// value has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::figment().extract()?)
    }

    /// Loads `.env` from the working directory, then calls [`Self::load`].
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Err(err) if !err.not_found() => {
                tracing::warn!(error = %err, "ignoring unreadable .env file");
            }
            _ => {}
        }
        Self::load()
    }

    /// Builds the provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Builds the roster, adding the coordinating agent when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Roster`] for blank, duplicate or reserved
    /// agent names.
    pub fn agent_roster(&self) -> Result<AgentRoster, ConfigError> {
        let mut agents = Vec::with_capacity(self.roster.agents.len() + 1);
        let has_main = self
            .roster
            .agents
            .iter()
            .any(|entry| entry.id.trim() == ExternalAgentId::MAIN);
        if !has_main {
            agents.push(RosterAgent::new(
                self.branding.main_agent_name.as_str(),
                ExternalAgentId::new(ExternalAgentId::MAIN)?,
                roles::MAIN,
            )?);
        }
        for entry in &self.roster.agents {
            agents.push(RosterAgent::new(
                entry.name.as_str(),
                ExternalAgentId::new(entry.id.as_str())?,
                entry.role_prompt.as_str(),
            )?);
        }
        Ok(AgentRoster::new(
            agents,
            self.roster.supervisor.as_str(),
            self.roster.system_author.as_str(),
        )?)
    }

    /// Returns the strings substituted into session prompts.
    #[must_use]
    pub fn prompt_context(&self) -> PromptContext {
        PromptContext {
            board_title: self.branding.board_title.clone(),
            project_name: self.project.project_name.clone(),
            company_name: self.project.company_name.clone(),
            company_context: self.project.company_context.clone(),
            compliance_frameworks: self.project.compliance_frameworks.clone(),
            allowed_paths: self.project.allowed_paths.clone(),
            main_agent_name: self.branding.main_agent_name.clone(),
            supervisor_label: self.branding.supervisor_label.clone(),
            board_url: self.server.public_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Returns the configured content bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a size bound is zero.
    pub fn content_limits(&self) -> Result<ContentLimits, ConfigError> {
        let bounds = [
            ("limits.max_content_bytes", self.limits.max_content_bytes),
            ("limits.max_agent_name_chars", self.limits.max_agent_name_chars),
            ("limits.max_response_bytes", self.limits.max_response_bytes),
        ];
        if let Some((field, _)) = bounds.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::InvalidValue {
                field: (*field).to_owned(),
                reason: "must be greater than zero".to_owned(),
            });
        }
        Ok(ContentLimits {
            max_content_bytes: self.limits.max_content_bytes,
            max_agent_name_chars: self.limits.max_agent_name_chars,
            max_response_bytes: self.limits.max_response_bytes,
            context_window: self.limits.context_window,
            context_truncate_chars: self.limits.context_truncate_chars,
        })
    }

    /// Returns gateway connection options, or `None` when no token is set.
    #[must_use]
    pub fn gateway_options(&self) -> Option<GatewayOptions> {
        self.gateway.is_enabled().then(|| GatewayOptions {
            base_url: self.gateway.url.clone(),
            token: self.gateway.token.clone(),
            request_timeout: Duration::from_secs(self.gateway.request_timeout_secs),
            spawn_timeout: Duration::from_secs(self.gateway.spawn_timeout_secs),
            converse_timeout: Duration::from_secs(self.gateway.converse_timeout_secs),
        })
    }

    /// Returns the agent push API key, or `None` when the check is disabled.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        let key = self.server.api_key.trim();
        (!key.is_empty()).then_some(key)
    }
}
