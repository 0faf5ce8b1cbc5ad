//! Prompt rendering for spawned agent sessions.

use minijinja::Environment;
use serde_json::{Map, Value, json};

use crate::agent::domain::{AgentDomainError, RosterAgent};
use crate::board::domain::{Comment, Task};

const GUARDRAILS_TEMPLATE: &str = include_str!("templates/guardrails.md.j2");
const ASSIGNMENT_TEMPLATE: &str = include_str!("templates/assignment.md.j2");
const MENTION_TEMPLATE: &str = include_str!("templates/mention.md.j2");
const FOLLOWUP_TEMPLATE: &str = include_str!("templates/followup.md.j2");

/// Deployment strings substituted into every prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    /// Board title shown in assignment headers.
    pub board_title: String,
    /// Project the agents work on.
    pub project_name: String,
    /// Company the agents work for.
    pub company_name: String,
    /// Free-text company description.
    pub company_context: String,
    /// Compliance frameworks agents must respect.
    pub compliance_frameworks: String,
    /// Filesystem paths agents may access.
    pub allowed_paths: String,
    /// Display name of the coordinating agent.
    pub main_agent_name: String,
    /// How prompts refer to the human supervisor.
    pub supervisor_label: String,
    /// Base URL agents use to call the board API.
    pub board_url: String,
}

impl Default for PromptContext {
    fn default() -> Self {
        Self {
            board_title: "Task Board".to_owned(),
            project_name: "Project".to_owned(),
            company_name: "the company".to_owned(),
            company_context: "a software company".to_owned(),
            compliance_frameworks: "Follow applicable security best practices".to_owned(),
            allowed_paths: "the project workspace".to_owned(),
            main_agent_name: "Jarvis".to_owned(),
            supervisor_label: "User".to_owned(),
            board_url: "http://localhost:8080".to_owned(),
        }
    }
}

/// Renders session prompts from the built-in templates.
///
/// Role prompts configured per agent are themselves templates and may refer
/// to any [`PromptContext`] field by name.
#[derive(Debug, Clone)]
pub struct PromptRenderer {
    context: PromptContext,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new(PromptContext::default())
    }
}

impl PromptRenderer {
    /// Creates a renderer bound to deployment strings.
    #[must_use]
    pub const fn new(context: PromptContext) -> Self {
        Self { context }
    }

    /// Returns the deployment strings.
    #[must_use]
    pub const fn context(&self) -> &PromptContext {
        &self.context
    }

    /// Renders the prompt for an agent assigned to a task.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::TemplateRender`] when a template fails.
    pub fn assignment(&self, agent: &RosterAgent, task: &Task) -> Result<String, AgentDomainError> {
        let role_prompt = self.role_prompt(agent)?;
        let guardrails = self.guardrails()?;
        self.render(
            "assignment",
            ASSIGNMENT_TEMPLATE,
            json!({
                "task_id": task.id().value(),
                "task_title": task.title(),
                "task_description": task.description(),
                "agent_name": agent.name(),
                "role_prompt": role_prompt,
                "guardrails": guardrails,
            }),
        )
    }

    /// Renders the prompt for an agent tagged in a comment.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::TemplateRender`] when a template fails.
    pub fn mention(
        &self,
        agent: &RosterAgent,
        task: &Task,
        mentioner: &str,
        comment: &str,
        previous_context: &str,
    ) -> Result<String, AgentDomainError> {
        let role_prompt = self.role_prompt(agent)?;
        let guardrails = self.guardrails()?;
        self.render(
            "mention",
            MENTION_TEMPLATE,
            json!({
                "task_id": task.id().value(),
                "task_title": task.title(),
                "task_description": task.description(),
                "agent_name": agent.name(),
                "mentioner": mentioner,
                "comment": comment,
                "previous_context": previous_context,
                "role_prompt": role_prompt,
                "guardrails": guardrails,
            }),
        )
    }

    /// Renders the prompt for a follow-up session carrying prior context.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::TemplateRender`] when a template fails.
    pub fn followup(
        &self,
        agent: &RosterAgent,
        task: &Task,
        previous_context: &str,
        message: &str,
    ) -> Result<String, AgentDomainError> {
        let role_prompt = self.role_prompt(agent)?;
        self.render(
            "followup",
            FOLLOWUP_TEMPLATE,
            json!({
                "task_id": task.id().value(),
                "task_title": task.title(),
                "previous_context": previous_context,
                "message": message,
                "role_prompt": role_prompt,
            }),
        )
    }

    fn guardrails(&self) -> Result<String, AgentDomainError> {
        self.render("guardrails", GUARDRAILS_TEMPLATE, Value::Null)
    }

    fn role_prompt(&self, agent: &RosterAgent) -> Result<String, AgentDomainError> {
        self.render(agent.external_id().as_str(), agent.role_prompt(), Value::Null)
    }

    fn render(&self, name: &str, template: &str, extra: Value) -> Result<String, AgentDomainError> {
        let environment = Environment::new();
        let mut context = self.base_context();
        if let Value::Object(fields) = extra {
            context.extend(fields);
        }
        environment
            .render_str(template, context)
            .map_err(|error| AgentDomainError::TemplateRender {
                template: name.to_owned(),
                reason: error.to_string(),
            })
    }

    fn base_context(&self) -> Map<String, Value> {
        let base = &self.context;
        let mut context = Map::new();
        for (key, value) in [
            ("board_title", &base.board_title),
            ("project_name", &base.project_name),
            ("company_name", &base.company_name),
            ("company_context", &base.company_context),
            ("compliance_frameworks", &base.compliance_frameworks),
            ("allowed_paths", &base.allowed_paths),
            ("main_agent_name", &base.main_agent_name),
            ("supervisor_label", &base.supervisor_label),
            ("board_url", &base.board_url),
        ] {
            context.insert(key.to_owned(), Value::String(value.clone()));
        }
        context
    }
}

/// Formats prior comments as prompt context.
///
/// Each comment is truncated to `truncate_chars` characters.
#[must_use]
pub fn format_prior_comments(comments: &[Comment], truncate_chars: usize) -> String {
    comments
        .iter()
        .map(|comment| {
            let content: String = comment.content.chars().take(truncate_chars).collect();
            format!("**{}:** {}", comment.agent, content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
