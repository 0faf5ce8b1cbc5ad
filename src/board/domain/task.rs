//! Task aggregate root and related lifecycle types.

use super::{BoardDomainError, ParseTaskPriorityError, ParseTaskStatusError, TaskId};
use crate::agent::domain::SessionKey;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Board column a task currently sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Task is queued and not yet started.
    Backlog,
    /// An agent is working on the task.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Work is finished and awaits supervisor review.
    Review,
    /// The supervisor accepted the work.
    Done,
    /// Work cannot continue until a blocker is cleared.
    Blocked,
}

impl TaskStatus {
    /// Every status in board column order.
    pub const ALL: [Self; 5] = [
        Self::Backlog,
        Self::InProgress,
        Self::Review,
        Self::Done,
        Self::Blocked,
    ];

    /// Returns the canonical display and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Done => "Done",
            Self::Blocked => "Blocked",
        }
    }

    /// Returns `true` while an agent may be attached to the task.
    #[must_use]
    pub const fn is_agent_active(self) -> bool {
        matches!(self, Self::InProgress | Self::Review)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "backlog" => Ok(Self::Backlog),
            "in progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            "blocked" => Ok(Self::Blocked),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Task urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    /// Must be handled before anything else.
    Critical,
    /// Important work.
    High,
    /// Default urgency.
    Medium,
    /// Nice to have.
    Low,
}

impl TaskPriority {
    /// Every priority from most to least urgent.
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    /// Returns the canonical display and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Sort rank, lowest first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Critical => 1,
            Self::High => 2,
            Self::Medium => 3,
            Self::Low => 4,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseTaskPriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParseTaskPriorityError(value.to_owned())),
        }
    }
}

/// Parses an optional ISO-8601 due date.
///
/// # Errors
///
/// Returns [`BoardDomainError::InvalidDueDate`] when the value is not a
/// `YYYY-MM-DD` calendar date.
pub fn parse_due_date(value: &str) -> Result<NaiveDate, BoardDomainError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| BoardDomainError::InvalidDueDate(value.to_owned()))
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    agent: String,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    board: String,
    source_file: Option<String>,
    source_ref: Option<String>,
    working_agent: Option<String>,
    agent_session_key: Option<SessionKey>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Task title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Current column.
    pub status: TaskStatus,
    /// Urgency.
    pub priority: TaskPriority,
    /// Owning agent name.
    pub agent: String,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Logical board grouping key.
    pub board: String,
    /// Provenance file, if any.
    pub source_file: Option<String>,
    /// Provenance reference inside the source file, if any.
    pub source_ref: Option<String>,
    /// Agent currently processing the task.
    pub working_agent: Option<String>,
    /// Live agent session bound to the task.
    pub agent_session_key: Option<SessionKey>,
}

/// A validated task that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Task title, non-empty.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Initial column.
    pub status: TaskStatus,
    /// Urgency.
    pub priority: TaskPriority,
    /// Owning agent name, validated against the roster.
    pub agent: String,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Logical board grouping key.
    pub board: String,
    /// Provenance file, if any.
    pub source_file: Option<String>,
    /// Provenance reference, if any.
    pub source_ref: Option<String>,
    /// Creation timestamp, also used as the initial update timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    /// Materialises the task once the store has assigned an identifier.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            agent: self.agent,
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.created_at,
            board: self.board,
            source_file: self.source_file,
            source_ref: self.source_ref,
            working_agent: None,
            agent_session_key: None,
        }
    }
}

/// Partial update of editable task fields.
///
/// Fields left as `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement status.
    pub status: Option<TaskStatus>,
    /// Replacement priority.
    pub priority: Option<TaskPriority>,
    /// Replacement owning agent.
    pub agent: Option<String>,
    /// Replacement due date.
    pub due_date: Option<NaiveDate>,
    /// Replacement provenance file.
    pub source_file: Option<String>,
    /// Replacement provenance reference.
    pub source_ref: Option<String>,
}

/// One effective field change produced by [`Task::apply_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Changed field name.
    pub field: &'static str,
    /// Value before the change.
    pub old: String,
    /// Value after the change.
    pub new: String,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} → {}", self.field, self.old, self.new)
    }
}

/// Joins field changes into the activity log summary.
#[must_use]
pub fn summarize_changes(changes: &[FieldChange]) -> String {
    changes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn display_optional<T: fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "none".to_owned(), ToString::to_string)
}

fn replace_field<T>(
    field: &'static str,
    current: &mut T,
    proposed: Option<&T>,
    changes: &mut Vec<FieldChange>,
) where
    T: PartialEq + Clone + fmt::Display,
{
    if let Some(value) = proposed
        && value != current
    {
        changes.push(FieldChange {
            field,
            old: current.to_string(),
            new: value.to_string(),
        });
        *current = value.clone();
    }
}

fn replace_optional_field<T>(
    field: &'static str,
    current: &mut Option<T>,
    proposed: Option<&T>,
    changes: &mut Vec<FieldChange>,
) where
    T: PartialEq + Clone + fmt::Display,
{
    if let Some(value) = proposed
        && current.as_ref() != Some(value)
    {
        changes.push(FieldChange {
            field,
            old: display_optional(current.as_ref()),
            new: value.to_string(),
        });
        *current = Some(value.clone());
    }
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            agent: data.agent,
            due_date: data.due_date,
            created_at: data.created_at,
            updated_at: data.updated_at,
            board: data.board,
            source_file: data.source_file,
            source_ref: data.source_ref,
            working_agent: data.working_agent,
            agent_session_key: data.agent_session_key,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the current column.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the task priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the owning agent name.
    #[must_use]
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the board grouping key.
    #[must_use]
    pub fn board(&self) -> &str {
        &self.board
    }

    /// Returns the provenance file, if any.
    #[must_use]
    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// Returns the provenance reference, if any.
    #[must_use]
    pub fn source_ref(&self) -> Option<&str> {
        self.source_ref.as_deref()
    }

    /// Returns the agent currently processing the task, if any.
    #[must_use]
    pub fn working_agent(&self) -> Option<&str> {
        self.working_agent.as_deref()
    }

    /// Returns the agent session bound to the task, if any.
    #[must_use]
    pub const fn agent_session_key(&self) -> Option<&SessionKey> {
        self.agent_session_key.as_ref()
    }

    /// Moves the task to a new column and returns the previous one.
    pub(crate) fn move_to(&mut self, status: TaskStatus, clock: &impl Clock) -> TaskStatus {
        let previous = self.status;
        self.status = status;
        self.touch(clock);
        previous
    }

    /// Clears the working indicator and the session binding.
    ///
    /// Returns the session key that was bound, if any.
    pub(crate) fn release_agent(&mut self) -> Option<SessionKey> {
        self.working_agent = None;
        self.agent_session_key.take()
    }

    /// Marks an agent as actively working on the task.
    pub(crate) fn start_work(&mut self, agent: impl Into<String>, clock: &impl Clock) {
        self.working_agent = Some(agent.into());
        self.touch(clock);
    }

    /// Clears the working indicator.
    ///
    /// Returns `false` when no agent was working.
    pub(crate) fn stop_work(&mut self, clock: &impl Clock) -> bool {
        if self.working_agent.take().is_none() {
            return false;
        }
        self.touch(clock);
        true
    }

    /// Binds a live agent session to the task, replacing any previous one.
    pub(crate) fn bind_session(&mut self, session_key: SessionKey, clock: &impl Clock) {
        self.agent_session_key = Some(session_key);
        self.touch(clock);
    }

    /// Applies a partial update and returns the effective changes.
    ///
    /// The update timestamp is only refreshed when at least one field
    /// actually differs.
    pub(crate) fn apply_changes(
        &mut self,
        changes: &TaskChanges,
        clock: &impl Clock,
    ) -> Vec<FieldChange> {
        let mut applied = Vec::new();
        replace_field("title", &mut self.title, changes.title.as_ref(), &mut applied);
        replace_field(
            "description",
            &mut self.description,
            changes.description.as_ref(),
            &mut applied,
        );
        replace_field("status", &mut self.status, changes.status.as_ref(), &mut applied);
        replace_field(
            "priority",
            &mut self.priority,
            changes.priority.as_ref(),
            &mut applied,
        );
        replace_field("agent", &mut self.agent, changes.agent.as_ref(), &mut applied);
        replace_optional_field(
            "due_date",
            &mut self.due_date,
            changes.due_date.as_ref(),
            &mut applied,
        );
        replace_optional_field(
            "source_file",
            &mut self.source_file,
            changes.source_file.as_ref(),
            &mut applied,
        );
        replace_optional_field(
            "source_ref",
            &mut self.source_ref,
            changes.source_ref.as_ref(),
            &mut applied,
        );

        if !applied.is_empty() {
            self.touch(clock);
        }
        applied
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    ///
    /// The stamp always moves forward by at least a microsecond, the finest
    /// precision the stores keep, so every write yields a new version.
    fn touch(&mut self, clock: &impl Clock) {
        let floor = self.updated_at + Duration::microseconds(1);
        self.updated_at = clock.utc().max(floor);
    }
}
