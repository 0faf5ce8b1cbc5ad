//! Prompt rendering.

use chrono::Utc;

use crate::agent::{
    domain::{AgentDomainError, ExternalAgentId, RosterAgent},
    services::{PromptContext, PromptRenderer, format_prior_comments},
};
use crate::board::domain::{Comment, CommentId, NewTask, Task, TaskId, TaskPriority, TaskStatus};
use rstest::{fixture, rstest};

#[fixture]
fn renderer() -> PromptRenderer {
    PromptRenderer::new(PromptContext {
        project_name: "Lighthouse".to_owned(),
        company_name: "Acme Corp".to_owned(),
        allowed_paths: "/workspace".to_owned(),
        supervisor_label: "Dana".to_owned(),
        board_url: "https://board.example".to_owned(),
        ..PromptContext::default()
    })
}

fn task(description: &str) -> Task {
    NewTask {
        title: "Harden login".to_owned(),
        description: description.to_owned(),
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
        agent: "Architect".to_owned(),
        due_date: None,
        board: "tasks".to_owned(),
        source_file: None,
        source_ref: None,
        created_at: Utc::now(),
    }
    .into_task(TaskId::new(12))
}

fn architect(role_prompt: &str) -> RosterAgent {
    RosterAgent::new(
        "Architect",
        ExternalAgentId::new("architect").expect("valid id"),
        role_prompt,
    )
    .expect("valid agent")
}

#[rstest]
fn assignment_embeds_task_role_and_guardrails(renderer: PromptRenderer) {
    let prompt = renderer
        .assignment(&architect("You design {{ project_name }}."), &task(""))
        .expect("renders");

    assert!(prompt.contains("**Task #12:** Harden login"));
    assert!(prompt.contains("No description provided."));
    assert!(prompt.contains("You design Lighthouse."));
    assert!(prompt.contains("ONLY access: /workspace"));
    assert!(prompt.contains("Approved by Dana"));
    assert!(prompt.contains(
        "POST https://board.example/api/tasks/12/start-work?agent=Architect"
    ));
}

#[rstest]
fn mention_carries_the_comment_and_context(renderer: PromptRenderer) {
    let prompt = renderer
        .mention(
            &architect("Architect role"),
            &task("Rate limiting"),
            "Dana",
            "@Architect is this safe?",
            "**Dana:** earlier note",
        )
        .expect("renders");

    assert!(prompt.starts_with("# You've Been Tagged: Task #12"));
    assert!(prompt.contains("**Dana** mentioned you"));
    assert!(prompt.contains("@Architect is this safe?"));
    assert!(prompt.contains("**Dana:** earlier note"));
    assert!(prompt.contains("Rate limiting"));
}

#[rstest]
fn followup_falls_back_when_there_is_no_history(renderer: PromptRenderer) {
    let prompt = renderer
        .followup(&architect("Architect role"), &task(""), "", "Any update?")
        .expect("renders");

    assert!(prompt.contains("(No previous messages)"));
    assert!(prompt.contains("## Dana's New Message:\nAny update?"));
}

#[rstest]
fn broken_role_templates_are_reported(renderer: PromptRenderer) {
    let err = renderer
        .assignment(&architect("{% if %}"), &task(""))
        .expect_err("invalid template");

    assert!(matches!(
        err,
        AgentDomainError::TemplateRender { template, .. } if template == "architect"
    ));
}

#[rstest]
fn prior_comments_are_truncated_per_comment() {
    let comment = |id: i64, agent: &str, content: &str| Comment {
        id: CommentId::new(id),
        task_id: TaskId::new(12),
        agent: agent.to_owned(),
        content: content.to_owned(),
        created_at: Utc::now(),
    };

    let context = format_prior_comments(
        &[
            comment(1, "Dana", "short"),
            comment(2, "Architect", "a very long reply"),
        ],
        6,
    );

    assert_eq!(context, "**Dana:** short\n**Architect:** a very");
}
