//! Parsing and formatting tests for board domain values.

use crate::board::domain::{
    ActionItemType, BoardDomainError, ContentLimits, FieldChange, NewTask, TaskId, TaskPriority,
    TaskStatus, parse_due_date, summarize_changes,
};
use chrono::{DateTime, Local, Utc};
use mockable::Clock;
use rstest::rstest;

#[rstest]
#[case("Backlog", TaskStatus::Backlog)]
#[case("In Progress", TaskStatus::InProgress)]
#[case("in_progress", TaskStatus::InProgress)]
#[case("REVIEW", TaskStatus::Review)]
#[case(" done ", TaskStatus::Done)]
#[case("blocked", TaskStatus::Blocked)]
fn statuses_parse_leniently(#[case] raw: &str, #[case] expected: TaskStatus) {
    assert_eq!(TaskStatus::try_from(raw), Ok(expected));
}

#[rstest]
fn unknown_status_is_rejected() {
    let err = TaskStatus::try_from("Archived").expect_err("unknown status");
    assert_eq!(err.to_string(), "unknown task status: Archived");
}

#[rstest]
fn in_progress_serialises_with_a_space() {
    let json = serde_json::to_string(&TaskStatus::InProgress).expect("serialises");
    assert_eq!(json, "\"In Progress\"");
}

#[rstest]
#[case(TaskStatus::InProgress, true)]
#[case(TaskStatus::Review, true)]
#[case(TaskStatus::Backlog, false)]
#[case(TaskStatus::Done, false)]
#[case(TaskStatus::Blocked, false)]
fn agent_active_columns(#[case] status: TaskStatus, #[case] active: bool) {
    assert_eq!(status.is_agent_active(), active);
}

#[rstest]
fn priorities_are_listed_by_rank() {
    let names: Vec<&str> = TaskPriority::ALL.iter().map(|p| p.as_str()).collect();
    assert_eq!(names, vec!["Critical", "High", "Medium", "Low"]);
    assert!(TaskPriority::try_from("urgent").is_err());
}

#[rstest]
fn action_item_types_round_trip_through_storage_names() {
    for kind in [
        ActionItemType::Question,
        ActionItemType::Completion,
        ActionItemType::Blocker,
    ] {
        assert_eq!(ActionItemType::try_from(kind.as_str()), Ok(kind));
    }
}

#[rstest]
fn due_dates_must_be_calendar_dates() {
    assert!(parse_due_date("2026-03-01").is_ok());
    assert_eq!(
        parse_due_date("next week"),
        Err(BoardDomainError::InvalidDueDate("next week".to_owned()))
    );
}

#[rstest]
fn change_summary_lists_each_field() {
    let summary = summarize_changes(&[
        FieldChange {
            field: "status",
            old: "Backlog".to_owned(),
            new: "Review".to_owned(),
        },
        FieldChange {
            field: "priority",
            old: "Low".to_owned(),
            new: "High".to_owned(),
        },
    ]);
    assert_eq!(summary, "status: Backlog → Review; priority: Low → High");
}

#[rstest]
fn author_names_are_trimmed_and_bounded() {
    let limits = ContentLimits {
        max_agent_name_chars: 5,
        ..ContentLimits::default()
    };
    assert_eq!(limits.validate_author("  Bob "), Ok("Bob"));
    assert_eq!(
        limits.validate_author("   "),
        Err(BoardDomainError::EmptyAgentName)
    );
    assert_eq!(
        limits.validate_author("Bartholomew"),
        Err(BoardDomainError::AgentNameTooLong { actual: 11, max: 5 })
    );
}

#[rstest]
fn content_over_the_limit_is_rejected() {
    let limits = ContentLimits {
        max_content_bytes: 4,
        ..ContentLimits::default()
    };
    assert!(limits.validate_content("four").is_ok());
    assert_eq!(
        limits.validate_content("fives"),
        Err(BoardDomainError::ContentTooLarge {
            actual_bytes: 5,
            limit_bytes: 4
        })
    );
}

struct FrozenClock(DateTime<Utc>);

impl Clock for FrozenClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[rstest]
fn every_write_produces_a_new_version() {
    let instant = Utc::now();
    let clock = FrozenClock(instant);
    let mut task = NewTask {
        title: "Versioned".to_owned(),
        description: String::new(),
        status: TaskStatus::Backlog,
        priority: TaskPriority::Medium,
        agent: "Architect".to_owned(),
        due_date: None,
        board: "default".to_owned(),
        source_file: None,
        source_ref: None,
        created_at: instant,
    }
    .into_task(TaskId::new(1));

    task.move_to(TaskStatus::Review, &clock);
    let first = task.updated_at();
    task.move_to(TaskStatus::Blocked, &clock);

    assert!(first > instant);
    assert!(task.updated_at() > first);
}
