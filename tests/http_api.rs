//! HTTP surface tests driving the router in process.
#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::AUTHORIZATION, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use taskboard::{
    agent::adapters::InMemorySessionCoordinator,
    app::assemble,
    board::adapters::memory::InMemoryBoardStore,
    config::BoardConfig,
    http::{API_KEY_HEADER, router},
};
use tower::ServiceExt;

const PUSH_KEY: &str = "push-secret";

struct Harness {
    app: Router,
    coordinator: InMemorySessionCoordinator,
}

#[fixture]
fn harness() -> Harness {
    let mut config = BoardConfig::default();
    config.server.api_key = PUSH_KEY.to_owned();
    let coordinator = InMemorySessionCoordinator::new();
    let state = assemble(
        &config,
        Arc::new(InMemoryBoardStore::new()),
        Arc::new(coordinator.clone()),
    )
    .expect("default configuration is valid");
    Harness {
        app: router(state),
        coordinator,
    }
}

async fn call(
    app: &Router,
    request: Request<Body>,
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body readable")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

async fn create_task(app: &Router, title: &str, agent: &str) -> i64 {
    let (status, body) = call(
        app,
        json_request(
            Method::POST,
            "/api/tasks",
            &json!({ "title": title, "agent": agent }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {body}");
    body["id"].as_i64().expect("numeric id")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_tasks_are_listed_with_canonical_owner(harness: Harness) {
    let id = create_task(&harness.app, "Audit login flow", "architect").await;

    let (status, task) = call(
        &harness.app,
        empty_request(Method::GET, &format!("/api/tasks/{id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["agent"], "Architect");
    assert_eq!(task["status"], "Backlog");
    assert_eq!(task["priority"], "Medium");

    let (status, listing) = call(&harness.app, empty_request(Method::GET, "/api/tasks")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().map(Vec::len), Some(1));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_tasks_render_not_found(harness: Harness) {
    let (status, body) = call(
        &harness.app,
        empty_request(Method::GET, "/api/tasks/999"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "task 999 not found");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_statuses_are_unprocessable(harness: Harness) {
    let id = create_task(&harness.app, "Sort inbox", "Architect").await;

    let (status, body) = call(
        &harness.app,
        empty_request(Method::POST, &format!("/api/tasks/{id}/move?status=Archived")),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], "unknown task status: Archived");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_the_supervisor_completes_tasks(harness: Harness) {
    let id = create_task(&harness.app, "Ship release", "Architect").await;

    let (denied, body) = call(
        &harness.app,
        empty_request(
            Method::POST,
            &format!("/api/tasks/{id}/move?status=Done&agent=Architect"),
        ),
    )
    .await;
    assert_eq!(denied, StatusCode::FORBIDDEN);
    assert_eq!(
        body["detail"],
        "only User can mark tasks as done, not 'Architect'"
    );

    let (accepted, outcome) = call(
        &harness.app,
        empty_request(
            Method::POST,
            &format!("/api/tasks/{id}/move?status=Done&agent=User"),
        ),
    )
    .await;
    assert_eq!(accepted, StatusCode::OK);
    assert_eq!(outcome["new_status"], "Done");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_to_review_raises_an_action_item(harness: Harness) {
    let id = create_task(&harness.app, "Threat model", "Architect").await;

    let (status, outcome) = call(
        &harness.app,
        empty_request(Method::POST, &format!("/api/tasks/{id}/move?status=Review")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["action_item_created"], true);
    assert_eq!(outcome["agent_spawned"], false);

    let (status, items) = call(
        &harness.app,
        empty_request(Method::GET, &format!("/api/tasks/{id}/action-items")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = items.as_array().expect("item list");
    assert_eq!(items.len(), 1);
    assert_eq!(
        items.first().map(|item| item["content"].clone()),
        Some(json!("Ready for review: Threat model"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_into_progress_reports_a_spawn(harness: Harness) {
    let id = create_task(&harness.app, "Rotate keys", "Architect").await;

    let (status, outcome) = call(
        &harness.app,
        empty_request(
            Method::POST,
            &format!("/api/tasks/{id}/move?status=In%20Progress"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["new_status"], "In Progress");
    assert_eq!(outcome["agent_spawned"], true);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comments_report_resolved_mentions(harness: Harness) {
    let id = create_task(&harness.app, "API design", "Architect").await;

    let (status, posted) = call(
        &harness.app,
        json_request(
            Method::POST,
            &format!("/api/tasks/{id}/comments"),
            &json!({ "agent": "User", "content": "@code reviewer please check" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(posted["mentions"], json!(["Code Reviewer"]));
}

#[rstest]
#[case(None, StatusCode::UNAUTHORIZED)]
#[case(Some((AUTHORIZATION.as_str(), "Bearer wrong")), StatusCode::UNAUTHORIZED)]
#[case(Some((AUTHORIZATION.as_str(), "Bearer push-secret")), StatusCode::OK)]
#[case(Some((API_KEY_HEADER, PUSH_KEY)), StatusCode::OK)]
#[tokio::test(flavor = "multi_thread")]
async fn agent_push_requires_the_api_key(
    harness: Harness,
    #[case] header: Option<(&str, &str)>,
    #[case] expected: StatusCode,
) {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/chat/respond")
        .header(CONTENT_TYPE, "application/json");
    if let Some((name, value)) = header {
        builder = builder.header(name, value);
    }
    let request = builder
        .body(Body::from(json!({ "response": "done" }).to_string()))
        .expect("valid request");

    let (status, _) = call(&harness.app, request).await;

    assert_eq!(status, expected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn chat_send_relays_to_the_main_session(harness: Harness) {
    harness.coordinator.set_reply(Some("On it.".to_owned()));

    let (status, outcome) = call(
        &harness.app,
        json_request(
            Method::POST,
            "/api/chat/send",
            &json!({ "message": "What is blocked?" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["sent"], true);

    let (status, history) = call(
        &harness.app,
        empty_request(Method::GET, "/api/chat/history"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["session"], "main");
    assert_eq!(history["history"].as_array().map(Vec::len), Some(2));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn config_exposes_roster_and_branding(harness: Harness) {
    let (status, config) = call(&harness.app, empty_request(Method::GET, "/api/config")).await;

    assert_eq!(status, StatusCode::OK);
    let agents: Vec<&str> = config["agents"]
        .as_array()
        .expect("agent list")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(agents.first(), Some(&"Jarvis"));
    assert!(agents.contains(&"Architect"));
    assert_eq!(agents.last(), Some(&"Unassigned"));
    assert_eq!(
        config["statuses"],
        json!(["Backlog", "In Progress", "Review", "Done", "Blocked"])
    );
    assert_eq!(config["branding"]["boardTitle"], "Task Board");
}
