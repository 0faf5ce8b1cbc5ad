//! HTTP adapter for the agent orchestration gateway.
//!
//! The gateway exposes a single tool-invocation endpoint,
//! `POST {base}/tools/invoke` with body `{"tool": ..., "args": {...}}`,
//! answering `{"ok": bool, "result": {...}}`. Wake notifications and
//! session aborts use dedicated endpoints.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

use crate::agent::{
    domain::{SessionInfo, SessionKey, SpawnRequest, SpawnedSession},
    ports::{SessionCoordinator, SessionCoordinatorError, SessionCoordinatorResult},
};

const ABORT_MESSAGE: &str = "SYSTEM: ABORT - User requested stop from Task Board";
const CONVERSE_REPLY_SECONDS: u64 = 90;
const SESSION_LIST_LIMIT: u64 = 50;
const ERROR_BODY_CHARS: usize = 200;

/// Connection settings for [`GatewaySessionCoordinator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOptions {
    /// Gateway base URL without a trailing slash.
    pub base_url: String,
    /// Bearer token presented on every call.
    pub token: String,
    /// Bound for short calls: messaging, listing, stopping, notifying.
    pub request_timeout: Duration,
    /// Bound for spawning a session.
    pub spawn_timeout: Duration,
    /// Bound for a conversational round trip.
    pub converse_timeout: Duration,
}

/// Session coordinator backed by the orchestration gateway's HTTP API.
#[derive(Debug, Clone)]
pub struct GatewaySessionCoordinator {
    client: reqwest::Client,
    options: GatewayOptions,
}

impl GatewaySessionCoordinator {
    /// Creates a coordinator using a fresh HTTP client.
    #[must_use]
    pub fn new(options: GatewayOptions) -> Self {
        Self::with_client(reqwest::Client::new(), options)
    }

    /// Creates a coordinator using an existing HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, mut options: GatewayOptions) -> Self {
        options.base_url = options.base_url.trim_end_matches('/').to_owned();
        Self { client, options }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.options.base_url)
    }

    async fn post(
        &self,
        path: &str,
        body: Option<&Value>,
        timeout: Duration,
    ) -> SessionCoordinatorResult<reqwest::Response> {
        let mut request = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.options.token)
            .timeout(timeout);
        if let Some(payload) = body {
            request = request.json(payload);
        }
        request.send().await.map_err(|err| classify(err, timeout))
    }

    /// Invokes a gateway tool and returns its `result` payload.
    async fn invoke(
        &self,
        tool: &str,
        args: Value,
        timeout: Duration,
    ) -> SessionCoordinatorResult<Value> {
        let payload = json!({ "tool": tool, "args": args });
        let response = self.post("/tools/invoke", Some(&payload), timeout).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SessionCoordinatorError::Rejected(format!(
                "{tool}: HTTP {status}: {}",
                truncate(&body, ERROR_BODY_CHARS)
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| classify(err, timeout))?;
        if body.get("ok").and_then(Value::as_bool) != Some(true) {
            return Err(SessionCoordinatorError::Rejected(format!(
                "{tool}: {}",
                truncate(&body.to_string(), ERROR_BODY_CHARS)
            )));
        }
        debug!(tool, "gateway tool invoked");
        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> SessionCoordinatorError {
    if err.is_timeout() {
        SessionCoordinatorError::Timeout(timeout)
    } else if err.is_connect() {
        warn!(error = %err, "agent gateway unreachable");
        SessionCoordinatorError::Unavailable
    } else {
        SessionCoordinatorError::transport(err)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// Extracts the conversational reply from a `sessions_send` result.
fn extract_reply(result: &Value) -> Option<String> {
    let reply = result
        .get("details")
        .and_then(|details| details.get("reply"))
        .filter(|value| !value.is_null())
        .or_else(|| result.get("reply").filter(|value| !value.is_null()))
        .or_else(|| result.get("response").filter(|value| !value.is_null()))?;
    match reply {
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Parses a `sessions_list` result.
///
/// The listing arrives either directly or as JSON text inside the first
/// content block.
fn parse_session_list(result: &Value) -> Vec<SessionInfo> {
    let embedded = result
        .get("content")
        .and_then(Value::as_array)
        .and_then(|blocks| blocks.first())
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .and_then(|text| serde_json::from_str::<Value>(text).ok());
    let listing = embedded.as_ref().unwrap_or(result);

    listing
        .get("sessions")
        .and_then(Value::as_array)
        .map(|sessions| {
            sessions
                .iter()
                .filter_map(|session| {
                    let key = string_field(session, "key")?;
                    Some(SessionInfo {
                        key,
                        label: string_field(session, "label"),
                        display_name: string_field(session, "displayName"),
                        channel: string_field(session, "channel").unwrap_or_default(),
                        model: string_field(session, "model").unwrap_or_default(),
                        updated_at: session
                            .get("updatedAt")
                            .and_then(Value::as_i64)
                            .unwrap_or_default(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl SessionCoordinator for GatewaySessionCoordinator {
    async fn spawn_session(
        &self,
        request: SpawnRequest,
    ) -> SessionCoordinatorResult<SpawnedSession> {
        let args = json!({
            "agentId": request.agent_id.as_str(),
            "task": request.prompt,
            "label": request.label,
            "cleanup": request.cleanup.as_str(),
        });
        let result = self
            .invoke("sessions_spawn", args, self.options.spawn_timeout)
            .await?;
        Ok(SpawnedSession {
            session_key: string_field(&result, "childSessionKey")
                .and_then(|key| SessionKey::new(key).ok()),
            run_id: string_field(&result, "runId"),
        })
    }

    async fn send_to_session(
        &self,
        session_key: &SessionKey,
        message: &str,
    ) -> SessionCoordinatorResult<bool> {
        let args = json!({ "sessionKey": session_key.as_str(), "message": message });
        match self
            .invoke("sessions_send", args, self.options.request_timeout)
            .await
        {
            Ok(_) => Ok(true),
            Err(SessionCoordinatorError::Rejected(reason)) => {
                debug!(session_key = %session_key, %reason, "session did not accept message");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    async fn converse(
        &self,
        session_key: &SessionKey,
        message: &str,
    ) -> SessionCoordinatorResult<Option<String>> {
        let args = json!({
            "sessionKey": session_key.as_str(),
            "message": message,
            "timeoutSeconds": CONVERSE_REPLY_SECONDS,
        });
        let result = self
            .invoke("sessions_send", args, self.options.converse_timeout)
            .await?;
        Ok(extract_reply(&result))
    }

    async fn list_sessions(&self) -> SessionCoordinatorResult<Vec<SessionInfo>> {
        let args = json!({ "limit": SESSION_LIST_LIMIT, "messageLimit": 0 });
        let result = self
            .invoke("sessions_list", args, self.options.request_timeout)
            .await?;
        Ok(parse_session_list(&result))
    }

    async fn stop_session(&self, session_key: &SessionKey) -> SessionCoordinatorResult<()> {
        let delivered = self.send_to_session(session_key, ABORT_MESSAGE).await?;
        let abort_path = format!("/api/sessions/{session_key}/abort");
        match self
            .post(&abort_path, None, self.options.request_timeout)
            .await
        {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(_) | Err(_) if delivered => Ok(()),
            Ok(response) => Err(SessionCoordinatorError::Rejected(format!(
                "abort {session_key}: HTTP {}",
                response.status()
            ))),
            Err(err) => Err(err),
        }
    }

    async fn delete_session(&self, session_key: &SessionKey) -> SessionCoordinatorResult<bool> {
        // TODO: the gateway has no documented deletion tool yet; switch to its
        // session-store API once one is published.
        let args = json!({ "sessionKey": session_key.as_str() });
        match self
            .invoke("sessions_delete", args, self.options.request_timeout)
            .await
        {
            Ok(_) => Ok(true),
            Err(SessionCoordinatorError::Rejected(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn notify(&self, text: &str) -> SessionCoordinatorResult<()> {
        let payload = json!({ "action": "wake", "text": text });
        let response = self
            .post("/api/cron/wake", Some(&payload), self.options.request_timeout)
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(SessionCoordinatorError::Rejected(format!(
                "wake: HTTP {}",
                response.status()
            )))
        }
    }
}
