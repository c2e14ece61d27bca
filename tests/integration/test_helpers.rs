//! Shared test helpers for client and monitor integration tests.
//!
//! Provides [`ScriptedTransport`], an in-memory [`Transport`] that answers
//! requests from per-route reply queues and records every call, plus small
//! JSON builders for sessions and activities.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use jules_relay::transport::{ApiRequest, Transport};
use jules_relay::{AppError, Result, SessionClient};
use serde_json::{json, Value};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16, String),
    Unreachable(String),
}

/// Route key for a request: `METHOD path`, plus `?pageToken=..` when set.
pub fn route_key(request: &ApiRequest) -> String {
    match request.query_value("pageToken") {
        Some(token) => format!("{} {}?pageToken={token}", request.method, request.path),
        None => format!("{} {}", request.method, request.path),
    }
}

/// Transport answering from scripted queues.
///
/// Each route holds a queue of replies consumed front to back; the last
/// reply is sticky and repeats for every further call. Unscripted routes
/// answer `404`.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a JSON reply for `route` (e.g. `"GET sessions/1"`).
    pub fn respond(&self, route: &str, body: Value) {
        self.push(route, Reply::Json(body));
    }

    /// Queue a non-success status for `route`.
    pub fn fail(&self, route: &str, status: u16, body: &str) {
        self.push(route, Reply::Status(status, body.to_owned()));
    }

    /// Queue a transport-level failure for `route`.
    pub fn unreachable(&self, route: &str, msg: &str) {
        self.push(route, Reply::Unreachable(msg.to_owned()));
    }

    fn push(&self, route: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry(route.to_owned())
            .or_default()
            .push_back(reply);
    }

    /// Every request received, in order.
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of requests whose route key equals `route`.
    pub fn count(&self, route: &str) -> usize {
        self.calls()
            .iter()
            .filter(|request| route_key(request) == route)
            .count()
    }

    /// Number of requests whose path starts with `prefix`.
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|request| request.path.starts_with(prefix))
            .count()
    }

    fn next_reply(&self, key: &str) -> Result<Value> {
        let mut routes = self.routes.lock().unwrap();
        let reply = match routes.get_mut(key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        match reply {
            Some(Reply::Json(body)) => Ok(body),
            Some(Reply::Status(status, body)) => Err(AppError::Remote { status, body }),
            Some(Reply::Unreachable(msg)) => Err(AppError::Transport(msg)),
            None => Err(AppError::Remote {
                status: 404,
                body: format!("unscripted route: {key}"),
            }),
        }
    }
}

impl Transport for ScriptedTransport {
    fn call(&self, request: ApiRequest) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>> {
        let reply = self.next_reply(&route_key(&request));
        self.calls.lock().unwrap().push(request);
        Box::pin(async move { reply })
    }
}

/// Client over `transport` with default page sizes.
pub fn client(transport: &Arc<ScriptedTransport>) -> SessionClient {
    SessionClient::new(Arc::clone(transport) as Arc<dyn Transport>)
}

/// Session snapshot with no outputs.
pub fn session(id: &str) -> Value {
    json!({
        "name": format!("sessions/{id}"),
        "id": id,
        "title": "Refactor parser",
        "prompt": "Split the tokenizer out of the parser",
        "sourceContext": {
            "source": "sources/github/acme/widgets",
            "githubRepoContext": { "startingBranch": "main" }
        },
        "automationMode": "AUTO_CREATE_PR"
    })
}

/// Session snapshot carrying a pull request output.
pub fn session_with_pr(id: &str, url: &str) -> Value {
    let mut body = session(id);
    body["outputs"] = json!([{ "pullRequest": { "url": url, "title": "Refactor parser" } }]);
    body
}

/// Activity listing holding a single record.
pub fn latest(activity: Value) -> Value {
    json!({ "activities": [activity], "nextPageToken": "older" })
}

pub fn progress(title: &str) -> Value {
    json!({ "id": title, "originator": "agent", "progressUpdated": { "title": title } })
}

pub fn completed() -> Value {
    json!({ "id": "done", "originator": "system", "sessionCompleted": {} })
}
