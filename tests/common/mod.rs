//! Shared fixtures for the integration tests: token builders and a scripted
//! in-memory transport that counts requests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use serde_json::{Map, Value, json};

use xpdash::client::{HttpResponse, Transport};
use xpdash::config::XpdashConfig;
use xpdash::events::EventLog;
use xpdash::router::App;
use xpdash::session::{SessionManager, encode_claims};
use xpdash::storage::{KeyValueStore, MemoryStore, TOKEN_KEY};

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn token_expiring_at(exp: i64) -> String {
    let mut claims = Map::new();
    claims.insert("sub".to_string(), json!("4242"));
    claims.insert("exp".to_string(), json!(exp));
    encode_claims(&claims)
}

pub fn live_token() -> String {
    token_expiring_at(Utc::now().timestamp() + 3600)
}

pub fn expired_token() -> String {
    token_expiring_at(Utc::now().timestamp() - 1)
}

// ---------------------------------------------------------------------------
// Fixture data
// ---------------------------------------------------------------------------

pub fn user_body() -> Value {
    json!({ "data": { "user": [{
        "id": 4242,
        "login": "jdoe",
        "firstName": "Jane",
        "lastName": "Doe",
        "email": "jane@example.com"
    }]}})
}

pub fn xp_body() -> Value {
    json!({ "data": { "transaction": [
        { "id": 1, "amount": 1000, "type": "xp", "path": "/kisumu/module/go-reloaded", "createdAt": "2024-05-02T10:00:00Z" },
        { "id": 2, "amount": 500, "type": "xp", "path": "/kisumu/module/ascii-art", "createdAt": "2024-06-10T10:00:00Z" },
        { "id": 3, "amount": 250, "type": "xp", "path": "/kisumu/module/js/quest-01", "createdAt": "2024-08-28T10:00:00Z" }
    ]}})
}

pub fn progress_body() -> Value {
    json!({ "data": { "progress": [
        { "id": 11, "grade": 1.2, "path": "/kisumu/module/go-reloaded", "createdAt": "2024-05-01T10:00:00Z" },
        { "id": 12, "grade": 0.0, "path": "/kisumu/module/ascii-art", "createdAt": "2024-06-01T10:00:00Z" },
        { "id": 13, "grade": null, "path": "/kisumu/module/js/quest-01", "createdAt": "2024-08-27T10:00:00Z" }
    ]}})
}

pub fn audits_body() -> Value {
    json!({ "data": {
        "up": [
            { "id": 21, "amount": 300, "type": "up", "path": "/kisumu/module/go-reloaded", "createdAt": "2024-05-05T10:00:00Z" }
        ],
        "down": [
            { "id": 22, "amount": 200, "type": "down", "path": "/kisumu/module/go-reloaded", "createdAt": "2024-05-06T10:00:00Z" }
        ]
    }})
}

// ---------------------------------------------------------------------------
// Fake transport
// ---------------------------------------------------------------------------

/// Which endpoint or query a request was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    SignIn,
    User,
    Xp,
    Progress,
    Audits,
}

fn classify(url: &str, body: Option<&Value>) -> Call {
    let query = body
        .and_then(|b| b.get("query"))
        .and_then(Value::as_str)
        .unwrap_or("");
    if body.is_none() || url.contains("signin") {
        Call::SignIn
    } else if query.contains("Audits") {
        Call::Audits
    } else if query.contains("Progress") {
        Call::Progress
    } else if query.contains("Xp") {
        Call::Xp
    } else {
        Call::User
    }
}

/// Answers every request from fixtures unless a call is scripted to fail.
#[derive(Default)]
pub struct FakeTransport {
    calls: Mutex<Vec<Call>>,
    count: AtomicUsize,
    delay: Mutex<Option<Duration>>,
    signin: Mutex<Option<HttpResponse>>,
    overrides: Mutex<Vec<(Call, HttpResponse)>>,
    authorizations: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sleep this long inside every request.
    pub fn with_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn signin_response(&self, status: u16, body: &str) {
        *self.signin.lock().unwrap() = Some(HttpResponse { status, body: body.to_string() });
    }

    /// Answer every later `call` with this response instead of the fixture.
    pub fn respond(&self, call: Call, status: u16, body: Value) {
        self.overrides
            .lock()
            .unwrap()
            .push((call, HttpResponse { status, body: body.to_string() }));
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn count_of(&self, call: Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    pub fn authorizations(&self) -> Vec<String> {
        self.authorizations.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    fn post(&self, url: &str, authorization: &str, body: Option<&Value>) -> Result<HttpResponse, String> {
        let call = classify(url, body);
        self.count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call);
        self.authorizations.lock().unwrap().push(authorization.to_string());

        if let Some(delay) = *self.delay.lock().unwrap() {
            thread::sleep(delay);
        }

        if let Some((_, resp)) = self.overrides.lock().unwrap().iter().rev().find(|(c, _)| *c == call) {
            return Ok(resp.clone());
        }

        let body = match call {
            Call::SignIn => {
                return Ok(self.signin.lock().unwrap().clone().unwrap_or_else(|| HttpResponse {
                    status: 200,
                    body: json!(live_token()).to_string(),
                }));
            }
            Call::User => user_body(),
            Call::Xp => xp_body(),
            Call::Progress => progress_body(),
            Call::Audits => audits_body(),
        };
        Ok(HttpResponse { status: 200, body: body.to_string() })
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub fn memory_store() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

pub fn session_with(store: &Arc<dyn KeyValueStore>) -> Arc<SessionManager> {
    Arc::new(SessionManager::new(Arc::clone(store), EventLog::disabled()))
}

/// An app over memory storage and `transport`, optionally pre-seeded with a
/// stored token, already started.
pub fn app_with(transport: Arc<FakeTransport>, token: Option<&str>) -> (App, Arc<dyn KeyValueStore>) {
    let store = memory_store();
    if let Some(token) = token {
        store.set(TOKEN_KEY, token).unwrap();
    }
    let mut app = App::new(
        XpdashConfig::default(),
        Arc::clone(&store),
        transport,
        EventLog::disabled(),
    );
    app.start();
    (app, store)
}
