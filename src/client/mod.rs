/// GraphQL data client for the grading platform.
///
/// Sends authenticated queries to the single configured endpoint using the
/// synchronous `ureq` HTTP client. Provides:
///
/// - **Sign-in**: exchange Basic credentials for a bearer token.
/// - **Execute**: run a query with `Authorization: Bearer <token>`.
/// - **Typed fetchers**: user, XP, progress and audit collections.
///
/// Authentication failures are classified once, here. Whether they arrive
/// as an HTTP 401/403, a GraphQL `extensions.code`, or only as error text,
/// they become [`ClientError::Auth`] and the session is invalidated before
/// the error is returned.
///
/// Identical queries (same text and variables) that are in flight at the
/// same time share one network call: the first caller sends it, later
/// callers block until its result is available and receive a clone.
pub mod error;
pub mod queries;

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::schema::ApiConfig;
use crate::events::{EventKind, EventLog};
use crate::model::{Audits, ProgressRecord, Transaction, TransactionKind, UserInfo};
use crate::session::{SessionManager, has_token_shape};

pub use error::{ClientError, ErrorKind};
use queries::{AuditData, ProgressData, TransactionData, UserData};

/// GraphQL `extensions.code` values that mean the token was refused.
const AUTH_ERROR_CODES: &[&str] = &["invalid-jwt", "invalid-headers", "access-denied"];

/// Error-text fragments that mean the token was refused.
const AUTH_KEYWORDS: &[&str] = &["jwt", "token", "auth"];

/// Error-text fragments that point at a bad module scope.
const MODULE_KEYWORDS: &[&str] = &["module", "event"];

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One blocking HTTP POST.
///
/// Non-success statuses are returned as responses; `Err` is reserved for
/// failures where no response arrived at all.
pub trait Transport: Send + Sync {
    fn post(&self, url: &str, authorization: &str, body: Option<&Value>) -> Result<HttpResponse, String>;
}

/// Production transport over `ureq`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    timeout: Duration,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Transport for UreqTransport {
    fn post(&self, url: &str, authorization: &str, body: Option<&Value>) -> Result<HttpResponse, String> {
        let request = ureq::post(url)
            .timeout(self.timeout)
            .set("Authorization", authorization)
            .set("Accept", "application/json");

        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        match result {
            Ok(resp) => {
                let status = resp.status();
                let body = resp
                    .into_string()
                    .map_err(|e| format!("failed to read response body: {e}"))?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, resp)) => Ok(HttpResponse {
                status,
                body: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(e)) => Err(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GraphQlError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    extensions: Option<Value>,
}

impl GraphQlError {
    fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.get("code")?.as_str()
    }

    fn is_auth(&self) -> bool {
        self.code().is_some_and(|c| AUTH_ERROR_CODES.contains(&c))
            || mentions_any(&self.message, AUTH_KEYWORDS)
    }
}

fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// Map a non-empty GraphQL error array onto a client error.
fn classify_errors(errors: &[GraphQlError]) -> ClientError {
    let joined = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    if errors.iter().any(GraphQlError::is_auth) {
        ClientError::Auth(joined)
    } else if errors.iter().any(|e| mentions_any(&e.message, MODULE_KEYWORDS)) {
        ClientError::Module(joined)
    } else {
        ClientError::GraphQl(joined)
    }
}

/// `error` or `message` field of a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|k| value.get(*k)?.as_str().map(str::to_string))
}

/// Pull a compact token out of a sign-in response body.
///
/// Accepts a JSON string, a JSON object with `token`/`jwt`/`access_token`,
/// or the raw token as plain text.
fn extract_token(body: &str) -> Option<String> {
    let trimmed = body.trim();
    let candidate = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(s)) => s,
        Ok(Value::Object(map)) => ["token", "jwt", "access_token"]
            .iter()
            .find_map(|k| map.get(*k)?.as_str().map(str::to_string))?,
        _ => trimmed.to_string(),
    };
    has_token_shape(&candidate).then_some(candidate)
}

// ---------------------------------------------------------------------------
// In-flight de-duplication
// ---------------------------------------------------------------------------

type QueryResult = Result<Value, ClientError>;

#[derive(Default)]
struct InFlight {
    result: Mutex<Option<QueryResult>>,
    ready: Condvar,
}

impl InFlight {
    fn wait(&self) -> QueryResult {
        let mut guard = self.result.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(result) = guard.as_ref() {
                return result.clone();
            }
            guard = self.ready.wait(guard).unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn fill(&self, result: QueryResult) {
        let mut guard = self.result.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(result);
        self.ready.notify_all();
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated GraphQL client. Shared by reference across loader threads.
pub struct GraphqlClient {
    endpoint: String,
    signin_url: String,
    transport: Arc<dyn Transport>,
    session: Arc<SessionManager>,
    events: EventLog,
    in_flight: Mutex<HashMap<String, Arc<InFlight>>>,
}

impl GraphqlClient {
    /// Build a client over an explicit transport.
    pub fn new(
        api: &ApiConfig,
        transport: Arc<dyn Transport>,
        session: Arc<SessionManager>,
        events: EventLog,
    ) -> Self {
        Self {
            endpoint: api.graphql_url.clone(),
            signin_url: api.signin_url.clone(),
            transport,
            session,
            events,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Build a client that talks to the network via `ureq`.
    pub fn from_config(api: &ApiConfig, session: Arc<SessionManager>, events: EventLog) -> Self {
        let transport = Arc::new(UreqTransport::new(Duration::from_millis(api.timeout_ms)));
        Self::new(api, transport, session, events)
    }

    /// The session this client authenticates with.
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Exchange credentials for a token and store it in the session.
    ///
    /// Username and password are trimmed before encoding.
    pub fn sign_in(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let credentials =
            general_purpose::STANDARD.encode(format!("{}:{}", username.trim(), password.trim()));
        let result = self.request_token(&format!("Basic {credentials}"));

        match &result {
            Ok(_) => self.events.record_with(EventKind::Login, username.trim()),
            Err(e) => self.events.record_with(EventKind::LoginFailed, e.to_string()),
        }
        result
    }

    fn request_token(&self, authorization: &str) -> Result<String, ClientError> {
        let response = self
            .transport
            .post(&self.signin_url, authorization, None)
            .map_err(ClientError::Transport)?;

        if !response.is_success() {
            let message = error_message(&response.body)
                .unwrap_or_else(|| format!("invalid credentials (status {})", response.status));
            return Err(ClientError::Auth(message));
        }

        let token = extract_token(&response.body)
            .ok_or_else(|| ClientError::Auth("no valid token received from server".to_string()))?;

        if !self.session.set_token(&token) {
            return Err(ClientError::Auth("could not store session token".to_string()));
        }
        Ok(token)
    }

    /// Run a query and return its `data` object.
    ///
    /// Requires a live session. Auth-kind failures log the user out before
    /// returning.
    pub fn execute(&self, query: &str, variables: &Value) -> Result<Value, ClientError> {
        let token = self
            .session
            .valid_token()
            .ok_or(ClientError::NotAuthenticated)?;

        let key = json!({ "query": query, "variables": variables }).to_string();
        let (slot, leader) = self.claim(&key);
        if !leader {
            return slot.wait();
        }

        let result = self.send(query, variables, &token);
        if let Err(e) = &result {
            self.events.record_with(EventKind::QueryFailed, e.to_string());
            if e.is_auth() {
                self.session.invalidate(&e.to_string());
            }
        }

        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        slot.fill(result.clone());
        result
    }

    /// Join an in-flight request for `key`, or register a new one.
    ///
    /// Returns the shared slot and whether this caller must send.
    fn claim(&self, key: &str) -> (Arc<InFlight>, bool) {
        let mut pending = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = pending.get(key) {
            return (Arc::clone(slot), false);
        }
        let slot = Arc::new(InFlight::default());
        pending.insert(key.to_string(), Arc::clone(&slot));
        (slot, true)
    }

    fn send(&self, query: &str, variables: &Value, token: &str) -> QueryResult {
        let body = json!({ "query": query, "variables": variables });
        let response = self
            .transport
            .post(&self.endpoint, &format!("Bearer {token}"), Some(&body))
            .map_err(ClientError::Transport)?;

        if matches!(response.status, 401 | 403) {
            let message = error_message(&response.body)
                .unwrap_or_else(|| format!("token refused (status {})", response.status));
            return Err(ClientError::Auth(message));
        }
        if !response.is_success() {
            return Err(ClientError::Http {
                status: response.status,
                message: error_message(&response.body).unwrap_or_else(|| "request failed".to_string()),
            });
        }

        let envelope: GraphQlResponse = serde_json::from_str(&response.body)
            .map_err(|e| ClientError::Decode(format!("invalid JSON response: {e}")))?;

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            return Err(classify_errors(&errors));
        }

        envelope
            .data
            .ok_or_else(|| ClientError::Decode("response has no data".to_string()))
    }

    fn query<T: DeserializeOwned>(&self, query: &str, variables: &Value) -> Result<T, ClientError> {
        let data = self.execute(query, variables)?;
        serde_json::from_value(data).map_err(|e| ClientError::Decode(e.to_string()))
    }

    // -- Typed fetchers --

    /// The signed-in user.
    pub fn fetch_user(&self) -> Result<UserInfo, ClientError> {
        let data: UserData = self.query(queries::USER_INFO_QUERY, &json!({}))?;
        data.user
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Decode("no user record returned".to_string()))
    }

    /// XP transactions for a module.
    pub fn fetch_xp(&self, module_id: u32) -> Result<Vec<Transaction>, ClientError> {
        let data: TransactionData =
            self.query(queries::XP_QUERY, &queries::module_variables(module_id))?;
        Ok(data.transaction)
    }

    /// Progress records for a module.
    pub fn fetch_progress(&self, module_id: u32) -> Result<Vec<ProgressRecord>, ClientError> {
        let data: ProgressData =
            self.query(queries::PROGRESS_QUERY, &queries::module_variables(module_id))?;
        Ok(data.progress)
    }

    /// Audits given and received for a module.
    pub fn fetch_audits(&self, module_id: u32) -> Result<Audits, ClientError> {
        let data: AuditData =
            self.query(queries::AUDITS_QUERY, &queries::module_variables(module_id))?;
        Ok(Audits {
            given: with_kind(data.up, TransactionKind::AuditGiven),
            received: with_kind(data.down, TransactionKind::AuditReceived),
        })
    }
}

/// The alias a transaction arrived under decides its kind.
fn with_kind(mut transactions: Vec<Transaction>, kind: TransactionKind) -> Vec<Transaction> {
    for tx in &mut transactions {
        tx.kind = kind;
    }
    transactions
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn error(message: &str, code: Option<&str>) -> GraphQlError {
        GraphQlError {
            message: message.to_string(),
            extensions: code.map(|c| json!({ "code": c })),
        }
    }

    #[test]
    fn classify_auth_by_code_or_text() {
        assert!(classify_errors(&[error("Could not verify JWT: JWTExpired", None)]).is_auth());
        assert!(classify_errors(&[error("denied", Some("invalid-jwt"))]).is_auth());
        assert!(classify_errors(&[error("Missing Authorization header", None)]).is_auth());
    }

    #[test]
    fn classify_module_and_generic_errors() {
        assert!(matches!(
            classify_errors(&[error("field \"eventId\" not found", None)]),
            ClientError::Module(_)
        ));
        assert_eq!(
            classify_errors(&[error("syntax error", None), error("unexpected", None)]),
            ClientError::GraphQl("syntax error; unexpected".to_string())
        );
    }

    #[test]
    fn extract_token_variants() {
        assert_eq!(extract_token("\"a.b.c\"").as_deref(), Some("a.b.c"));
        assert_eq!(extract_token("a.b.c\n").as_deref(), Some("a.b.c"));
        assert_eq!(extract_token(r#"{"jwt":"x.y.z"}"#).as_deref(), Some("x.y.z"));
        assert_eq!(extract_token(r#"{"access_token":"x.y.z"}"#).as_deref(), Some("x.y.z"));
        assert_eq!(extract_token(r#"{"other":"x.y.z"}"#), None);
        assert_eq!(extract_token("\"nodots\""), None);
    }

    #[test]
    fn error_message_reads_error_or_message() {
        assert_eq!(error_message(r#"{"error":"bad creds"}"#).as_deref(), Some("bad creds"));
        assert_eq!(error_message(r#"{"message":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(error_message("plain text"), None);
    }
}
