//! GraphQL documents and the response shapes they decode into.
//!
//! Module-scoped queries take the module id as `$eventId`, so identical
//! requests for the same module collapse in the client's in-flight table.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::model::{ProgressRecord, Transaction, UserInfo};

/// Signed-in user's identity.
pub const USER_INFO_QUERY: &str = r#"
{
  user {
    id
    login
    firstName
    lastName
    email
  }
}
"#;

/// XP transactions for one module, oldest first.
pub const XP_QUERY: &str = r#"
query Xp($eventId: Int!) {
  transaction(
    where: { _and: [{ type: { _eq: "xp" } }, { eventId: { _eq: $eventId } }] }
    order_by: { createdAt: asc }
  ) {
    id
    amount
    type
    path
    createdAt
  }
}
"#;

/// Graded attempts for one module.
pub const PROGRESS_QUERY: &str = r#"
query Progress($eventId: Int!) {
  progress(where: { eventId: { _eq: $eventId } }, order_by: { createdAt: desc }) {
    id
    grade
    path
    createdAt
    updatedAt
  }
}
"#;

/// Audit transactions for one module: `up` are audits given, `down` audits
/// received.
pub const AUDITS_QUERY: &str = r#"
query Audits($eventId: Int!) {
  up: transaction(where: { _and: [{ type: { _eq: "up" } }, { eventId: { _eq: $eventId } }] }) {
    id
    amount
    type
    path
    createdAt
  }
  down: transaction(where: { _and: [{ type: { _eq: "down" } }, { eventId: { _eq: $eventId } }] }) {
    id
    amount
    type
    path
    createdAt
  }
}
"#;

/// Variables for a module-scoped query.
pub fn module_variables(module_id: u32) -> Value {
    json!({ "eventId": module_id })
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct UserData {
    #[serde(default)]
    pub user: Vec<UserInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionData {
    #[serde(default)]
    pub transaction: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressData {
    #[serde(default)]
    pub progress: Vec<ProgressRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuditData {
    #[serde(default)]
    pub up: Vec<Transaction>,
    #[serde(default)]
    pub down: Vec<Transaction>,
}
