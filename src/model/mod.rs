//! Records fetched from the grading platform.
//!
//! Everything here is an immutable snapshot: the dashboard reads these
//! collections once per load and derives every panel from them. Records are
//! joined client-side by their `path` strings, never by identity.

pub mod modules;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub use modules::{DEFAULT_MODULE_ID, Module, find_module, module_catalog, module_number};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Basic identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserInfo {
    /// Full name when the platform knows it, otherwise the login.
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("").trim();
        let last = self.last_name.as_deref().unwrap_or("").trim();
        let full = format!("{first} {last}");
        let full = full.trim();
        if full.is_empty() {
            self.login.clone()
        } else {
            full.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// What a transaction records.
///
/// The platform calls audit transactions `up` (points earned by auditing
/// someone else) and `down` (points from being audited).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "xp")]
    Xp,
    #[serde(rename = "up")]
    AuditGiven,
    #[serde(rename = "down")]
    AuditReceived,
    #[serde(other)]
    Other,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xp => write!(f, "xp"),
            Self::AuditGiven => write!(f, "audit-given"),
            Self::AuditReceived => write!(f, "audit-received"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A single XP or audit transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    /// Missing, null or non-numeric amounts count as zero.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: i64,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub path: String,
    pub created_at: DateTime<Utc>,
}

fn default_kind() -> TransactionKind {
    TransactionKind::Other
}

/// Accept integers, floats, numeric strings and null for an amount.
fn lenient_amount<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(amount_from_value(&value))
}

pub(crate) fn amount_from_value(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.round() as i64)
            .unwrap_or(0),
        _ => 0,
    }
}

/// Audit transactions split by direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Audits {
    /// Points earned by auditing others.
    pub given: Vec<Transaction>,
    /// Points from being audited.
    pub received: Vec<Transaction>,
}

impl Audits {
    pub fn is_empty(&self) -> bool {
        self.given.is_empty() && self.received.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Outcome of a graded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Passed,
    Failed,
    /// No grade yet; waiting for peer review.
    Pending,
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// A graded (or pending) attempt at a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub id: i64,
    #[serde(rename = "path", default)]
    pub project_path: String,
    #[serde(default)]
    pub grade: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    /// A grade of 1 or more passes; any other present grade fails.
    pub fn status(&self) -> ProgressStatus {
        match self.grade {
            None => ProgressStatus::Pending,
            Some(g) if g >= 1.0 => ProgressStatus::Passed,
            Some(_) => ProgressStatus::Failed,
        }
    }

    /// Last time the record changed, falling back to its creation time.
    pub fn last_update(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
