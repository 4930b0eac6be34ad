//! One-pass aggregations over transaction and progress collections.
//!
//! Every function here is pure and total: empty input yields zero, empty
//! collections or a placeholder value, never a panic or a non-finite float.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Serialize, Serializer};

use crate::analytics::format::{month_label, project_name};
use crate::model::{ProgressRecord, ProgressStatus, Transaction};

// ---------------------------------------------------------------------------
// Totals and grouping
// ---------------------------------------------------------------------------

/// Sum of all amounts.
pub fn total_amount(transactions: &[Transaction]) -> i64 {
    transactions.iter().map(|tx| tx.amount).sum()
}

/// Sum amounts per project, keyed by the last path segment.
///
/// Entries keep the order in which each project first appears.
pub fn group_by_leaf_path(transactions: &[Transaction]) -> Vec<(String, i64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, i64)> = Vec::new();

    for tx in transactions {
        let name = project_name(&tx.path);
        match index.get(name) {
            Some(&i) => groups[i].1 += tx.amount,
            None => {
                index.insert(name, groups.len());
                groups.push((name.to_string(), tx.amount));
            }
        }
    }
    groups
}

/// Highest `n` groups, descending. Equal values keep their input order.
pub fn top_n(groups: &[(String, i64)], n: usize) -> Vec<(String, i64)> {
    let mut sorted = groups.to_vec();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    sorted.truncate(n);
    sorted
}

// ---------------------------------------------------------------------------
// Monthly buckets
// ---------------------------------------------------------------------------

/// Transactions created in one calendar month (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub total: i64,
    pub count: usize,
}

impl MonthBucket {
    pub fn label(&self) -> String {
        month_label(self.year, self.month)
    }

    /// First day of the bucket's month.
    pub fn start(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

/// Group by `(year, month)` of `created_at`, ascending.
pub fn bucket_by_month(transactions: &[Transaction]) -> Vec<MonthBucket> {
    let mut months: BTreeMap<(i32, u32), (i64, usize)> = BTreeMap::new();
    for tx in transactions {
        let key = (tx.created_at.year(), tx.created_at.month());
        let entry = months.entry(key).or_insert((0, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
    }

    months
        .into_iter()
        .map(|((year, month), (total, count))| MonthBucket { year, month, total, count })
        .collect()
}

/// The last `n` buckets of an ascending bucket list.
pub fn recent_months(buckets: &[MonthBucket], n: usize) -> &[MonthBucket] {
    &buckets[buckets.len().saturating_sub(n)..]
}

/// Newest transaction, if any.
pub fn most_recent(transactions: &[Transaction]) -> Option<&Transaction> {
    transactions.iter().max_by_key(|tx| tx.created_at)
}

/// Timestamp of the newest transaction.
pub fn last_activity(transactions: &[Transaction]) -> Option<DateTime<Utc>> {
    most_recent(transactions).map(|tx| tx.created_at)
}

// ---------------------------------------------------------------------------
// Pass / fail
// ---------------------------------------------------------------------------

/// Graded outcomes. `passed + failed + pending` is always the input length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassFail {
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
}

impl PassFail {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.pending
    }

    pub fn graded(&self) -> usize {
        self.passed + self.failed
    }

    /// Percentage of graded records that passed; `None` when nothing is graded.
    pub fn pass_rate(&self) -> Option<f64> {
        let graded = self.graded();
        (graded > 0).then(|| self.passed as f64 / graded as f64 * 100.0)
    }
}

pub fn pass_fail_counts(records: &[ProgressRecord]) -> PassFail {
    records.iter().fold(PassFail::default(), |mut acc, record| {
        match record.status() {
            ProgressStatus::Passed => acc.passed += 1,
            ProgressStatus::Failed => acc.failed += 1,
            ProgressStatus::Pending => acc.pending += 1,
        }
        acc
    })
}

// ---------------------------------------------------------------------------
// Audit ratio
// ---------------------------------------------------------------------------

/// Audits given divided by audits received.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuditRatio {
    Ratio(f64),
    /// Nothing received yet.
    NotAvailable,
}

impl AuditRatio {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Ratio(r) => Some(r),
            Self::NotAvailable => None,
        }
    }
}

impl fmt::Display for AuditRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ratio(r) => write!(f, "{r:.2}"),
            Self::NotAvailable => write!(f, "N/A"),
        }
    }
}

impl Serialize for AuditRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ratio(r) => serializer.serialize_f64(*r),
            Self::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

pub fn audit_ratio(given: i64, received: i64) -> AuditRatio {
    if received > 0 {
        AuditRatio::Ratio(given as f64 / received as f64)
    } else {
        AuditRatio::NotAvailable
    }
}

// ---------------------------------------------------------------------------
// Skill level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Advanced => write!(f, "advanced"),
            Self::Expert => write!(f, "expert"),
        }
    }
}

/// Tiered classification. Every threshold is a strict `>`.
pub fn classify_skill_level(percent: f64, project_count: usize, pass_rate: f64) -> SkillLevel {
    if percent > 15.0 || (project_count > 10 && pass_rate > 80.0) {
        SkillLevel::Expert
    } else if percent > 10.0 || (project_count > 5 && pass_rate > 70.0) {
        SkillLevel::Advanced
    } else if percent > 5.0 || (project_count > 3 && pass_rate > 50.0) {
        SkillLevel::Intermediate
    } else {
        SkillLevel::Beginner
    }
}
