//! Dashboard analytics: aggregation, skill estimation and formatting.
//!
//! - **aggregate**: totals, per-project sums, monthly buckets, pass/fail,
//!   audit ratio, skill-level tiers
//! - **skills**: keyword-based skill breakdown
//! - **format**: magnitudes, separators, relative times
//!
//! [`DashboardSummary`] bundles every derived panel value for one load.

pub mod aggregate;
pub mod format;
pub mod skills;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Audits, ProgressRecord, Transaction};

pub use aggregate::{
    AuditRatio, MonthBucket, PassFail, SkillLevel, audit_ratio, bucket_by_month,
    classify_skill_level, group_by_leaf_path, last_activity, most_recent, pass_fail_counts,
    recent_months, top_n, total_amount,
};
pub use format::{format_magnitude, format_number, project_name, time_ago};
pub use skills::{AggregatedSkill, aggregate_skills};

/// Every derived value shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_xp: i64,
    /// Distinct projects that earned XP.
    pub project_count: usize,
    pub top_projects: Vec<(String, i64)>,
    pub monthly: Vec<MonthBucket>,
    pub recent_months: Vec<MonthBucket>,
    pub pass_fail: PassFail,
    pub audits_given: i64,
    pub audits_received: i64,
    pub audit_ratio: AuditRatio,
    pub skills: Vec<AggregatedSkill>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl DashboardSummary {
    pub fn compute(
        xp: &[Transaction],
        progress: &[ProgressRecord],
        audits: &Audits,
        top: usize,
        recent: usize,
    ) -> Self {
        let groups = group_by_leaf_path(xp);
        let monthly = bucket_by_month(xp);
        let audits_given = total_amount(&audits.given);
        let audits_received = total_amount(&audits.received);

        Self {
            total_xp: total_amount(xp),
            project_count: groups.len(),
            top_projects: top_n(&groups, top),
            recent_months: recent_months(&monthly, recent).to_vec(),
            monthly,
            pass_fail: pass_fail_counts(progress),
            audits_given,
            audits_received,
            audit_ratio: audit_ratio(audits_given, audits_received),
            skills: aggregate_skills(xp, progress),
            last_activity: last_activity(xp),
        }
    }
}
