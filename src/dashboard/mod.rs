//! One dashboard load: the four data queries and everything derived from
//! them.
//!
//! The queries (user, XP, progress, audits) run on scoped threads and are
//! joined before anything is shown. There is no partial result: the first
//! failure in join order fails the whole load.

use std::thread::{self, ScopedJoinHandle};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::{DashboardSummary, bucket_by_month, group_by_leaf_path, pass_fail_counts};
use crate::charts::{self, Chart, ChartKind, Size};
use crate::client::{ClientError, GraphqlClient};
use crate::config::schema::DisplayConfig;
use crate::model::{Audits, ProgressRecord, Transaction, UserInfo};

/// Raw collections for one module, fetched together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub module_id: u32,
    pub user: UserInfo,
    pub xp: Vec<Transaction>,
    pub progress: Vec<ProgressRecord>,
    pub audits: Audits,
    pub loaded_at: DateTime<Utc>,
}

fn join<T>(handle: ScopedJoinHandle<'_, Result<T, ClientError>>) -> Result<T, ClientError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(ClientError::Transport("query worker panicked".to_string())))
}

impl DashboardData {
    /// Issue the four queries concurrently and wait for all of them.
    pub fn load(client: &GraphqlClient, module_id: u32) -> Result<Self, ClientError> {
        thread::scope(|s| {
            let user = s.spawn(|| client.fetch_user());
            let xp = s.spawn(|| client.fetch_xp(module_id));
            let progress = s.spawn(|| client.fetch_progress(module_id));
            let audits = s.spawn(|| client.fetch_audits(module_id));

            Ok(Self {
                module_id,
                user: join(user)?,
                xp: join(xp)?,
                progress: join(progress)?,
                audits: join(audits)?,
                loaded_at: Utc::now(),
            })
        })
    }

    pub fn summary(&self, display: &DisplayConfig) -> DashboardSummary {
        DashboardSummary::compute(
            &self.xp,
            &self.progress,
            &self.audits,
            display.top_projects,
            display.recent_months,
        )
    }

    /// Build one chart from this load's data.
    pub fn chart(&self, kind: ChartKind, size: Size) -> Chart {
        match kind {
            ChartKind::XpBar => charts::xp_bar(&group_by_leaf_path(&self.xp), size),
            ChartKind::PassFail => charts::pass_fail_pie(&pass_fail_counts(&self.progress), size),
            ChartKind::Timeline => charts::xp_timeline(&bucket_by_month(&self.xp), size),
            ChartKind::AuditHistory => charts::audit_history(&self.audits, size),
            ChartKind::AuditTotals => charts::audit_totals(&self.audits, size),
        }
    }

    /// All transactions, newest first.
    pub fn transactions(&self) -> Vec<&Transaction> {
        let mut all: Vec<&Transaction> = self
            .xp
            .iter()
            .chain(&self.audits.given)
            .chain(&self.audits.received)
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }
}

/// Chart canvas size from the display config.
pub fn chart_size(display: &DisplayConfig) -> Size {
    Size::new(f64::from(display.chart_width), f64::from(display.chart_height))
}
