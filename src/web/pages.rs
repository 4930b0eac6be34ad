//! Server-side HTML for each view.
//!
//! Produces the fragment that the shell page swaps into `#app`. Charts are
//! inlined as SVG painted with the active theme's palette.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::analytics::{
    DashboardSummary, SkillLevel, format_magnitude, format_number, project_name, time_ago,
};
use crate::charts::svg::{escape, render as render_svg};
use crate::charts::{ChartKind, Palette, Size};
use crate::config::Theme;
use crate::model::{ProgressStatus, find_module, module_catalog};
use crate::router::{LoadedDashboard, Notice, Route, Section, View};

/// Rendering inputs that are not part of the view itself.
#[derive(Debug, Clone, Copy)]
pub struct PageContext {
    pub theme: Theme,
    pub module_id: u32,
    pub chart_size: Size,
    pub now: DateTime<Utc>,
}

pub fn render(view: &View, ctx: &PageContext) -> String {
    match view {
        View::Login { notice } => login(notice.as_ref()),
        View::Dashboard { section, dashboard } => {
            let body = section_body(*section, dashboard, ctx);
            frame(Route::Dashboard(*section), ctx, &body)
        }
        View::Transactions { dashboard } => {
            frame(Route::Transactions, ctx, &transactions(dashboard, ctx))
        }
        View::Error { route, message } => {
            let body = format!(
                r#"<div class="error-message">{}</div><p><a href="{}" class="retry">Retry</a></p>"#,
                escape(message),
                route,
            );
            frame(*route, ctx, &body)
        }
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

fn login(notice: Option<&Notice>) -> String {
    let banner = notice
        .map(|n| {
            let class = if n.is_error() { "notice error" } else { "notice" };
            format!(r#"<div class="{class}">{}</div>"#, escape(&n.message()))
        })
        .unwrap_or_default();

    format!(
        r#"<section class="login">
<h1>Sign in</h1>
{banner}
<form id="login-form">
<label>Username or email<input name="username" autocomplete="username" required></label>
<label>Password<input name="password" type="password" autocomplete="current-password" required></label>
<button type="submit">Log in</button>
</form>
</section>"#
    )
}

// ---------------------------------------------------------------------------
// Dashboard frame
// ---------------------------------------------------------------------------

fn frame(active: Route, ctx: &PageContext, body: &str) -> String {
    let mut nav = String::new();
    let targets = Section::ALL
        .iter()
        .map(|s| (Route::Dashboard(*s), s.title()))
        .chain(std::iter::once((Route::Transactions, "Transactions")));
    for (route, title) in targets {
        let class = if route == active { " class=\"active\"" } else { "" };
        let _ = write!(nav, r#"<a href="{route}"{class}>{title}</a>"#);
    }

    let mut modules = String::new();
    for module in module_catalog() {
        let selected = if module.id == ctx.module_id { " selected" } else { "" };
        let _ = write!(
            modules,
            r#"<option value="{}"{selected}>{}</option>"#,
            module.id,
            escape(module.name),
        );
    }

    format!(
        r#"<header class="topbar">
<nav>{nav}</nav>
<div class="controls">
<select id="module-select">{modules}</select>
<button id="theme-toggle" data-theme="{theme}">{theme}</button>
<button id="logout">Log out</button>
</div>
</header>
<main>{body}</main>"#,
        theme = ctx.theme,
    )
}

fn chart(dashboard: &LoadedDashboard, kind: ChartKind, ctx: &PageContext) -> String {
    let palette = Palette::for_theme(ctx.theme);
    let svg = render_svg(&dashboard.data.chart(kind, ctx.chart_size), &palette);
    format!(r#"<figure class="chart-box" data-chart="{kind}">{svg}</figure>"#)
}

fn stat(label: &str, value: &str) -> String {
    format!(
        r#"<div class="stat"><div class="stat-value">{}</div><div class="stat-label">{}</div></div>"#,
        escape(value),
        escape(label),
    )
}

fn section_body(section: Section, dashboard: &LoadedDashboard, ctx: &PageContext) -> String {
    let s = &dashboard.summary;
    match section {
        Section::Profile => profile(dashboard, ctx),
        Section::Xp => xp(dashboard, ctx),
        Section::Progress => progress(dashboard, ctx),
        Section::Audits => format!(
            r#"<h2>Audits</h2><div class="stats">{}{}{}</div>{}{}"#,
            stat("Given", &format_magnitude(s.audits_given)),
            stat("Received", &format_magnitude(s.audits_received)),
            stat("Audit ratio", &s.audit_ratio.to_string()),
            chart(dashboard, ChartKind::AuditTotals, ctx),
            chart(dashboard, ChartKind::AuditHistory, ctx),
        ),
        Section::Skills => skills(s),
        Section::Statistics => statistics(dashboard),
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn profile(dashboard: &LoadedDashboard, ctx: &PageContext) -> String {
    let user = &dashboard.data.user;
    let s = &dashboard.summary;
    let module = find_module(dashboard.module_id())
        .map(|m| m.name.to_string())
        .unwrap_or_else(|| format!("#{}", dashboard.module_id()));
    let last = s
        .last_activity
        .map(|at| time_ago(at, ctx.now))
        .unwrap_or_else(|| "no activity yet".to_string());

    format!(
        r#"<h2>{name}</h2>
<dl class="profile">
<dt>Login</dt><dd>{login}</dd>
<dt>Email</dt><dd>{email}</dd>
<dt>User ID</dt><dd>{id}</dd>
<dt>Module</dt><dd>{module}</dd>
<dt>Last activity</dt><dd>{last}</dd>
</dl>
<div class="stats">{xp}{ratio}{projects}</div>"#,
        name = escape(&user.display_name()),
        login = escape(&user.login),
        email = escape(user.email.as_deref().unwrap_or("-")),
        id = user.id,
        module = escape(&module),
        last = escape(&last),
        xp = stat("Total XP", &format_magnitude(s.total_xp)),
        ratio = stat("Audit ratio", &s.audit_ratio.to_string()),
        projects = stat("Projects passed", &s.pass_fail.passed.to_string()),
    )
}

fn xp(dashboard: &LoadedDashboard, ctx: &PageContext) -> String {
    let s = &dashboard.summary;
    let mut rows = String::new();
    for (name, amount) in &s.top_projects {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(name),
            format_magnitude(*amount),
        );
    }
    let mut recent = String::new();
    for bucket in s.recent_months.iter().rev() {
        let _ = write!(
            recent,
            "<li>{}: {} ({} transactions)</li>",
            bucket.label(),
            format_magnitude(bucket.total),
            bucket.count,
        );
    }
    if recent.is_empty() {
        recent.push_str("<li>No recent XP</li>");
    }

    format!(
        r#"<h2>XP</h2><div class="stats">{}</div>{}{}
<h3>Top projects</h3><table><thead><tr><th>Project</th><th>XP</th></tr></thead><tbody>{rows}</tbody></table>
<h3>Recent months</h3><ul>{recent}</ul>"#,
        stat("Total XP", &format_magnitude(s.total_xp)),
        chart(dashboard, ChartKind::XpBar, ctx),
        chart(dashboard, ChartKind::Timeline, ctx),
    )
}

fn progress(dashboard: &LoadedDashboard, ctx: &PageContext) -> String {
    let counts = &dashboard.summary.pass_fail;
    let mut records: Vec<_> = dashboard.data.progress.iter().collect();
    records.sort_by(|a, b| b.last_update().cmp(&a.last_update()));

    let mut rows = String::new();
    for record in records.iter().take(10) {
        let status = record.status();
        let class = match status {
            ProgressStatus::Passed => "pass",
            ProgressStatus::Failed => "fail",
            ProgressStatus::Pending => "pending",
        };
        let _ = write!(
            rows,
            r#"<tr><td>{}</td><td class="{class}">{status}</td><td>{}</td></tr>"#,
            escape(project_name(&record.project_path)),
            time_ago(record.last_update(), ctx.now),
        );
    }

    let rate = counts
        .pass_rate()
        .map(|r| format!("{r:.1}%"))
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        r#"<h2>Progress</h2><div class="stats">{}{}{}{}</div>{}
<h3>Latest attempts</h3><table><thead><tr><th>Project</th><th>Status</th><th>Updated</th></tr></thead><tbody>{rows}</tbody></table>"#,
        stat("Passed", &counts.passed.to_string()),
        stat("Failed", &counts.failed.to_string()),
        stat("Pending", &counts.pending.to_string()),
        stat("Pass rate", &rate),
        chart(dashboard, ChartKind::PassFail, ctx),
    )
}

fn skills(summary: &DashboardSummary) -> String {
    if summary.skills.is_empty() {
        return r#"<h2>Skills</h2><div class="no-data">Insufficient data to analyze skills</div>"#
            .to_string();
    }

    let count = |level: SkillLevel| summary.skills.iter().filter(|s| s.level == level).count();
    let levels = [
        SkillLevel::Expert,
        SkillLevel::Advanced,
        SkillLevel::Intermediate,
        SkillLevel::Beginner,
    ];
    let overview: String = levels
        .iter()
        .map(|level| stat(&level.to_string(), &count(*level).to_string()))
        .collect();

    let mut rows = String::new();
    for skill in &summary.skills {
        let _ = write!(
            rows,
            r#"<tr><td>{}</td><td class="level {level}">{level}</td><td>{}</td><td>{:.1}%</td><td>{}</td><td>{:.1}%</td></tr>"#,
            escape(&skill.name),
            format_magnitude(skill.total_xp),
            skill.percent,
            skill.project_count,
            skill.pass_rate,
            level = skill.level,
        );
    }

    format!(
        r#"<h2>Skills</h2><div class="stats">{overview}</div>
<table><thead><tr><th>Skill</th><th>Level</th><th>XP</th><th>Share</th><th>Projects</th><th>Pass rate</th></tr></thead><tbody>{rows}</tbody></table>"#
    )
}

fn statistics(dashboard: &LoadedDashboard) -> String {
    let s = &dashboard.summary;
    let average = if s.project_count > 0 {
        s.total_xp / s.project_count as i64
    } else {
        0
    };
    let rate = s
        .pass_fail
        .pass_rate()
        .map(|r| format!("{r:.1}%"))
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        r#"<h2>Statistics</h2><div class="stats">{}{}{}{}{}{}</div>"#,
        stat("XP transactions", &format_number(dashboard.data.xp.len() as i64)),
        stat("Projects with XP", &s.project_count.to_string()),
        stat("Average XP per project", &format_magnitude(average)),
        stat("Active months", &s.monthly.len().to_string()),
        stat("Pass rate", &rate),
        stat("Audit ratio", &s.audit_ratio.to_string()),
    )
}

fn transactions(dashboard: &LoadedDashboard, ctx: &PageContext) -> String {
    let all = dashboard.data.transactions();
    if all.is_empty() {
        return r#"<h2>Transactions</h2><div class="no-data">No transactions</div>"#.to_string();
    }

    let mut rows = String::new();
    for tx in all {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            tx.created_at.format("%Y-%m-%d"),
            tx.kind,
            escape(project_name(&tx.path)),
            format_number(tx.amount),
        );
    }
    format!(
        r#"<h2>Transactions</h2><p class="muted">Loaded {}</p>
<table><thead><tr><th>Date</th><th>Type</th><th>Project</th><th>Amount</th></tr></thead><tbody>{rows}</tbody></table>"#,
        time_ago(dashboard.data.loaded_at, ctx.now),
    )
}
