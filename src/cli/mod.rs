//! CLI command implementations for xpdash.
//!
//! Provides subcommand handlers for:
//! - `xpdash login` / `logout` / `status`: session management
//! - `xpdash summary`: dashboard numbers for one module
//! - `xpdash chart <kind>`: render a chart as SVG
//! - `xpdash modules` / `theme`: preferences
//! - `xpdash web`: the local dashboard server
//! - `xpdash config show|init|set|reset`: configuration management

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use colored::Colorize;

use crate::analytics::{DashboardSummary, SkillLevel, format_magnitude, format_number, time_ago};
use crate::charts::{ChartKind, Palette, svg};
use crate::config::{self, Theme};
use crate::model::{find_module, module_catalog};
use crate::router::{App, AuthState, LoadedDashboard, View};
use crate::web;

/// Output format for report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Build the app from the effective configuration and restore preferences.
fn started_app() -> App {
    let mut app = App::from_config(config::load());
    app.start();
    app
}

fn require_login(app: &App) -> Result<()> {
    if app.state() != AuthState::LoggedIn {
        bail!("not logged in (run `xpdash login` first)");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// xpdash login | logout | status
// ---------------------------------------------------------------------------

/// Sign in and store the session token.
///
/// The password comes from `XPDASH_PASSWORD` when set, otherwise from one
/// line of stdin.
pub fn run_login(username: Option<&str>) -> Result<()> {
    let username = match username {
        Some(name) => name.to_string(),
        None => prompt("Username or email: ")?,
    };
    let password = match std::env::var("XPDASH_PASSWORD") {
        Ok(value) if !value.is_empty() => value,
        _ => prompt("Password: ")?,
    };

    let mut app = started_app();
    match app.login(&username, &password) {
        View::Login { notice } => {
            let message = notice.map(|n| n.message()).unwrap_or_else(|| "Login failed".to_string());
            bail!("{message}");
        }
        _ => {
            println!("{} Logged in as {}", "✓".green().bold(), username.trim().bold());
            if let Some(session) = app.session().current()
                && let Some(expires) = session.expires_at
            {
                println!("  {}", format!("Session expires {}", expires.format("%Y-%m-%d %H:%M UTC")).dimmed());
            }
            Ok(())
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{label}");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed reading from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Remove the stored session token.
pub fn run_logout() -> Result<()> {
    let mut app = started_app();
    app.logout();
    println!("{} Logged out", "✓".green().bold());
    Ok(())
}

/// Show whether a valid session is stored.
pub fn run_status() -> Result<()> {
    let app = started_app();
    println!("{}", "xpdash Session".bold().cyan());
    println!("{}", "=".repeat(40));

    match app.session().current() {
        Some(session) => {
            println!("  {} {}", "Status: ".bold(), "logged in".green());
            if let Some(id) = session.subject_id {
                println!("  {} {}", "User ID:".bold(), id);
            }
            match session.expires_at {
                Some(at) => println!("  {} {}", "Expires:".bold(), at.format("%Y-%m-%d %H:%M UTC")),
                None => println!("  {} {}", "Expires:".bold(), "no expiry claim".dimmed()),
            }
        }
        None => println!("  {} {}", "Status: ".bold(), "logged out".yellow()),
    }

    let module = find_module(app.module_id()).map(|m| m.name).unwrap_or("unknown");
    println!("  {} {} ({})", "Module: ".bold(), module, app.module_id());
    println!("  {} {}", "Theme:  ".bold(), app.theme());
    Ok(())
}

// ---------------------------------------------------------------------------
// xpdash summary
// ---------------------------------------------------------------------------

/// Load one module's data and print the derived dashboard numbers.
pub fn run_summary(module: Option<u32>, format: OutputFormat) -> Result<()> {
    let mut app = started_app();
    require_login(&app)?;
    if let Some(id) = module {
        app.use_module(id)?;
    }
    let loaded = app.load_dashboard().context("failed to load dashboard data")?;

    match format {
        OutputFormat::Json => print_summary_json(&loaded)?,
        OutputFormat::Table => print_summary_table(&loaded),
    }
    Ok(())
}

fn print_summary_table(loaded: &LoadedDashboard) {
    let s = &loaded.summary;
    let user = &loaded.data.user;
    let module = find_module(loaded.module_id()).map(|m| m.name).unwrap_or("unknown");

    println!("{}", format!("xpdash: {} ({})", user.display_name(), user.login).bold().cyan());
    println!("{}", "=".repeat(60));
    println!("  {} {}", "Module:       ".bold(), module);
    println!("  {} {}", "Total XP:     ".bold(), format_magnitude(s.total_xp));
    println!("  {} {}", "Projects:     ".bold(), s.project_count);
    println!(
        "  {} {} passed, {} failed, {} pending",
        "Progress:     ".bold(),
        s.pass_fail.passed.to_string().green(),
        s.pass_fail.failed.to_string().red(),
        s.pass_fail.pending.to_string().yellow(),
    );
    println!(
        "  {} {} given / {} received (ratio {})",
        "Audits:       ".bold(),
        format_magnitude(s.audits_given),
        format_magnitude(s.audits_received),
        s.audit_ratio,
    );
    if let Some(at) = s.last_activity {
        println!("  {} {}", "Last activity:".bold(), time_ago(at, Utc::now()));
    }
    println!();

    if !s.top_projects.is_empty() {
        println!("{}", "Top Projects by XP".bold().cyan());
        println!("  {:<30} {:>12}", "Project", "XP");
        println!("  {}", "-".repeat(43));
        for (i, (name, amount)) in s.top_projects.iter().enumerate() {
            let line = format!("  {:<30} {:>12}", truncate(name, 30), format_magnitude(*amount));
            if i % 2 == 0 {
                println!("{line}");
            } else {
                println!("{}", line.dimmed());
            }
        }
        println!();
    }

    if !s.recent_months.is_empty() {
        println!("{}", "Recent Months".bold().cyan());
        for bucket in s.recent_months.iter().rev() {
            println!(
                "  {:<10} {:>12} {:>6} tx",
                bucket.label(),
                format_magnitude(bucket.total),
                format_number(bucket.count as i64),
            );
        }
        println!();
    }

    if !s.skills.is_empty() {
        println!("{}", "Skills".bold().cyan());
        println!("  {:<22} {:<13} {:>10} {:>7} {:>9}", "Skill", "Level", "XP", "Share", "Projects");
        println!("  {}", "-".repeat(65));
        for skill in &s.skills {
            println!(
                "  {:<22} {:<13} {:>10} {:>6.1}% {:>9}",
                truncate(&skill.name, 22),
                colorize_level(skill.level),
                format_magnitude(skill.total_xp),
                skill.percent,
                skill.project_count,
            );
        }
    }
}

fn print_summary_json(loaded: &LoadedDashboard) -> Result<()> {
    let value = serde_json::json!({
        "module_id": loaded.module_id(),
        "user": loaded.data.user,
        "summary": summary_value(&loaded.summary)?,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn summary_value(summary: &DashboardSummary) -> Result<serde_json::Value> {
    serde_json::to_value(summary).context("failed to serialize summary")
}

// ---------------------------------------------------------------------------
// xpdash chart
// ---------------------------------------------------------------------------

/// Render one chart for the current module as SVG.
///
/// Writes to `out` when given, otherwise to stdout.
pub fn run_chart(kind: ChartKind, out: Option<&Path>, theme: Option<Theme>) -> Result<()> {
    let mut app = started_app();
    require_login(&app)?;
    let chart = app.chart(kind, None).context("failed to load dashboard data")?;
    let palette = Palette::for_theme(theme.unwrap_or(app.theme()));
    let rendered = svg::render(&chart, &palette);

    match out {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("{} Wrote {} chart to {}", "✓".green().bold(), kind, path.display());
            if !chart.is_drawn() {
                eprintln!("  {}", "No data for this chart; placeholder rendered.".yellow());
            }
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// xpdash modules | theme
// ---------------------------------------------------------------------------

/// List the known modules, marking the selected one. With `select`,
/// remember a new preferred module.
pub fn run_modules(select: Option<u32>) -> Result<()> {
    let mut app = started_app();
    if let Some(id) = select {
        app.prefer_module(id)?;
        println!("{} Preferred module set to {}", "✓".green().bold(), id);
        println!();
    }

    println!("{}", "Modules".bold().cyan());
    println!("  {:>5}  {:<16} {:<23} Parent", "ID", "Name", "Dates");
    println!("  {}", "-".repeat(55));
    for module in module_catalog() {
        let marker = if module.id == app.module_id() { "*".green().bold() } else { " ".normal() };
        let parent = module.parent_id.map(|p| p.to_string()).unwrap_or_default();
        println!(
            "{} {:>5}  {:<16} {} .. {} {}",
            marker,
            module.id,
            module.name,
            module.start_date,
            module.end_date,
            parent.dimmed(),
        );
    }
    Ok(())
}

/// Show, set or toggle the color theme.
pub fn run_theme(arg: Option<&str>) -> Result<()> {
    let mut app = started_app();
    let theme = match arg {
        None => {
            println!("{}", app.theme());
            return Ok(());
        }
        Some("toggle") => app.toggle_theme()?,
        Some(value) => {
            let theme = Theme::parse(value)
                .with_context(|| format!("unknown theme '{value}' (expected dark, light or toggle)"))?;
            app.set_theme(theme)?;
            theme
        }
    };
    println!("{} Theme set to {}", "✓".green().bold(), theme.to_string().bold());
    Ok(())
}

// ---------------------------------------------------------------------------
// xpdash web
// ---------------------------------------------------------------------------

/// Start the local web dashboard.
pub fn run_web(addr: Option<&str>, no_open: bool) -> Result<()> {
    let config = config::load();
    let addr = addr.map(str::to_string).unwrap_or_else(|| config.web.addr.clone());
    let open = config.web.open_browser && !no_open;
    web::serve(App::from_config(config), &addr, open)
}

// ---------------------------------------------------------------------------
// xpdash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective xpdash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source(global_exists, "~/.xpdash/config.toml");
    print_source(project_exists, ".xpdash.toml");
    println!("  {} {}", "·".dimmed(), "XPDASH_* environment variables".dimmed());

    Ok(())
}

fn print_source(exists: bool, name: &str) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.xpdash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} Config written to {}", "✓".green().bold(), path.display());
    println!("  {}", "Edit the file to customize xpdash.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!("{} Config reset to defaults at {}", "✓".green().bold(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

fn colorize_level(level: SkillLevel) -> colored::ColoredString {
    let text = format!("{:<13}", level.to_string());
    match level {
        SkillLevel::Expert => text.green().bold(),
        SkillLevel::Advanced => text.green(),
        SkillLevel::Intermediate => text.yellow(),
        SkillLevel::Beginner => text.normal(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("ab", 2), "ab");
        assert_eq!(truncate("piscine-rust", 8), "piscine…");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Table);
    }
}
