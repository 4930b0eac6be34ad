/// Configuration schema and defaults for xpdash.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[api]`, `[display]`, `[web]` and `[logging]`. Every field has a built-in
/// default; config files only need the values they override.
use serde::{Deserialize, Serialize};

use crate::model::DEFAULT_MODULE_ID;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level xpdash configuration.
///
/// Maps directly to `~/.xpdash/config.toml` and `.xpdash.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpdashConfig {
    pub api: ApiConfig,
    pub display: DisplayConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Upstream grading platform endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// GraphQL endpoint used for every data query.
    pub graphql_url: String,
    /// Sign-in endpoint that exchanges Basic credentials for a token.
    pub signin_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            graphql_url: "https://learn.zone01kisumu.ke/api/graphql-engine/v1/graphql".to_string(),
            signin_url: "https://learn.zone01kisumu.ke/api/auth/signin".to_string(),
            timeout_ms: 15_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

/// Color theme for charts and the web dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Parse a stored or user-supplied theme name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dark => write!(f, "dark"),
            Self::Light => write!(f, "light"),
        }
    }
}

/// Presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Theme used when no preference has been stored.
    pub theme: Theme,
    /// Module used when no preference has been stored.
    pub default_module: u32,
    /// Chart canvas width in pixels.
    pub chart_width: u32,
    /// Chart canvas height in pixels.
    pub chart_height: u32,
    /// Number of projects shown in the XP bar chart and top lists.
    pub top_projects: usize,
    /// Number of months in the "recent activity" list.
    pub recent_months: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            default_module: DEFAULT_MODULE_ID,
            chart_width: 600,
            chart_height: 320,
            top_projects: 10,
            recent_months: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Local dashboard server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `xpdash web`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Diagnostics event log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append session and data-load events to the JSONL log.
    pub enabled: bool,
    /// Override for the log location (default `~/.xpdash/events.jsonl`).
    pub events_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            events_file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML template
// ---------------------------------------------------------------------------

impl XpdashConfig {
    /// Annotated default config written by `xpdash config init`.
    pub fn default_toml() -> String {
        let defaults = Self::default();
        format!(
            r#"# xpdash configuration
#
# Precedence (highest last): built-in defaults, ~/.xpdash/config.toml,
# ./.xpdash.toml, XPDASH_* environment variables.

[api]
# GraphQL endpoint used for all data queries.
graphql_url = "{graphql_url}"
# Sign-in endpoint (Basic credentials -> bearer token).
signin_url = "{signin_url}"
timeout_ms = {timeout_ms}

[display]
# "dark" or "light"; a theme chosen in the dashboard overrides this.
theme = "{theme}"
default_module = {default_module}
chart_width = {chart_width}
chart_height = {chart_height}
top_projects = {top_projects}
recent_months = {recent_months}

[web]
addr = "{addr}"
open_browser = {open_browser}

[logging]
enabled = {logging_enabled}
# events_file = "/path/to/events.jsonl"
"#,
            graphql_url = defaults.api.graphql_url,
            signin_url = defaults.api.signin_url,
            timeout_ms = defaults.api.timeout_ms,
            theme = defaults.display.theme,
            default_module = defaults.display.default_module,
            chart_width = defaults.display.chart_width,
            chart_height = defaults.display.chart_height,
            top_projects = defaults.display.top_projects,
            recent_months = defaults.display.recent_months,
            addr = defaults.web.addr,
            open_browser = defaults.web.open_browser,
            logging_enabled = defaults.logging.enabled,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_parses_back_to_defaults() {
        let parsed: XpdashConfig = toml::from_str(&XpdashConfig::default_toml()).unwrap();
        assert_eq!(parsed, XpdashConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let parsed: XpdashConfig = toml::from_str(
            r#"
[display]
theme = "light"
"#,
        )
        .unwrap();
        assert_eq!(parsed.display.theme, Theme::Light);
        assert_eq!(parsed.display.top_projects, 10);
        assert_eq!(parsed.api, ApiConfig::default());
    }

    #[test]
    fn theme_parse_and_toggle() {
        assert_eq!(Theme::parse("DARK"), Some(Theme::Dark));
        assert_eq!(Theme::parse(" light "), Some(Theme::Light));
        assert_eq!(Theme::parse("blue"), None);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
