//! Diagnostics event log: one JSON line per session or data-load event.
//!
//! Records logins, logouts, forced session expiry and failed queries so that
//! "why was I logged out?" has an answer after the fact. The log is never
//! the only place a failure is reported; callers always surface a message
//! to the user as well.
//!
//! Log file: `~/.xpdash/events.jsonl` (overridable via `[logging]`).

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

/// Kinds of events written to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Login,
    LoginFailed,
    Logout,
    /// The session ended without the user asking (expiry or rejection).
    SessionExpired,
    /// A token failed structural validation and was discarded.
    TokenRejected,
    QueryFailed,
    DashboardLoaded,
}

/// A single log line.
#[derive(Debug, Serialize)]
pub struct Event {
    pub timestamp: String,
    pub event: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Handle to the event log. Cheap to clone; writes are best-effort.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    /// Build from the `[logging]` config section.
    pub fn from_config(config: &LoggingConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        let path = config
            .events_file
            .as_ref()
            .map(PathBuf::from)
            .or_else(events_log_path);
        Self { path }
    }

    /// A log that discards everything.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Log to an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Record an event without detail.
    pub fn record(&self, event: EventKind) {
        self.write(event, None);
    }

    /// Record an event with a free-form detail message.
    pub fn record_with(&self, event: EventKind, detail: impl Into<String>) {
        self.write(event, Some(detail.into()));
    }

    fn write(&self, event: EventKind, detail: Option<String>) {
        let entry = Event {
            timestamp: Utc::now().to_rfc3339(),
            event,
            detail,
        };
        let _ = self.append(&entry);
    }

    fn append(&self, entry: &Event) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;

        Ok(())
    }
}

fn events_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".xpdash").join("events.jsonl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_line_per_event() {
        let path = std::env::temp_dir().join(format!("xpdash-events-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let log = EventLog::at(&path);
        log.record(EventKind::Login);
        log.record_with(EventKind::SessionExpired, "invalid JWT");

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"event\":\"login\""));
        assert!(!lines[0].contains("detail"));
        assert!(lines[1].contains("\"session_expired\""));
        assert!(lines[1].contains("invalid JWT"));
    }

    #[test]
    fn disabled_config_writes_nothing() {
        let config = LoggingConfig {
            enabled: false,
            events_file: Some("/nonexistent/dir/events.jsonl".to_string()),
        };
        let log = EventLog::from_config(&config);
        assert!(log.path.is_none());
        log.record(EventKind::Logout);
    }
}
