//! Display formatting for dashboard numbers and dates.

use chrono::{DateTime, Utc};

const MAGNITUDE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Render an XP quantity in base-1024 units.
///
/// The base unit has no decimals; larger units carry two decimals below 10
/// and one above. `1536` → `"1.50 KB"`, `20480` → `"20.0 KB"`.
pub fn format_magnitude(value: i64) -> String {
    let mut size = value as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < MAGNITUDE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", size.round() as i64, MAGNITUDE_UNITS[0])
    } else {
        let decimals = if size < 10.0 { 2 } else { 1 };
        format!("{size:.decimals$} {}", MAGNITUDE_UNITS[unit])
    }
}

/// Thousands separators: `1234567` → `"1,234,567"`.
pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Coarse relative time, e.g. `"3 days ago"`.
pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds().max(0);

    let steps: [(i64, &str); 5] = [
        (31_536_000, "year"),
        (2_592_000, "month"),
        (86_400, "day"),
        (3_600, "hour"),
        (60, "minute"),
    ];
    for (span, unit) in steps {
        let n = seconds / span;
        if n >= 1 {
            return if n == 1 {
                format!("1 {unit} ago")
            } else {
                format!("{n} {unit}s ago")
            };
        }
    }

    if seconds < 10 {
        "just now".to_string()
    } else {
        format!("{seconds} seconds ago")
    }
}

/// Last segment of a project path.
pub fn project_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Month label such as `"Mar 2024"`.
pub fn month_label(year: i32, month: u32) -> String {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    let name = NAMES.get(month.saturating_sub(1) as usize).copied().unwrap_or("???");
    format!("{name} {year}")
}
