//! Navigation targets.
//!
//! Routes arrive as hash fragments (`#/xp`), paths (`/xp`) or bare names
//! (`xp`); all three parse the same way.

use std::fmt;

/// A panel of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Profile,
    Xp,
    Progress,
    Audits,
    Skills,
    Statistics,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Self::Profile,
        Self::Xp,
        Self::Progress,
        Self::Audits,
        Self::Skills,
        Self::Statistics,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Xp => "xp",
            Self::Progress => "progress",
            Self::Audits => "audits",
            Self::Skills => "skills",
            Self::Statistics => "statistics",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Xp => "XP",
            Self::Progress => "Progress",
            Self::Audits => "Audits",
            Self::Skills => "Skills",
            Self::Statistics => "Statistics",
        }
    }
}

/// Where the user asked to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard(Section),
    Transactions,
}

impl Route {
    /// Landing route after sign-in.
    pub const HOME: Route = Route::Dashboard(Section::Profile);

    /// Parse a route key. Empty and unknown keys give `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim();
        let key = key.strip_prefix('#').unwrap_or(key);
        let key = key.trim_start_matches('/').trim_end_matches('/');
        let key = key.to_ascii_lowercase();

        match key.as_str() {
            "" => None,
            "login" => Some(Self::Login),
            "transactions" => Some(Self::Transactions),
            "dashboard" => Some(Self::HOME),
            other => Section::ALL
                .into_iter()
                .find(|s| s.slug() == other)
                .map(Self::Dashboard),
        }
    }

    /// Canonical path, e.g. `/xp`.
    pub fn path(self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Transactions => "/transactions".to_string(),
            Self::Dashboard(section) => format!("/{}", section.slug()),
        }
    }

    /// Whether the route needs a signed-in user.
    pub fn is_protected(self) -> bool {
        !matches!(self, Self::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.path())
    }
}
