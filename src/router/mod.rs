/// Application state machine: session state, navigation and the view cache.
///
/// # States
///
/// ```text
///            start (valid token)          login ok
///   ┌────────────┐ ───────────────▶ ┌───────────┐
///   │ LoggedOut  │                  │ LoggedIn  │
///   └────────────┘ ◀─────────────── └───────────┘
///                   logout / auth error / expiry
/// ```
///
/// While logged out every navigation lands on the login view. While logged
/// in, switching sections is a pure display change served from the cached
/// load; data is fetched again only on login, module change or an explicit
/// reload.
///
/// [`App`] owns every service (session, client, preference store, event
/// log) and is the one instance the adapters talk to.
pub mod cache;
pub mod route;

use std::sync::Arc;

use anyhow::{Result, bail};

use crate::analytics::DashboardSummary;
use crate::charts::{Chart, ChartKind, Size};
use crate::client::{ClientError, GraphqlClient, Transport};
use crate::config::{Theme, XpdashConfig};
use crate::dashboard::{DashboardData, chart_size};
use crate::events::{EventKind, EventLog};
use crate::model::find_module;
use crate::session::SessionManager;
use crate::storage::{FileStore, KeyValueStore, PREFERRED_MODULE_KEY, THEME_KEY};

pub use cache::{LoadTicket, LoadedDashboard, ViewCache};
pub use route::{Route, Section};

// ---------------------------------------------------------------------------
// States and views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    LoggedIn,
}

/// Message shown on the login view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The session ended without the user asking.
    SessionExpired,
    LoggedOut,
    LoginFailed(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Self::SessionExpired => "Your session has expired. Please log in again.".to_string(),
            Self::LoggedOut => "You have been logged out.".to_string(),
            Self::LoginFailed(reason) => format!("Login failed: {reason}"),
        }
    }

    /// Whether the notice reports a problem rather than a confirmation.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::LoggedOut)
    }
}

/// What the adapter should display.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Login {
        notice: Option<Notice>,
    },
    Dashboard {
        section: Section,
        dashboard: Arc<LoadedDashboard>,
    },
    Transactions {
        dashboard: Arc<LoadedDashboard>,
    },
    /// A load failed for a non-auth reason; the session is intact.
    Error {
        route: Route,
        message: String,
    },
}

impl View {
    pub fn route(&self) -> Route {
        match self {
            Self::Login { .. } => Route::Login,
            Self::Dashboard { section, .. } => Route::Dashboard(*section),
            Self::Transactions { .. } => Route::Transactions,
            Self::Error { route, .. } => *route,
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    config: XpdashConfig,
    session: Arc<SessionManager>,
    client: GraphqlClient,
    prefs: Arc<dyn KeyValueStore>,
    events: EventLog,
    cache: ViewCache,
    state: AuthState,
    route: Route,
    module_id: u32,
    theme: Theme,
    notice: Option<Notice>,
}

impl App {
    /// Wire the services over an explicit store and transport.
    pub fn new(
        config: XpdashConfig,
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
        events: EventLog,
    ) -> Self {
        let session = Arc::new(SessionManager::new(Arc::clone(&store), events.clone()));
        let client = GraphqlClient::new(&config.api, transport, Arc::clone(&session), events.clone());
        Self::assemble(config, store, session, client, events)
    }

    /// Wire the production services: file storage and the `ureq` client.
    pub fn from_config(config: XpdashConfig) -> Self {
        let events = EventLog::from_config(&config.logging);
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::default_location());
        let session = Arc::new(SessionManager::new(Arc::clone(&store), events.clone()));
        let client = GraphqlClient::from_config(&config.api, Arc::clone(&session), events.clone());
        Self::assemble(config, store, session, client, events)
    }

    fn assemble(
        config: XpdashConfig,
        prefs: Arc<dyn KeyValueStore>,
        session: Arc<SessionManager>,
        client: GraphqlClient,
        events: EventLog,
    ) -> Self {
        let theme = config.display.theme;
        let module_id = config.display.default_module;
        Self {
            config,
            session,
            client,
            prefs,
            events,
            cache: ViewCache::new(),
            state: AuthState::LoggedOut,
            route: Route::Login,
            module_id,
            theme,
            notice: None,
        }
    }

    // -- Accessors --

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn module_id(&self) -> u32 {
        self.module_id
    }

    pub fn config(&self) -> &XpdashConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn client(&self) -> &GraphqlClient {
        &self.client
    }

    pub fn cache(&self) -> &ViewCache {
        &self.cache
    }

    // -- Lifecycle --

    /// Restore preferences and resolve the initial auth state.
    pub fn start(&mut self) -> AuthState {
        if let Some(theme) = self.prefs.get(THEME_KEY).as_deref().and_then(Theme::parse) {
            self.theme = theme;
        }
        if let Some(id) = self
            .prefs
            .get(PREFERRED_MODULE_KEY)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|id| find_module(*id).is_some())
        {
            self.module_id = id;
        }

        self.state = if self.session.is_authenticated() {
            AuthState::LoggedIn
        } else {
            AuthState::LoggedOut
        };
        self.route = match self.state {
            AuthState::LoggedIn => Route::HOME,
            AuthState::LoggedOut => Route::Login,
        };
        self.state
    }

    /// Sign in and show the dashboard home.
    pub fn login(&mut self, username: &str, password: &str) -> View {
        match self.client.sign_in(username, password) {
            Ok(_) => {
                self.state = AuthState::LoggedIn;
                self.notice = None;
                self.cache.clear();
                self.route = Route::HOME;
                self.view_for(Route::HOME)
            }
            Err(e) => {
                self.state = AuthState::LoggedOut;
                self.route = Route::Login;
                let notice = Notice::LoginFailed(login_failure_message(&e));
                View::Login { notice: Some(notice) }
            }
        }
    }

    /// Voluntary logout.
    pub fn logout(&mut self) -> View {
        self.session.logout();
        self.enter_logged_out(Notice::LoggedOut);
        self.login_view()
    }

    /// Resolve a route key to a view, redirecting to login when signed out.
    pub fn navigate(&mut self, raw: &str) -> View {
        self.sync_auth();
        match self.state {
            AuthState::LoggedOut => {
                self.route = Route::Login;
                self.login_view()
            }
            AuthState::LoggedIn => {
                let route = match Route::parse(raw) {
                    None | Some(Route::Login) => Route::HOME,
                    Some(route) => route,
                };
                self.route = route;
                self.view_for(route)
            }
        }
    }

    /// View for the current route.
    pub fn current_view(&mut self) -> View {
        let path = self.route.path();
        self.navigate(&path)
    }

    // -- Data --

    /// Fetch everything for the selected module and cache it.
    pub fn load_dashboard(&mut self) -> Result<Arc<LoadedDashboard>, ClientError> {
        let ticket = self.cache.begin(self.module_id);
        let result = DashboardData::load(&self.client, ticket.module_id);
        self.finish_load(ticket, result)?;
        self.cache
            .for_module(ticket.module_id)
            .ok_or_else(|| ClientError::Transport("load superseded by a newer request".to_string()))
    }

    /// Start a load without running it. Pair with [`finish_load`](Self::finish_load).
    pub fn begin_load(&mut self) -> LoadTicket {
        self.cache.begin(self.module_id)
    }

    /// Apply a finished load.
    ///
    /// Returns `Ok(false)` when a newer load has started since `ticket` was
    /// issued; the result is dropped. Auth failures end the session whatever
    /// the generation.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<DashboardData, ClientError>,
    ) -> Result<bool, ClientError> {
        let data = match result {
            Ok(data) => data,
            Err(e) => {
                // the client already dropped the token, stale or not
                if e.is_auth() {
                    self.enter_logged_out(Notice::SessionExpired);
                }
                return Err(e);
            }
        };

        let summary = DashboardSummary::compute(
            &data.xp,
            &data.progress,
            &data.audits,
            self.config.display.top_projects,
            self.config.display.recent_months,
        );
        let detail = format!(
            "module {}: {} xp, {} progress, {} audits",
            data.module_id,
            data.xp.len(),
            data.progress.len(),
            data.audits.given.len() + data.audits.received.len(),
        );

        let accepted = self.cache.complete(ticket, data, summary);
        if accepted {
            self.events.record_with(EventKind::DashboardLoaded, detail);
        }
        Ok(accepted)
    }

    /// Switch modules, remember the choice and reload.
    pub fn select_module(&mut self, module_id: u32) -> Result<View> {
        self.prefer_module(module_id)?;
        Ok(self.current_view())
    }

    /// Switch modules and remember the choice, without loading.
    pub fn prefer_module(&mut self, module_id: u32) -> Result<()> {
        self.use_module(module_id)?;
        self.prefs.set(PREFERRED_MODULE_KEY, &module_id.to_string())?;
        Ok(())
    }

    /// Scope later loads to `module_id` without persisting or loading.
    pub fn use_module(&mut self, module_id: u32) -> Result<()> {
        if find_module(module_id).is_none() {
            bail!("unknown module {module_id}");
        }
        self.module_id = module_id;
        Ok(())
    }

    /// Build a chart from the cached load, loading first if needed.
    pub fn chart(&mut self, kind: ChartKind, size: Option<Size>) -> Result<Chart, ClientError> {
        let size = size.unwrap_or_else(|| chart_size(&self.config.display));
        let loaded = self.ensure_loaded()?;
        Ok(loaded.data.chart(kind, size))
    }

    // -- Theme --

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.prefs.set(THEME_KEY, &theme.to_string())?;
        self.theme = theme;
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let next = self.theme.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    // -- Internals --

    /// Follow the session: expiry while logged in ends the session, and a
    /// token stored elsewhere while logged out starts one.
    fn sync_auth(&mut self) {
        let valid = self.session.is_authenticated();
        match (self.state, valid) {
            (AuthState::LoggedIn, false) => self.enter_logged_out(Notice::SessionExpired),
            (AuthState::LoggedOut, true) => {
                self.state = AuthState::LoggedIn;
                self.notice = None;
            }
            _ => {}
        }
    }

    fn ensure_loaded(&mut self) -> Result<Arc<LoadedDashboard>, ClientError> {
        match self.cache.for_module(self.module_id) {
            Some(loaded) => Ok(loaded),
            None => self.load_dashboard(),
        }
    }

    fn view_for(&mut self, route: Route) -> View {
        let loaded = match self.ensure_loaded() {
            Ok(loaded) => loaded,
            Err(e) if e.is_auth() => {
                if self.state == AuthState::LoggedIn {
                    self.enter_logged_out(Notice::SessionExpired);
                }
                return self.login_view();
            }
            Err(e) => {
                return View::Error {
                    route,
                    message: format!("Could not load data: {e}"),
                };
            }
        };

        match route {
            Route::Dashboard(section) => View::Dashboard { section, dashboard: loaded },
            Route::Transactions => View::Transactions { dashboard: loaded },
            Route::Login => View::Dashboard { section: Section::Profile, dashboard: loaded },
        }
    }

    fn enter_logged_out(&mut self, notice: Notice) {
        self.state = AuthState::LoggedOut;
        self.route = Route::Login;
        self.cache.clear();
        self.notice = Some(notice);
    }

    fn login_view(&self) -> View {
        View::Login { notice: self.notice.clone() }
    }
}

fn login_failure_message(error: &ClientError) -> String {
    match error {
        ClientError::Auth(reason) => reason.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_have_messages() {
        assert!(Notice::SessionExpired.message().contains("expired"));
        assert!(Notice::SessionExpired.is_error());
        assert!(!Notice::LoggedOut.is_error());
        assert_eq!(Notice::LoginFailed("bad".into()).message(), "Login failed: bad");
    }

    #[test]
    fn view_reports_its_route() {
        let view = View::Error { route: Route::Transactions, message: String::new() };
        assert_eq!(view.route(), Route::Transactions);
        assert_eq!(View::Login { notice: None }.route(), Route::Login);
    }
}
