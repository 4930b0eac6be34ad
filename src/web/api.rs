//! Request handlers for the dashboard server.
//!
//! Each handler takes the app and the request pieces it needs and returns
//! a [`Reply`]. Views are returned as JSON `{route, html, theme,
//! authenticated}`; the shell page swaps `html` in and rewrites its hash to
//! `route`, which is how redirects to the login view reach the browser.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::charts::svg;
use crate::charts::{ChartKind, Palette};
use crate::config::Theme;
use crate::dashboard::chart_size;
use crate::router::{App, AuthState, View};

use super::Reply;
use super::pages::{self, PageContext};

// ---------------------------------------------------------------------------
// JSON shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct ViewResponse {
    route: String,
    html: String,
    theme: Theme,
    authenticated: bool,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
struct ThemeRequest {
    /// `dark`, `light` or `toggle`.
    theme: String,
}

#[derive(Debug, Deserialize)]
struct ModuleRequest {
    module: u32,
}

#[derive(Debug, Serialize)]
struct ThemeResponse {
    theme: Theme,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Value of a query-string parameter.
///
/// Only `%2F` and `%23` are decoded; route keys need nothing else.
pub(crate) fn query_param(url: &str, name: &str) -> Option<String> {
    url.split_once('?')?.1.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == name).then(|| v.replace("%2F", "/").replace("%2f", "/").replace("%23", "#"))
    })
}

fn view_reply(app: &App, view: &View) -> Result<Reply> {
    let ctx = PageContext {
        theme: app.theme(),
        module_id: app.module_id(),
        chart_size: chart_size(&app.config().display),
        now: Utc::now(),
    };
    let resp = ViewResponse {
        route: view.route().to_string(),
        html: pages::render(view, &ctx),
        theme: app.theme(),
        authenticated: app.state() == AuthState::LoggedIn,
    };
    Reply::json(&resp)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /view?route=/xp`
pub fn get_view(app: &mut App, url: &str) -> Result<Reply> {
    let route = query_param(url, "route").unwrap_or_default();
    let view = app.navigate(&route);
    view_reply(app, &view)
}

/// `POST /api/login`
pub fn post_login(app: &mut App, body: &str) -> Result<Reply> {
    let req: LoginRequest = serde_json::from_str(body).context("invalid login request")?;
    let view = app.login(&req.username, &req.password);
    view_reply(app, &view)
}

/// `POST /api/logout`
pub fn post_logout(app: &mut App) -> Result<Reply> {
    let view = app.logout();
    view_reply(app, &view)
}

/// `POST /api/theme`
pub fn post_theme(app: &mut App, body: &str) -> Result<Reply> {
    let req: ThemeRequest = serde_json::from_str(body).context("invalid theme request")?;
    let theme = if req.theme == "toggle" {
        app.toggle_theme()?
    } else {
        let theme = Theme::parse(&req.theme)
            .with_context(|| format!("unknown theme '{}'", req.theme))?;
        app.set_theme(theme)?;
        theme
    };
    Reply::json(&ThemeResponse { theme })
}

/// `POST /api/module`
pub fn post_module(app: &mut App, body: &str) -> Result<Reply> {
    let req: ModuleRequest = serde_json::from_str(body).context("invalid module request")?;
    let view = app.select_module(req.module)?;
    view_reply(app, &view)
}

/// `GET /chart/<kind>.svg`
pub fn get_chart(app: &mut App, path: &str) -> Result<Reply> {
    let Some(kind) = path
        .strip_prefix("/chart/")
        .and_then(|rest| rest.strip_suffix(".svg"))
        .and_then(|name| name.parse::<ChartKind>().ok())
    else {
        return Ok(Reply::not_found());
    };

    match app.chart(kind, None) {
        Ok(chart) => Ok(Reply::svg(svg::render(&chart, &Palette::for_theme(app.theme())))),
        Err(e) if e.is_auth() => Ok(Reply::status_json(401, r#"{"error": "session expired"}"#)),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_extracts_value() {
        assert_eq!(query_param("/view?route=/xp", "route").as_deref(), Some("/xp"));
        assert_eq!(query_param("/view?a=1&route=%2Fskills", "route").as_deref(), Some("/skills"));
        assert_eq!(query_param("/view?route=%23%2Faudits", "route").as_deref(), Some("#/audits"));
    }

    #[test]
    fn query_param_missing() {
        assert_eq!(query_param("/view", "route"), None);
        assert_eq!(query_param("/view?other=1", "route"), None);
    }

    #[test]
    fn requests_deserialize() {
        let login: LoginRequest = serde_json::from_str(r#"{"username":"u","password":"p"}"#).unwrap();
        assert_eq!(login.username, "u");
        let module: ModuleRequest = serde_json::from_str(r#"{"module":84}"#).unwrap();
        assert_eq!(module.module, 84);
        let theme: ThemeRequest = serde_json::from_str(r#"{"theme":"toggle"}"#).unwrap();
        assert_eq!(theme.theme, "toggle");
    }
}
