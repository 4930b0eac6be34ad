/// Navigation and session state machine tests.
///
/// Drive the app the way the adapters do: start, login, navigate between
/// sections, switch modules, and lose the session mid-flight. Web handler
/// tests at the bottom go through the same app via `web::handle`.
mod common;

use std::sync::Arc;

use serde_json::{Value, json};
use tiny_http::Method;

use common::{Call, FakeTransport, expired_token, live_token};
use xpdash::config::Theme;
use xpdash::dashboard::DashboardData;
use xpdash::router::{AuthState, Notice, Route, Section, View};
use xpdash::storage::{PREFERRED_MODULE_KEY, THEME_KEY, TOKEN_KEY};
use xpdash::web;

fn is_login(view: &View) -> bool {
    matches!(view, View::Login { .. })
}

// ---------------------------------------------------------------------------
// Start and login
// ---------------------------------------------------------------------------

#[test]
fn start_without_token_is_logged_out() {
    let (app, _) = common::app_with(FakeTransport::new(), None);
    assert_eq!(app.state(), AuthState::LoggedOut);
    assert_eq!(app.route(), Route::Login);
}

#[test]
fn start_with_expired_token_is_logged_out() {
    let (app, store) = common::app_with(FakeTransport::new(), Some(&expired_token()));
    assert_eq!(app.state(), AuthState::LoggedOut);
    assert_eq!(store.get(TOKEN_KEY), None);
}

#[test]
fn start_with_live_token_lands_on_home() {
    let (app, _) = common::app_with(FakeTransport::new(), Some(&live_token()));
    assert_eq!(app.state(), AuthState::LoggedIn);
    assert_eq!(app.route(), Route::HOME);
}

#[test]
fn login_loads_the_dashboard_with_four_queries() {
    let transport = FakeTransport::new();
    let (mut app, _) = common::app_with(Arc::clone(&transport), None);

    let view = app.login("jdoe", "secret");

    assert!(matches!(view, View::Dashboard { section: Section::Profile, .. }));
    assert_eq!(app.state(), AuthState::LoggedIn);
    assert!(app.session().is_authenticated());
    assert_eq!(transport.count_of(Call::SignIn), 1);
    assert_eq!(transport.count(), 5);
}

#[test]
fn failed_login_stays_on_login_with_reason() {
    let transport = FakeTransport::new();
    transport.signin_response(403, r#"{"error":"User does not exist or password incorrect"}"#);
    let (mut app, _) = common::app_with(Arc::clone(&transport), None);

    match app.login("jdoe", "wrong") {
        View::Login { notice: Some(Notice::LoginFailed(reason)) } => {
            assert!(reason.contains("password incorrect"));
        }
        other => panic!("unexpected view {other:?}"),
    }
    assert_eq!(app.state(), AuthState::LoggedOut);
    assert_eq!(transport.count(), 1);
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[test]
fn logged_out_navigation_redirects_to_login() {
    let transport = FakeTransport::new();
    let (mut app, _) = common::app_with(Arc::clone(&transport), None);

    for raw in ["#/xp", "/transactions", "skills", "", "#/nowhere"] {
        let view = app.navigate(raw);
        assert!(is_login(&view), "{raw}");
        assert_eq!(app.route(), Route::Login);
    }
    assert_eq!(transport.count(), 0);
}

#[test]
fn unknown_and_login_routes_resolve_home_when_logged_in() {
    let (mut app, _) = common::app_with(FakeTransport::new(), Some(&live_token()));
    assert_eq!(app.navigate("#/nowhere").route(), Route::HOME);
    assert_eq!(app.navigate("#/login").route(), Route::HOME);
    assert_eq!(app.navigate("").route(), Route::HOME);
}

#[test]
fn switching_sections_does_not_refetch() {
    let transport = FakeTransport::new();
    let (mut app, _) = common::app_with(Arc::clone(&transport), Some(&live_token()));

    app.navigate("#/profile");
    assert_eq!(transport.count(), 4);

    for raw in ["#/xp", "#/progress", "#/audits", "#/skills", "#/statistics", "#/transactions"] {
        let view = app.navigate(raw);
        assert_eq!(view.route(), Route::parse(raw).unwrap());
    }
    assert_eq!(transport.count(), 4);
}

#[test]
fn invalid_jwt_during_load_redirects_to_login_with_expired_notice() {
    let transport = FakeTransport::new();
    transport.respond(Call::Xp, 200, json!({ "errors": [{ "message": "invalid JWT" }] }));
    let (mut app, store) = common::app_with(Arc::clone(&transport), Some(&live_token()));

    let view = app.navigate("#/xp");

    assert_eq!(view, View::Login { notice: Some(Notice::SessionExpired) });
    assert_eq!(app.state(), AuthState::LoggedOut);
    assert_eq!(app.route(), Route::Login);
    assert_eq!(store.get(TOKEN_KEY), None);
    assert_eq!(
        Notice::SessionExpired.message(),
        "Your session has expired. Please log in again."
    );

    // the notice persists for later navigation until the next login
    assert_eq!(app.navigate("#/skills"), View::Login { notice: Some(Notice::SessionExpired) });
}

#[test]
fn non_auth_failure_shows_error_and_keeps_session() {
    let transport = FakeTransport::new();
    transport.respond(Call::Progress, 500, json!({ "message": "upstream down" }));
    let (mut app, _) = common::app_with(Arc::clone(&transport), Some(&live_token()));

    match app.navigate("#/progress") {
        View::Error { route, message } => {
            assert_eq!(route, Route::Dashboard(Section::Progress));
            assert!(message.contains("upstream down"));
        }
        other => panic!("unexpected view {other:?}"),
    }
    assert_eq!(app.state(), AuthState::LoggedIn);
}

#[test]
fn logout_clears_session_and_cache() {
    let transport = FakeTransport::new();
    let (mut app, store) = common::app_with(Arc::clone(&transport), Some(&live_token()));
    app.navigate("#/xp");
    assert!(app.cache().current().is_some());

    let view = app.logout();

    assert_eq!(view, View::Login { notice: Some(Notice::LoggedOut) });
    assert_eq!(store.get(TOKEN_KEY), None);
    assert!(app.cache().current().is_none());
}

// ---------------------------------------------------------------------------
// Loads
// ---------------------------------------------------------------------------

#[test]
fn stale_generation_is_discarded() {
    let (mut app, _) = common::app_with(FakeTransport::new(), Some(&live_token()));

    let older = app.begin_load();
    let newer = app.begin_load();
    assert!(newer.generation > older.generation);

    let fresh = DashboardData::load(app.client(), newer.module_id).unwrap();
    let stale = DashboardData::load(app.client(), older.module_id).unwrap();

    assert_eq!(app.finish_load(newer, Ok(fresh)), Ok(true));
    assert_eq!(app.finish_load(older, Ok(stale)), Ok(false));
    assert_eq!(app.cache().current().unwrap().generation, newer.generation);
}

#[test]
fn stale_auth_failure_still_ends_the_session() {
    let transport = FakeTransport::new();
    transport.respond(Call::User, 200, json!({ "errors": [{ "message": "invalid JWT" }] }));
    let (mut app, store) = common::app_with(Arc::clone(&transport), Some(&live_token()));

    let older = app.begin_load();
    let _newer = app.begin_load();
    let result = DashboardData::load(app.client(), older.module_id);
    assert!(result.as_ref().is_err_and(|e| e.is_auth()));
    assert_eq!(store.get(TOKEN_KEY), None);

    assert!(app.finish_load(older, result).is_err());
    assert_eq!(app.state(), AuthState::LoggedOut);
    assert_eq!(app.route(), Route::Login);
    assert_eq!(app.current_view(), View::Login { notice: Some(Notice::SessionExpired) });
}

#[test]
fn selecting_a_module_refetches_and_is_remembered() {
    let transport = FakeTransport::new();
    let (mut app, store) = common::app_with(Arc::clone(&transport), Some(&live_token()));
    app.navigate("#/xp");
    assert_eq!(transport.count(), 4);

    let view = app.select_module(84).unwrap();

    assert_eq!(view.route(), Route::Dashboard(Section::Xp));
    assert_eq!(app.module_id(), 84);
    assert_eq!(transport.count(), 8);
    assert_eq!(store.get(PREFERRED_MODULE_KEY).as_deref(), Some("84"));
    assert_eq!(app.cache().current().unwrap().module_id(), 84);
}

#[test]
fn unknown_module_is_rejected() {
    let (mut app, _) = common::app_with(FakeTransport::new(), Some(&live_token()));
    assert!(app.select_module(9999).is_err());
    assert_ne!(app.module_id(), 9999);
}

#[test]
fn theme_toggle_is_persisted() {
    let (mut app, store) = common::app_with(FakeTransport::new(), None);
    assert_eq!(app.theme(), Theme::Dark);

    assert_eq!(app.toggle_theme().unwrap(), Theme::Light);
    assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
    assert_eq!(app.toggle_theme().unwrap(), Theme::Dark);
}

// ---------------------------------------------------------------------------
// Web handlers
// ---------------------------------------------------------------------------

fn json_body(reply: &web::Reply) -> Value {
    serde_json::from_str(&reply.body).unwrap()
}

#[test]
fn web_view_redirects_when_logged_out() {
    let (mut app, _) = common::app_with(FakeTransport::new(), None);
    let reply = web::handle(&mut app, &Method::Get, "/view?route=/xp", "");

    assert_eq!(reply.status, 200);
    let body = json_body(&reply);
    assert_eq!(body["route"], "#/login");
    assert_eq!(body["authenticated"], false);
    assert!(body["html"].as_str().unwrap().contains("login-form"));
}

#[test]
fn web_login_then_view_sections() {
    let (mut app, _) = common::app_with(FakeTransport::new(), None);

    let reply = web::handle(
        &mut app,
        &Method::Post,
        "/api/login",
        r#"{"username":"jdoe","password":"secret"}"#,
    );
    let body = json_body(&reply);
    assert_eq!(body["route"], "#/profile");
    assert_eq!(body["authenticated"], true);
    assert!(body["html"].as_str().unwrap().contains("Jane Doe"));

    let reply = web::handle(&mut app, &Method::Get, "/view?route=%2Fxp", "");
    let body = json_body(&reply);
    assert_eq!(body["route"], "#/xp");
    assert!(body["html"].as_str().unwrap().contains("<svg"));
}

#[test]
fn web_chart_endpoint_serves_svg() {
    let (mut app, _) = common::app_with(FakeTransport::new(), Some(&live_token()));

    let reply = web::handle(&mut app, &Method::Get, "/chart/xp-bar.svg", "");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.content_type, "image/svg+xml");
    assert!(reply.body.starts_with("<svg"));

    let reply = web::handle(&mut app, &Method::Get, "/chart/radar.svg", "");
    assert_eq!(reply.status, 404);
}

#[test]
fn web_chart_requires_a_session() {
    let (mut app, _) = common::app_with(FakeTransport::new(), None);
    let reply = web::handle(&mut app, &Method::Get, "/chart/timeline.svg", "");
    assert_eq!(reply.status, 401);
}

#[test]
fn web_theme_toggle_and_bad_request() {
    let (mut app, _) = common::app_with(FakeTransport::new(), None);

    let reply = web::handle(&mut app, &Method::Post, "/api/theme", r#"{"theme":"toggle"}"#);
    assert_eq!(json_body(&reply)["theme"], "light");

    let reply = web::handle(&mut app, &Method::Post, "/api/theme", r#"{"theme":"sepia"}"#);
    assert_eq!(reply.status, 500);

    let reply = web::handle(&mut app, &Method::Get, "/", "");
    assert!(reply.body.contains("hashchange"));
}
