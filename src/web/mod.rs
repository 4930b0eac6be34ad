//! Local web dashboard for xpdash.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The single-page shell with its hash router and tooltip script
//! - Rendered views as JSON, and charts as standalone SVG
//! - Small JSON endpoints for login, logout, theme and module changes
//!
//! Launched via `xpdash web` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;
pub mod pages;

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::router::App;

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// A response before it is handed to the HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

const JSON: &str = "application/json; charset=utf-8";
const HTML: &str = "text/html; charset=utf-8";
const SVG: &str = "image/svg+xml";

impl Reply {
    pub fn json<T: Serialize>(data: &T) -> Result<Self> {
        let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
        Ok(Self { status: 200, content_type: JSON, body })
    }

    pub fn status_json(status: u16, body: &str) -> Self {
        Self { status, content_type: JSON, body: body.to_string() }
    }

    pub fn html(body: &str) -> Self {
        Self { status: 200, content_type: HTML, body: body.to_string() }
    }

    pub fn svg(body: String) -> Self {
        Self { status: 200, content_type: SVG, body }
    }

    pub fn not_found() -> Self {
        Self::status_json(404, r#"{"error": "not found"}"#)
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let mut resp =
            Response::from_data(self.body.into_bytes()).with_status_code(StatusCode(self.status));
        if let Ok(header) = Header::from_bytes("Content-Type", self.content_type) {
            resp.add_header(header);
        }
        resp
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on the given address.
///
/// Blocks the current thread. Requests are handled one at a time, which
/// keeps the single [`App`] free of locking.
pub fn serve(mut app: App, addr: &str, open: bool) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    app.start();
    println!("xpdash dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    if open {
        let _ = open_browser(&format!("http://{addr}"));
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let mut body = String::new();
        if matches!(method, Method::Post | Method::Put) {
            let _ = request.as_reader().read_to_string(&mut body);
        }

        let reply = handle(&mut app, &method, &url, &body);
        let status = reply.status;
        let _ = request.respond(reply.into_response());

        println!(
            "{} {} {} {}",
            method,
            url.split('?').next().unwrap_or(&url),
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

/// Route one request. Handler errors become a JSON 500.
pub fn handle(app: &mut App, method: &Method, url: &str, body: &str) -> Reply {
    match dispatch(app, method, url, body) {
        Ok(reply) => reply,
        Err(e) => Reply {
            status: 500,
            content_type: JSON,
            body: serde_json::json!({ "error": format!("{e:#}") }).to_string(),
        },
    }
}

fn dispatch(app: &mut App, method: &Method, url: &str, body: &str) -> Result<Reply> {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(Reply::html(frontend::INDEX_HTML)),
        (&Method::Get, "/view") => api::get_view(app, url),
        (&Method::Post, "/api/login") => api::post_login(app, body),
        (&Method::Post, "/api/logout") => api::post_logout(app),
        (&Method::Post, "/api/theme") => api::post_theme(app, body),
        (&Method::Post, "/api/module") => api::post_module(app, body),
        (&Method::Get, p) if p.starts_with("/chart/") => api::get_chart(app, p),
        _ => Ok(Reply::not_found()),
    }
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
