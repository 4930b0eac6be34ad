//! Embedded HTML/CSS/JS shell for the xpdash web dashboard.
//!
//! The page is compiled into the binary as a string constant. It owns only
//! navigation and hover behavior; every view is rendered by the server.

/// The single-page shell.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en" data-theme="dark">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>xpdash</title>
<style>
:root {
  --bg: #121212;
  --surface: #1e1e1e;
  --border: #333333;
  --text: #e0e0e0;
  --text-muted: #a0a0a0;
  --accent: #64b5f6;
  --green: #81c784;
  --red: #e57373;
  --yellow: #ffb74d;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}
[data-theme="light"] {
  --bg: #f5f5f5;
  --surface: #ffffff;
  --border: #dddddd;
  --text: #222222;
  --text-muted: #666666;
  --accent: #3498db;
  --green: #2ecc71;
  --red: #e74c3c;
  --yellow: #f39c12;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

/* Layout */
.topbar {
  display: flex;
  justify-content: space-between;
  align-items: center;
  padding: 12px 24px;
  background: var(--surface);
  border-bottom: 1px solid var(--border);
}
.topbar nav a {
  color: var(--text-muted);
  text-decoration: none;
  margin-right: 16px;
}
.topbar nav a.active { color: var(--accent); font-weight: 600; }
.controls { display: flex; gap: 8px; }
main { padding: 24px; max-width: 1100px; margin: 0 auto; }
h2 { margin-bottom: 16px; }
h3 { margin: 24px 0 8px; }

/* Widgets */
button, select, input {
  background: var(--surface);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 6px 12px;
  font: inherit;
}
button { cursor: pointer; }
.stats { display: flex; flex-wrap: wrap; gap: 12px; margin-bottom: 16px; }
.stat {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 12px 16px;
  min-width: 140px;
}
.stat-value { font-size: 22px; font-weight: 600; }
.stat-label { color: var(--text-muted); font-size: 12px; }
.chart-box {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 8px;
  margin-bottom: 16px;
}
.chart-box svg { width: 100%; height: auto; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid var(--border); }
th { color: var(--text-muted); font-weight: 500; }
td.pass { color: var(--green); }
td.fail { color: var(--red); }
td.pending { color: var(--yellow); }
.profile { display: grid; grid-template-columns: 140px 1fr; gap: 4px 12px; margin-bottom: 16px; }
.profile dt { color: var(--text-muted); }
.muted, .no-data { color: var(--text-muted); }
.error-message { color: var(--red); margin-bottom: 8px; }

/* Login */
.login { max-width: 360px; margin: 80px auto; }
.login form { display: flex; flex-direction: column; gap: 12px; margin-top: 16px; }
.login label { display: flex; flex-direction: column; gap: 4px; color: var(--text-muted); }
.notice { padding: 8px 12px; border-radius: var(--radius); background: var(--surface); }
.notice.error { color: var(--red); border: 1px solid var(--red); }

/* Tooltip */
#tooltip {
  position: fixed;
  pointer-events: none;
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 4px;
  padding: 6px 10px;
  white-space: pre-line;
  font-size: 12px;
  display: none;
  z-index: 10;
}
.loading { color: var(--text-muted); padding: 24px; }
</style>
</head>
<body>
<div id="app"><div class="loading">Loading...</div></div>
<div id="tooltip"></div>
<script>
// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  return res.json();
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------
let applyingRoute = false;

function show(view) {
  if (view.error) {
    document.getElementById('app').innerHTML =
      '<main><div class="error-message">' + esc(view.error) + '</div></main>';
    return;
  }
  document.documentElement.setAttribute('data-theme', view.theme);
  document.getElementById('app').innerHTML = view.html;
  if (location.hash !== view.route) {
    applyingRoute = true;
    location.hash = view.route;
  }
  bind();
}

async function route() {
  if (applyingRoute) { applyingRoute = false; return; }
  const key = location.hash.replace(/^#/, '');
  document.getElementById('app').innerHTML = '<div class="loading">Loading...</div>';
  show(await api('GET', '/view?route=' + encodeURIComponent(key)));
}

function bind() {
  const form = document.getElementById('login-form');
  if (form) {
    form.addEventListener('submit', async (e) => {
      e.preventDefault();
      const data = new FormData(form);
      show(await api('POST', '/api/login', {
        username: data.get('username'),
        password: data.get('password'),
      }));
    });
  }
  const logout = document.getElementById('logout');
  if (logout) {
    logout.addEventListener('click', async () => show(await api('POST', '/api/logout')));
  }
  const theme = document.getElementById('theme-toggle');
  if (theme) {
    theme.addEventListener('click', async () => {
      await api('POST', '/api/theme', { theme: 'toggle' });
      route();
    });
  }
  const modules = document.getElementById('module-select');
  if (modules) {
    modules.addEventListener('change', async () => {
      show(await api('POST', '/api/module', { module: Number(modules.value) }));
    });
  }
}

// ---------------------------------------------------------------------------
// Tooltips
// ---------------------------------------------------------------------------
const tooltip = document.getElementById('tooltip');

document.addEventListener('mousemove', (e) => {
  const target = e.target.closest ? e.target.closest('[data-tooltip]') : null;
  if (!target) return;
  tooltip.textContent = target.getAttribute('data-tooltip');
  tooltip.style.left = (e.clientX + 12) + 'px';
  tooltip.style.top = (e.clientY + 12) + 'px';
  tooltip.style.display = 'block';
});

document.addEventListener('mouseout', (e) => {
  if (e.target.closest && e.target.closest('[data-tooltip]')) {
    tooltip.style.display = 'none';
  }
});

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------
function esc(s) {
  if (!s) return '';
  return s.replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;').replace(/"/g,'&quot;');
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
window.addEventListener('hashchange', route);
route();
</script>
</body>
</html>"##;
