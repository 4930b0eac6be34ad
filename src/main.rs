use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use xpdash::charts::ChartKind;
use xpdash::cli;
use xpdash::config::Theme;

#[derive(Debug, Parser)]
#[command(name = "xpdash")]
#[command(about = "Personal progress dashboard for the learning platform's GraphQL API")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and store the session token (password read from stdin or XPDASH_PASSWORD)
    Login {
        /// Username or email; prompted for when omitted
        username: Option<String>,
    },
    /// Remove the stored session token
    Logout,
    /// Show the current session, module and theme
    Status,
    /// Load a module's data and print the dashboard summary
    Summary {
        /// Module id (defaults to the preferred module)
        #[arg(long)]
        module: Option<u32>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Render a chart as SVG: xp-bar, pass-fail, timeline, audit-history, audit-totals
    Chart {
        kind: ChartKind,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Palette to paint with: dark or light
        #[arg(long)]
        theme: Option<String>,
    },
    /// List known modules, or select the preferred one
    Modules {
        /// Module id to remember as preferred
        #[arg(long)]
        select: Option<u32>,
    },
    /// Show, set or toggle the color theme
    Theme {
        /// dark, light or toggle
        value: Option<String>,
    },
    /// Start the local web dashboard
    Web {
        /// Listen address (default from config: 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open a browser window
        #[arg(long)]
        no_open: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective merged configuration
    Show,
    /// Write a default config to ~/.xpdash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a single value, e.g. `display.theme light`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Login { username } => cli::run_login(username.as_deref()),
        Commands::Logout => cli::run_logout(),
        Commands::Status => cli::run_status(),
        Commands::Summary { module, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_summary(module, fmt)
        }
        Commands::Chart { kind, out, theme } => {
            let theme = theme
                .map(|t| Theme::parse(&t).with_context(|| format!("unknown theme '{t}'")))
                .transpose()?;
            cli::run_chart(kind, out.as_deref(), theme)
        }
        Commands::Modules { select } => cli::run_modules(select),
        Commands::Theme { value } => cli::run_theme(value.as_deref()),
        Commands::Web { addr, no_open } => cli::run_web(addr.as_deref(), no_open),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
