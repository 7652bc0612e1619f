//! `watchpost` — terminal client for network video recorders.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive session and camera
//! state from `watchpost-core`. Two activities: a camera list (key 1) and a
//! live multiview grid (key 2).
//!
//! Logs are written to a file (default `/tmp/watchpost.log`) to avoid
//! corrupting the terminal UI. A background data bridge task forwards
//! controller state changes into the TUI action loop.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod login_overlay;
mod screens;
mod theme;
mod tui;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use secrecy::SecretString;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use watchpost_api::{NvrClient, TlsMode};
use watchpost_config::ClientConfig;
use watchpost_core::SessionController;

use crate::app::App;
use crate::data_bridge::ConfiguredLogin;

/// Terminal client for viewing and managing NVR cameras.
#[derive(Parser, Debug)]
#[command(name = "watchpost", version, about)]
struct Cli {
    /// Server base URL (e.g., https://nvr.example.com)
    #[arg(short = 'u', long, env = "WATCHPOST_URL")]
    url: Option<String>,

    /// Username to log in as (password via $WATCHPOST_PASSWORD)
    #[arg(short = 'U', long, env = "WATCHPOST_USERNAME")]
    username: Option<String>,

    /// Named config profile
    #[arg(short = 'p', long)]
    profile: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Log file path (defaults to /tmp/watchpost.log)
    #[arg(long, default_value = "/tmp/watchpost.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "watchpost={log_level},watchpost_core={log_level},watchpost_api={log_level}"
        ))
    });

    let log_dir = cli.log_file.parent().unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("watchpost.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Build client settings from CLI args, if a URL was provided.
fn client_config_from_cli(cli: &Cli) -> Result<Option<ClientConfig>> {
    let Some(ref url_str) = cli.url else {
        return Ok(None);
    };
    let url = url_str
        .parse()
        .map_err(|e| eyre!("invalid server URL '{url_str}': {e}"))?;

    let credentials = match (&cli.username, std::env::var("WATCHPOST_PASSWORD").ok()) {
        (Some(username), Some(password)) => Some(watchpost_config::Credentials {
            username: username.clone(),
            password: SecretString::from(password),
        }),
        (Some(_), None) => {
            return Err(eyre!(
                "--username given but $WATCHPOST_PASSWORD is not set"
            ));
        }
        (None, _) => None,
    };

    Ok(Some(ClientConfig {
        url,
        credentials,
        tls: if cli.insecure {
            TlsMode::DangerAcceptInvalid
        } else {
            TlsMode::System
        },
        timeout: std::time::Duration::from_secs(30),
    }))
}

/// Load client settings from the config file profile.
fn client_config_from_file(cli: &Cli) -> Result<ClientConfig> {
    let cfg = watchpost_config::load_config()?;
    let (name, profile) = cfg.profile(cli.profile.as_deref())?;
    let client_config = watchpost_config::profile_to_client_config(profile, name, &cfg.defaults)?;
    Ok(client_config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file — hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    // Priority: CLI flags > config file profile
    let config = match client_config_from_cli(&cli)? {
        Some(config) => config,
        None => client_config_from_file(&cli)?,
    };

    info!(url = %config.url, "starting watchpost");

    let transport = config.transport();
    let client = NvrClient::new(config.url, &transport)?;
    let controller = SessionController::new(client.clone());

    let configured_login = config.credentials.map(|c| ConfiguredLogin {
        username: c.username,
        password: c.password,
    });

    let mut app = App::new(controller, client, configured_login);
    app.run().await?;

    Ok(())
}
