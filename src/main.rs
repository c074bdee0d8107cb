use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use secrecy::ExposeSecret;

mod app;
mod config;
mod error;
mod model;
mod ssh;
mod ui;

use app::remote_fs::RemoteFs;
use app::{App, AppEvent};
use config::{Cli, Settings};
use error::KeyError;
use ssh::keys::{self, Credential};
use ssh::known_hosts::HostVerifier;
use ui::theme::Theme;

const TICK_RATE: Duration = Duration::from_millis(33);

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config::config_path()?,
    };
    let file_config = config::load_file_config(&config_path)?;
    let settings = Settings::resolve(&cli, file_config, std::env::var("USER").ok())?;
    let log_path = config::log_path()?;
    app::logging::prune_log_file(&log_path);

    let credential = load_credential(&settings)?;
    let verifier = HostVerifier::load(&settings.known_hosts)
        .with_context(|| format!("load known hosts {}", settings.known_hosts.display()))?;
    let session = ssh::connect(&settings.endpoint, &credential, &verifier)?;
    let auth_note = format!(
        "Authenticated with {} key, host verified against {} known hosts entries",
        credential.algorithm(),
        verifier.len()
    );
    drop(credential);

    let start_dir = match &settings.start_dir {
        Some(dir) => dir.clone(),
        None => login_dir(&session),
    };
    let download_dir = std::env::current_dir().context("current dir")?;
    let mut app = App::new(
        Box::new(session),
        settings.endpoint.label(),
        &start_dir,
        settings.show_hidden,
        download_dir,
        Some(log_path),
    )
    .with_context(|| format!("open start directory {start_dir}"))?;
    app.log_line(&auth_note);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let result = run_app(&mut terminal, &mut app, &Theme::default());

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

/// Loads the key, asking for a passphrase once if the key turns out to be encrypted.
fn load_credential(settings: &Settings) -> Result<Credential> {
    let passphrase = config::passphrase(settings.passphrase_prompt)?;
    match keys::load_file(&settings.key_path, passphrase.expose_secret()) {
        Ok(credential) => Ok(credential),
        Err(KeyError::DecryptionFailed(_))
            if passphrase.expose_secret().is_empty() && !settings.passphrase_prompt =>
        {
            let passphrase = config::prompt_passphrase()?;
            Ok(keys::load_file(&settings.key_path, passphrase.expose_secret())?)
        }
        Err(err) => Err(err.into()),
    }
}

/// The remote login directory: `pwd` output, else the server's idea of `.`.
fn login_dir(session: &ssh::Session) -> String {
    if let Ok(output) = ssh::command::run_command(session.transport(), "pwd") {
        let dir = output.trim();
        if dir.starts_with('/') {
            return dir.to_string();
        }
    }
    session
        .realpath(".")
        .unwrap_or_else(|_| model::ROOT_DIR.to_string())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    theme: &Theme,
) -> Result<()> {
    let mut last_tick = Instant::now();
    let mut viewport = (0, 0);

    loop {
        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        let current = (cols, ui::helpers::list_rows(rows, app.header_mode));
        if current != viewport {
            viewport = current;
            app.handle_event(AppEvent::Resize(current.0, current.1))?;
        }

        terminal.draw(|frame| ui::draw_ui(frame, app, theme))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            // resize events are picked up by the size check at the top of the loop
            if let Event::Key(key) = event::read()? {
                if app.handle_event(AppEvent::Key(key))? {
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.handle_event(AppEvent::Tick)?;
            last_tick = Instant::now();
        }
    }
}
