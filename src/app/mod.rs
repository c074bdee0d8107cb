use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::KeyEvent;

use crate::app::constants::{DOWNLOAD_LOG_THRESHOLD_BYTES, PROGRESS_HOLD_TICKS, STATUS_READY};
use crate::app::download::download_file;
use crate::app::helpers::display_name;
use crate::app::logging::StatusMessage;
use crate::app::navigation::{DirectoryNavigator, DownloadRequest, NavEvent, NavOutcome};
use crate::app::progress::ProgressState;
use crate::app::remote_fs::RemoteFs;
use crate::error::NavError;

mod constants;
pub(crate) mod download;
mod handlers;
pub(crate) mod helpers;
pub(crate) mod logging;
pub(crate) mod navigation;
pub(crate) mod progress;
pub(crate) mod remote_fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderMode {
    Help,
    Logs,
    Off,
}

/// Everything the event loop feeds in, one at a time.
#[derive(Debug, Clone, Copy)]
pub(crate) enum AppEvent {
    Key(KeyEvent),
    /// Width and usable list rows.
    Resize(u16, u16),
    Tick,
}

/// The download shown in the progress pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DownloadView {
    pub(crate) file_name: String,
    pub(crate) total: u64,
    pub(crate) failed: bool,
}

pub(crate) struct App {
    remote: Box<dyn RemoteFs>,
    pub(crate) endpoint_label: String,
    pub(crate) navigator: DirectoryNavigator,
    pub(crate) status: Option<StatusMessage>,
    pub(crate) log_lines: VecDeque<String>,
    pub(crate) log_path: Option<PathBuf>,
    pub(crate) download_dir: PathBuf,
    pub(crate) progress: ProgressState,
    pub(crate) download: Option<DownloadView>,
    progress_hold: u32,
    pub(crate) header_mode: HeaderMode,
}

impl App {
    pub(crate) fn new(
        remote: Box<dyn RemoteFs>,
        endpoint_label: String,
        start_dir: &str,
        show_hidden: bool,
        download_dir: PathBuf,
        log_path: Option<PathBuf>,
    ) -> Result<Self, NavError> {
        let navigator = DirectoryNavigator::open(remote.as_ref(), start_dir, show_hidden)?;
        let mut app = Self {
            remote,
            endpoint_label,
            navigator,
            status: None,
            log_lines: VecDeque::new(),
            log_path,
            download_dir,
            progress: ProgressState::default(),
            download: None,
            progress_hold: 0,
            header_mode: HeaderMode::Help,
        };
        app.log_line(&format!("Connected to {}", app.endpoint_label));
        app.set_status(STATUS_READY);
        Ok(app)
    }

    pub(crate) fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }

    /// Dispatches one event. Returns `true` when the user asked to quit.
    pub(crate) fn handle_event(&mut self, event: AppEvent) -> Result<bool> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize(width, rows) => {
                self.navigate(NavEvent::Resize(width, rows));
                Ok(false)
            }
            AppEvent::Tick => {
                self.on_tick();
                Ok(false)
            }
        }
    }

    fn on_tick(&mut self) {
        self.expire_status();
        if self.progress.tick() {
            return;
        }
        if self.download.is_some() && self.progress.is_settled() {
            if self.progress_hold == 0 {
                self.download = None;
                self.progress.reset();
            } else {
                self.progress_hold -= 1;
            }
        }
    }

    pub(crate) fn navigate(&mut self, event: NavEvent) {
        match self.navigator.handle(self.remote.as_ref(), event) {
            Ok(outcome) => self.apply_outcome(outcome),
            Err(err) => self.set_status(err.to_string()),
        }
    }

    fn apply_outcome(&mut self, outcome: NavOutcome) {
        match outcome {
            NavOutcome::Entered { path } => {
                let name = display_name(&path).to_string();
                self.set_status(format!("Entered {name}"));
            }
            NavOutcome::Download(request) => self.start_download(request),
            NavOutcome::Unchanged | NavOutcome::Resized => {}
        }
    }

    /// Runs a download to completion inside the current event; ticks animate the bar afterwards.
    fn start_download(&mut self, request: DownloadRequest) {
        self.set_status(format!("Downloading {}", request.file_name));
        self.progress.reset();
        self.download = Some(DownloadView {
            file_name: request.file_name.clone(),
            total: request.size,
            failed: false,
        });

        let remote = self.remote.as_ref();
        let progress = &mut self.progress;
        let mut milestones = Vec::new();
        let mut next_log = DOWNLOAD_LOG_THRESHOLD_BYTES;
        let result = download_file(
            remote,
            &request.remote_dir,
            &request.file_name,
            &self.download_dir,
            &mut |task| {
                progress.set_target(task.bytes_transferred, request.size);
                if task.bytes_transferred >= next_log {
                    milestones.push(format!("{}: {} bytes received", task.source_path, task.bytes_transferred));
                    next_log = task.bytes_transferred + DOWNLOAD_LOG_THRESHOLD_BYTES;
                }
            },
        );
        for line in milestones {
            self.log_line(&line);
        }

        match result {
            Ok(written) => {
                self.progress.set_target(written, written);
                if let Some(view) = &mut self.download {
                    view.total = written;
                }
                self.progress_hold = PROGRESS_HOLD_TICKS;
                let destination = self.download_dir.join(display_name(&request.file_name));
                self.set_status(format!(
                    "Downloaded {} ({written} bytes) to {}",
                    request.file_name,
                    destination.display()
                ));
            }
            Err(err) => {
                if let Some(view) = &mut self.download {
                    view.failed = true;
                }
                self.progress_hold = PROGRESS_HOLD_TICKS;
                self.set_status(err.to_string());
            }
        }
    }

    pub(super) fn toggle_hidden(&mut self) {
        match self.navigator.toggle_hidden(self.remote.as_ref()) {
            Ok(_) => {
                let state = if self.navigator.show_hidden() { "shown" } else { "hidden" };
                self.set_status(format!("Hidden files {state}"));
            }
            Err(err) => self.set_status(err.to_string()),
        }
    }

    pub(super) fn reload(&mut self) {
        match self.navigator.reload(self.remote.as_ref()) {
            Ok(_) => {
                let count = self.navigator.state().items.iter().filter(|e| !e.is_parent).count();
                self.set_status(format!("Reloaded, {count} entries"));
            }
            Err(err) => self.set_status(err.to_string()),
        }
    }

    pub(super) fn cycle_header_mode(&mut self) {
        self.header_mode = match self.header_mode {
            HeaderMode::Help => HeaderMode::Logs,
            HeaderMode::Logs => HeaderMode::Off,
            HeaderMode::Off => HeaderMode::Help,
        };
    }
}

#[cfg(test)]
impl App {
    /// App over a mock tree, opened at `/home/user`, downloading into a fresh temp dir.
    pub(crate) fn for_tests(fs: remote_fs::MockRemoteFs) -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let download_dir = std::env::temp_dir().join(format!("sftp-browse-app-{nanos}"));
        std::fs::create_dir_all(&download_dir).unwrap();
        Self::new(
            Box::new(fs),
            "tester@example.com".to_string(),
            "/home/user",
            false,
            download_dir,
            None,
        )
        .unwrap()
    }
}
