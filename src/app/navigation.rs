use crate::app::helpers::{join_remote, parent_remote_dir};
use crate::app::remote_fs::RemoteFs;
use crate::error::NavError;
use crate::model::{NavigationState, RemoteEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NavEvent {
    EnterParent,
    SelectEntry(usize),
    Resize(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DownloadRequest {
    pub(crate) remote_dir: String,
    pub(crate) file_name: String,
    pub(crate) size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NavOutcome {
    /// The state was replaced with a fresh listing of `path`.
    Entered { path: String },
    /// Nothing to do, e.g. going up from `/`.
    Unchanged,
    Download(DownloadRequest),
    Resized,
}

/// Remote directory browser state machine.
///
/// Every directory change builds a complete new [`NavigationState`] from one
/// listing and swaps it in only when the listing succeeded.
#[derive(Debug, Clone)]
pub(crate) struct DirectoryNavigator {
    state: NavigationState,
    selected: usize,
    viewport: (u16, u16),
    show_hidden: bool,
}

impl DirectoryNavigator {
    pub(crate) fn open(fs: &dyn RemoteFs, start: &str, show_hidden: bool) -> Result<Self, NavError> {
        let state = load_state(fs, start, show_hidden)?;
        Ok(Self {
            state,
            selected: 0,
            viewport: (0, 0),
            show_hidden,
        })
    }

    pub(crate) fn state(&self) -> &NavigationState {
        &self.state
    }

    pub(crate) fn selected(&self) -> usize {
        self.selected
    }

    pub(crate) fn selected_entry(&self) -> Option<&RemoteEntry> {
        self.state.items.get(self.selected)
    }

    pub(crate) fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    pub(crate) fn handle(&mut self, fs: &dyn RemoteFs, event: NavEvent) -> Result<NavOutcome, NavError> {
        match event {
            NavEvent::EnterParent => self.enter_parent(fs),
            NavEvent::SelectEntry(index) => self.select_entry(fs, index),
            NavEvent::Resize(width, height) => {
                self.viewport = (width, height);
                self.clamp_selection();
                Ok(NavOutcome::Resized)
            }
        }
    }

    fn enter_parent(&mut self, fs: &dyn RemoteFs) -> Result<NavOutcome, NavError> {
        if self.state.is_root() {
            return Ok(NavOutcome::Unchanged);
        }
        let parent = parent_remote_dir(&self.state.current_path);
        self.change_dir(fs, &parent)
    }

    fn select_entry(&mut self, fs: &dyn RemoteFs, index: usize) -> Result<NavOutcome, NavError> {
        let Some(entry) = self.state.items.get(index) else {
            return Ok(NavOutcome::Unchanged);
        };
        if entry.is_parent {
            return self.enter_parent(fs);
        }
        if entry.is_dir {
            let target = join_remote(&self.state.current_path, &entry.name);
            return self.change_dir(fs, &target);
        }
        Ok(NavOutcome::Download(DownloadRequest {
            remote_dir: self.state.current_path.clone(),
            file_name: entry.name.clone(),
            size: entry.size,
        }))
    }

    /// Re-lists the current directory, e.g. after toggling hidden entries.
    pub(crate) fn reload(&mut self, fs: &dyn RemoteFs) -> Result<NavOutcome, NavError> {
        let current = self.state.current_path.clone();
        let state = load_state(fs, &current, self.show_hidden)?;
        let keep = self.selected;
        self.state = state;
        self.selected = keep;
        self.clamp_selection();
        Ok(NavOutcome::Entered { path: current })
    }

    pub(crate) fn toggle_hidden(&mut self, fs: &dyn RemoteFs) -> Result<NavOutcome, NavError> {
        self.show_hidden = !self.show_hidden;
        let outcome = self.reload(fs);
        if outcome.is_err() {
            self.show_hidden = !self.show_hidden;
        }
        outcome
    }

    fn change_dir(&mut self, fs: &dyn RemoteFs, target: &str) -> Result<NavOutcome, NavError> {
        let state = load_state(fs, target, self.show_hidden)?;
        let path = state.current_path.clone();
        self.state = state;
        self.selected = 0;
        Ok(NavOutcome::Entered { path })
    }

    pub(crate) fn move_selection(&mut self, delta: isize) {
        if self.state.items.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.state.items.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.state.items.len().saturating_sub(1);
    }

    /// Rows one page of the list spans, derived from the last resize.
    pub(crate) fn page_size(&self) -> usize {
        usize::from(self.viewport.1).max(1)
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.state.items.len().saturating_sub(1));
    }
}

/// Canonicalises `path`, lists it and builds a full state. Any failure leaves the caller untouched.
fn load_state(fs: &dyn RemoteFs, path: &str, show_hidden: bool) -> Result<NavigationState, NavError> {
    let list_failed = |source| NavError::ListFailed {
        path: path.to_string(),
        source,
    };
    let canonical = fs.realpath(path).map_err(list_failed)?;
    let mut entries = fs.list_dir(&canonical).map_err(|source| NavError::ListFailed {
        path: canonical.clone(),
        source,
    })?;
    if !show_hidden {
        entries.retain(|entry| !entry.is_hidden());
    }
    Ok(NavigationState::from_listing(canonical, entries))
}
