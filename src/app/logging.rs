use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{Datelike, NaiveDateTime};

use crate::app::App;
use crate::app::constants::{
    LOG_MAX_ENTRIES, LOG_MAX_IN_MEMORY, LOG_PARSE_FORMAT, LOG_RETENTION_DAYS, LOG_SEPARATOR,
    LOG_TIMESTAMP_FORMAT, STATUS_TTL_TICKS,
};

impl App {
    /// Shows `message` in the status line for a while and appends it to the log.
    pub(crate) fn set_status(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.status = Some(StatusMessage {
            text: message.clone(),
            ticks_left: STATUS_TTL_TICKS,
        });
        self.log_line(&message);
    }

    /// Log only, status line untouched.
    pub(crate) fn log_line(&mut self, message: &str) {
        let timestamp = chrono::Local::now().format(LOG_TIMESTAMP_FORMAT);
        let line = format!("{timestamp}{LOG_SEPARATOR}{message}");
        if let Some(path) = &self.log_path {
            append_line(path, &line);
        }
        self.log_lines.push_back(line);
        while self.log_lines.len() > LOG_MAX_IN_MEMORY {
            self.log_lines.pop_front();
        }
    }

    pub(super) fn expire_status(&mut self) {
        if let Some(status) = &mut self.status {
            status.ticks_left = status.ticks_left.saturating_sub(1);
            if status.ticks_left == 0 {
                self.status = None;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StatusMessage {
    pub(crate) text: String,
    pub(crate) ticks_left: u32,
}

fn append_line(path: &Path, line: &str) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(file, "{line}");
    }
}

/// Drops lines older than the retention window and caps the file length.
pub(crate) fn prune_log_file(path: &Path) {
    let Ok(content) = fs::read_to_string(path) else {
        return;
    };
    let now = chrono::Local::now().naive_local();
    let cutoff = now - chrono::Duration::days(LOG_RETENTION_DAYS);
    let mut kept = Vec::new();
    for line in content.lines() {
        let Some((timestamp, _)) = line.split_once(LOG_SEPARATOR) else {
            continue;
        };
        if log_timestamp(timestamp, now).is_some_and(|written| written >= cutoff) {
            kept.push(line.to_string());
        }
    }
    if kept.len() > LOG_MAX_ENTRIES {
        kept = kept.split_off(kept.len() - LOG_MAX_ENTRIES);
    }
    if kept.is_empty() {
        let _ = fs::remove_file(path);
    } else if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
        let _ = fs::write(path, kept.join("\n") + "\n");
    }
}

/// Log timestamps carry no year: a date later than `now` was written the year before.
fn log_timestamp(timestamp: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let in_year = |year: i32| {
        NaiveDateTime::parse_from_str(&format!("{year}-{timestamp}"), LOG_PARSE_FORMAT).ok()
    };
    match in_year(now.year()) {
        Some(parsed) if parsed <= now => Some(parsed),
        _ => in_year(now.year() - 1),
    }
}
