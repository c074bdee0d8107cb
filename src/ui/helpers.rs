use ratatui::style::Style;

use crate::app::HeaderMode;
use crate::model::RemoteEntry;
use crate::ui::constants::{FOOTER_HEIGHT, HEADER_HEIGHT, PANEL_BORDER_ROWS};
use crate::ui::theme::Theme;

pub(crate) fn truncate_text(value: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let count = value.chars().count();
    if count <= max_width {
        return value.to_string();
    }
    if max_width <= 3 {
        return value.chars().take(max_width).collect();
    }
    let mut trimmed: String = value.chars().take(max_width - 3).collect();
    trimmed.push_str("...");
    trimmed
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0usize;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// Single-width glyph for an entry, picked by kind and extension.
pub(crate) fn entry_icon(entry: &RemoteEntry) -> &'static str {
    if entry.is_parent {
        return "↰";
    }
    if entry.is_dir {
        return "▸";
    }
    let extension = entry
        .name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "zip" | "tar" | "gz" | "tgz" | "xz" | "bz2" | "zst" | "7z" => "≡",
        "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "bmp" => "◐",
        "rs" | "go" | "py" | "js" | "ts" | "c" | "h" | "cpp" | "java" | "sh" => "λ",
        "md" | "txt" | "log" | "csv" | "json" | "toml" | "yaml" | "yml" => "¶",
        _ => "·",
    }
}

pub(crate) fn entry_style(entry: &RemoteEntry, theme: &Theme) -> Style {
    let color = if entry.is_hidden() {
        theme.hidden
    } else if entry.is_dir {
        theme.directory
    } else {
        theme.file
    };
    Style::default().fg(color)
}

/// Rows left for list entries once header, footer and borders are drawn.
pub(crate) fn list_rows(total_rows: u16, header_mode: HeaderMode) -> u16 {
    let header = if header_mode == HeaderMode::Off {
        0
    } else {
        HEADER_HEIGHT
    };
    total_rows
        .saturating_sub(header)
        .saturating_sub(FOOTER_HEIGHT)
        .saturating_sub(PANEL_BORDER_ROWS)
}

pub(crate) fn list_state(selected: usize, len: usize) -> ratatui::widgets::ListState {
    let mut state = ratatui::widgets::ListState::default();
    if len == 0 {
        state.select(None);
    } else {
        state.select(Some(selected.min(len.saturating_sub(1))));
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> RemoteEntry {
        RemoteEntry::from_stat(name.to_string(), Some(1), Some(0o100644), None)
    }

    #[test]
    fn truncate_text_handles_edges() {
        assert_eq!(truncate_text("abc", 0), "");
        assert_eq!(truncate_text("abc", 2), "ab");
        assert_eq!(truncate_text("abcdef", 4), "a...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn format_bytes_scales_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024 / 2), "1.5 MB");
    }

    #[test]
    fn entry_icon_by_extension() {
        assert_eq!(entry_icon(&file("backup.TAR")), "≡");
        assert_eq!(entry_icon(&file("main.rs")), "λ");
        assert_eq!(entry_icon(&file("Makefile")), "·");
        assert_eq!(entry_icon(&RemoteEntry::parent_marker()), "↰");
    }

    #[test]
    fn list_rows_accounts_for_chrome() {
        assert_eq!(list_rows(24, HeaderMode::Help), 24 - 3 - 1 - 2);
        assert_eq!(list_rows(24, HeaderMode::Off), 24 - 1 - 2);
        assert_eq!(list_rows(2, HeaderMode::Logs), 0);
    }

    #[test]
    fn list_state_clamps_selection() {
        assert!(list_state(5, 0).selected().is_none());
        assert_eq!(list_state(5, 3).selected(), Some(2));
    }
}
