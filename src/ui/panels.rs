use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap};

use crate::app::{App, HeaderMode};
use crate::model::{RemoteEntry, format_mod_time};
use crate::ui::constants::{
    APP_TITLE, DETAIL_LABEL_WIDTH, HELP_TEXT, PROGRESS_HEIGHT, SIZE_COLUMN_WIDTH, header_columns,
};
use crate::ui::helpers::{entry_icon, entry_style, format_bytes, list_state, truncate_text};
use crate::ui::theme::Theme;

pub(crate) fn draw_header(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(header_columns().as_ref())
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(APP_TITLE, Style::default().fg(theme.file).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(app.endpoint_label.clone(), Style::default().fg(theme.accent)),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    frame.render_widget(title, columns[0]);

    let (label, body) = match app.header_mode {
        HeaderMode::Logs => {
            let rows = columns[1].height.saturating_sub(2) as usize;
            let mut lines: Vec<String> = app.log_lines.iter().rev().take(rows).cloned().collect();
            lines.reverse();
            ("Logs", lines.join("\n"))
        }
        _ => ("Help", HELP_TEXT.to_string()),
    };
    let header = Paragraph::new(body)
        .block(
            Block::default()
                .title(Line::from(Span::styled(label, theme.title_style())))
                .borders(Borders::ALL),
        )
        .style(theme.muted_style())
        .wrap(Wrap { trim: true });
    frame.render_widget(header, columns[1]);
}

pub(crate) fn draw_entry_list(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let state = app.navigator.state();
    let block = Block::default()
        .title(Line::from(Span::styled(
            truncate_text(&state.current_path, area.width.saturating_sub(4) as usize),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.items.is_empty() {
        let empty = Paragraph::new("Empty directory").style(theme.muted_style());
        frame.render_widget(empty, inner);
        return;
    }

    let name_width = (inner.width as usize).saturating_sub(SIZE_COLUMN_WIDTH + 4);
    let items: Vec<ListItem> = state
        .items
        .iter()
        .map(|entry| entry_row(entry, theme, name_width))
        .collect();
    let list = List::new(items)
        .highlight_style(theme.highlight_style())
        .highlight_symbol(">");
    let mut list_state = list_state(app.navigator.selected(), state.items.len());
    frame.render_stateful_widget(list, inner, &mut list_state);
}

fn entry_row(entry: &RemoteEntry, theme: &Theme, name_width: usize) -> ListItem<'static> {
    let mut name = entry.name.clone();
    if entry.is_dir && !entry.is_parent {
        name.push('/');
    }
    let size = if entry.is_dir {
        String::new()
    } else {
        format_bytes(entry.size)
    };
    ListItem::new(Line::from(vec![
        Span::raw(format!("{} ", entry_icon(entry))),
        Span::styled(
            format!("{:<name_width$}", truncate_text(&name, name_width)),
            entry_style(entry, theme),
        ),
        Span::styled(format!("{size:>SIZE_COLUMN_WIDTH$}"), theme.muted_style()),
    ]))
}

/// Right pane: facts about the selected entry above the download gauge.
pub(crate) fn draw_side_pane(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(PROGRESS_HEIGHT)].as_ref())
        .split(area);
    draw_details(frame, app, theme, rows[0]);
    draw_progress(frame, app, theme, rows[1]);
}

fn draw_details(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let label = |text: &str| {
        Span::styled(
            format!("{text:<DETAIL_LABEL_WIDTH$}"),
            Style::default().add_modifier(Modifier::BOLD),
        )
    };
    let mut lines = match app.navigator.selected_entry() {
        Some(entry) if !entry.is_parent => vec![
            Line::from(vec![label("Name"), Span::raw(entry.name.clone())]),
            Line::from(vec![
                label("Type"),
                Span::raw(if entry.is_dir { "directory" } else { "file" }),
            ]),
            Line::from(vec![label("Size"), Span::raw(format_bytes(entry.size))]),
            Line::from(vec![label("Mode"), Span::raw(entry.permissions.clone())]),
            Line::from(vec![
                label("Modified"),
                Span::raw(entry.modified.map(format_mod_time).unwrap_or_else(|| "-".to_string())),
            ]),
        ],
        Some(_) => vec![Line::from(Span::styled("Parent directory", theme.muted_style()))],
        None => vec![],
    };
    let hidden = if app.navigator.show_hidden() { "shown" } else { "hidden" };
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        format!("Hidden files {hidden}"),
        theme.muted_style(),
    )));
    let details = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Line::from(Span::styled("Details", theme.title_style())))
                .borders(Borders::ALL),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(details, area);
}

fn draw_progress(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .title(Line::from(Span::styled("Download", theme.title_style())))
        .borders(Borders::ALL);
    let Some(download) = &app.download else {
        let idle = Paragraph::new("Idle").style(theme.muted_style()).block(block);
        frame.render_widget(idle, area);
        return;
    };
    let color = if download.failed {
        theme.error
    } else if app.progress.percent() == 100 {
        theme.success
    } else {
        theme.accent
    };
    let label = if download.failed {
        format!("{} failed", download.file_name)
    } else {
        format!(
            "{} {}% of {}",
            download.file_name,
            app.progress.percent(),
            format_bytes(download.total)
        )
    };
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(color))
        .ratio(app.progress.ratio())
        .label(truncate_text(&label, area.width.saturating_sub(2) as usize));
    frame.render_widget(gauge, area);
}

pub(crate) fn draw_footer(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let line = match app.status_text() {
        Some(text) => Line::from(Span::styled(text.to_string(), Style::default().fg(theme.file))),
        None => {
            let count = app.navigator.state().items.iter().filter(|e| !e.is_parent).count();
            Line::from(Span::styled(format!("{count} entries"), theme.muted_style()))
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}
