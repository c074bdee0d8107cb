use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::{App, HeaderMode};
use crate::ui::constants::{FOOTER_HEIGHT, HEADER_HEIGHT, body_columns};
use crate::ui::panels::{draw_entry_list, draw_footer, draw_header, draw_side_pane};
use crate::ui::theme::Theme;

pub(crate) mod constants;
pub(crate) mod helpers;
mod panels;
pub(crate) mod theme;

pub(crate) fn draw_ui(frame: &mut Frame<'_>, app: &App, theme: &Theme) {
    let header_height = if app.header_mode == HeaderMode::Off {
        0
    } else {
        HEADER_HEIGHT
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(header_height),
                Constraint::Min(1),
                Constraint::Length(FOOTER_HEIGHT),
            ]
            .as_ref(),
        )
        .split(frame.area());

    if header_height > 0 {
        draw_header(frame, app, theme, rows[0]);
    }
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(body_columns().as_ref())
        .split(rows[1]);
    draw_entry_list(frame, app, theme, body[0]);
    draw_side_pane(frame, app, theme, body[1]);
    draw_footer(frame, app, theme, rows[2]);
}
