use ratatui::layout::Constraint;

pub(crate) const APP_TITLE: &str = "SFTP BROWSE";
pub(crate) const HELP_TEXT: &str =
    "(enter) open/download | (bksp) up | (.) hidden | (r)eload | (v)iew | (q)uit";

pub(crate) const HEADER_HEIGHT: u16 = 3;
pub(crate) const FOOTER_HEIGHT: u16 = 1;
pub(crate) const PANEL_BORDER_ROWS: u16 = 2;
pub(crate) const PROGRESS_HEIGHT: u16 = 3;

pub(crate) const HEADER_COLUMN_PERCENTAGES: [u16; 2] = [30, 70];
pub(crate) const BODY_COLUMN_PERCENTAGES: [u16; 2] = [65, 35];

pub(crate) const SIZE_COLUMN_WIDTH: usize = 10;
pub(crate) const DETAIL_LABEL_WIDTH: usize = 9;

pub(crate) fn header_columns() -> [Constraint; 2] {
    HEADER_COLUMN_PERCENTAGES.map(Constraint::Percentage)
}

pub(crate) fn body_columns() -> [Constraint; 2] {
    BODY_COLUMN_PERCENTAGES.map(Constraint::Percentage)
}
