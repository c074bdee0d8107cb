use ratatui::style::{Color, Modifier, Style};

/// Colours for every panel. Built once in `main` and handed to each draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Theme {
    pub(crate) accent: Color,
    pub(crate) title: Color,
    pub(crate) directory: Color,
    pub(crate) file: Color,
    pub(crate) hidden: Color,
    pub(crate) muted: Color,
    pub(crate) success: Color,
    pub(crate) error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            title: Color::Magenta,
            directory: Color::Blue,
            file: Color::White,
            hidden: Color::DarkGray,
            muted: Color::Gray,
            success: Color::Green,
            error: Color::Red,
        }
    }
}

impl Theme {
    pub(crate) fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn highlight_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD | Modifier::REVERSED)
    }

    pub(crate) fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }
}
