//! Settings View - placeholder until preferences exist

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::theme::Theme;

pub struct SettingsView<'a> {
    theme: &'a Theme,
}

impl<'a> SettingsView<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for SettingsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "⚙ Settings",
                Style::default()
                    .fg(self.theme.text_primary)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Coming soon.",
                Style::default().fg(self.theme.text_muted),
            )),
        ];
        Paragraph::new(lines).centered().render(area, buf);
    }
}
