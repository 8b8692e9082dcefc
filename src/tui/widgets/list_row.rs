//! List Row Widget - One saved list in the lists pane

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::lists::validation::{emoji_or_default, truncate_title, DISPLAY_TITLE_LEN};
use crate::models::ProgramList;
use crate::tui::theme::Theme;

pub struct ListRow<'a> {
    list: &'a ProgramList,
    selected: bool,
    /// The catalog is showing this list's programs
    active: bool,
    /// A membership change is in flight
    updating: bool,
    theme: &'a Theme,
}

impl<'a> ListRow<'a> {
    pub fn new(list: &'a ProgramList, theme: &'a Theme) -> Self {
        Self {
            list,
            selected: false,
            active: false,
            updating: false,
            theme,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn updating(mut self, updating: bool) -> Self {
        self.updating = updating;
        self
    }

    pub fn line(&self) -> Line<'static> {
        let title_style = match (self.selected, self.active) {
            (true, _) => self.theme.selected(),
            (false, true) => Style::default()
                .fg(self.theme.brand)
                .add_modifier(Modifier::BOLD),
            _ => Style::default().fg(self.theme.text_primary),
        };
        let mut spans = vec![
            Span::raw(format!("{} ", emoji_or_default(Some(&self.list.emoji)))),
            Span::styled(truncate_title(&self.list.title, DISPLAY_TITLE_LEN), title_style),
            Span::styled(
                format!(" ({})", self.list.program_ids.len()),
                Style::default().fg(self.theme.text_muted),
            ),
        ];
        if self.updating {
            spans.push(Span::styled(" ⟳", Style::default().fg(self.theme.yellow)));
        }
        Line::from(spans)
    }
}

impl Widget for ListRow<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.line()).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(title: &str, emoji: &str) -> ProgramList {
        ProgramList {
            id: "l1".to_string(),
            title: title.to_string(),
            emoji: emoji.to_string(),
            program_ids: vec!["a".to_string(), "b".to_string()],
            ..ProgramList::default()
        }
    }

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_long_titles_are_truncated() {
        let theme = Theme::default();
        let list = list("Universities I would love to attend someday", "🎓");
        let line = ListRow::new(&list, &theme).line();
        let rendered = text(&line);
        assert!(rendered.starts_with("🎓 Universities I woul…"));
        assert!(rendered.ends_with("(2)"));
    }

    #[test]
    fn test_blank_emoji_falls_back() {
        let theme = Theme::default();
        let list = list("Shortlist", "");
        let line = ListRow::new(&list, &theme).updating(true).line();
        let rendered = text(&line);
        assert!(rendered.starts_with("📋 Shortlist"));
        assert!(rendered.ends_with("⟳"));
    }
}
