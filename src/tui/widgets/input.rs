//! Input Widget
//!
//! Single-line text entry with a block cursor at the end

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::tui::theme::Theme;

pub struct InputWidget<'a> {
    content: &'a str,
    focused: bool,
    disabled: bool,
    title: &'a str,
    placeholder: &'a str,
    theme: &'a Theme,
}

impl<'a> InputWidget<'a> {
    pub fn new(content: &'a str, theme: &'a Theme) -> Self {
        Self {
            content,
            focused: false,
            disabled: false,
            title: " Message ",
            placeholder: "Type a message...",
            theme,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Greyed out and without a cursor, e.g. while a reply is streaming
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused && !self.disabled))
            .title(self.title);

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 1 || inner.width < 1 {
            return;
        }

        let text_color = if self.disabled {
            self.theme.text_muted
        } else {
            self.theme.text_primary
        };

        let mut spans = Vec::new();
        if self.content.is_empty() {
            spans.push(Span::styled(
                self.placeholder,
                Style::default().fg(self.theme.text_muted),
            ));
        } else {
            // Keep the tail visible once the text outgrows the box
            let budget = (inner.width as usize).saturating_sub(1);
            let mut start = 0;
            while self.content[start..].width() > budget {
                match self.content[start..].chars().next() {
                    Some(ch) => start += ch.len_utf8(),
                    None => break,
                }
            }
            spans.push(Span::styled(
                &self.content[start..],
                Style::default().fg(text_color),
            ));
        }

        if self.focused && !self.disabled {
            spans.push(Span::styled(
                " ",
                Style::default()
                    .bg(self.theme.text_primary)
                    .add_modifier(Modifier::SLOW_BLINK),
            ));
        }

        Paragraph::new(Line::from(spans)).render(inner, buf);
    }
}
