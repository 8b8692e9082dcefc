//! Message Area Widget
//!
//! The advisor conversation: user turns, rendered replies, any alerts a reply
//! carried, and a thinking indicator while a turn is in flight.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget,
    },
};

use crate::chat::HistoryState;
use crate::models::ChatMessage;
use crate::tui::theme::Theme;

use super::markdown::{render_markdown, render_reply};

const THINKING_FRAMES: [&str; 4] = ["   ", ".  ", ".. ", "..."];

pub struct MessageArea<'a> {
    messages: &'a [ChatMessage],
    history: HistoryState,
    pending: bool,
    /// Lines scrolled up from the bottom
    scroll: u16,
    frame: u8,
    theme: &'a Theme,
}

impl<'a> MessageArea<'a> {
    pub fn new(messages: &'a [ChatMessage], theme: &'a Theme) -> Self {
        Self {
            messages,
            history: HistoryState::Loaded,
            pending: false,
            scroll: 0,
            frame: 0,
            theme,
        }
    }

    pub fn history(mut self, history: HistoryState) -> Self {
        self.history = history;
        self
    }

    pub fn pending(mut self, pending: bool) -> Self {
        self.pending = pending;
        self
    }

    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn frame(mut self, frame: u8) -> Self {
        self.frame = frame;
        self
    }

    fn message_lines(&self, msg: &ChatMessage, width: usize) -> Vec<Line<'static>> {
        let (icon, who, color) = if msg.is_user {
            ("👤", "You", self.theme.user_bubble)
        } else {
            ("🎓", "Advisor", self.theme.advisor_bubble)
        };
        let mut lines = vec![Line::from(vec![
            Span::styled(
                format!("{} {}", icon, who),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", msg.timestamp.format("%H:%M")),
                Style::default().fg(self.theme.text_muted),
            ),
        ])];

        for alert in &msg.alert {
            lines.push(Line::from(Span::styled(
                format!("⚠ {}: {}", alert.kind.replace('_', " "), alert.message),
                Style::default().fg(self.theme.alert_fg),
            )));
        }

        let body = if msg.is_user {
            render_markdown(&msg.text, self.theme, width)
        } else {
            render_reply(&msg.text, self.theme, width)
        };
        lines.extend(body);
        lines.push(Line::from(""));
        lines
    }

    fn placeholder(&self) -> Option<Line<'static>> {
        let (text, color) = match &self.history {
            HistoryState::Loading | HistoryState::NotLoaded if self.messages.is_empty() => {
                ("Loading your conversation...".to_string(), self.theme.text_muted)
            }
            HistoryState::Failed(message) => (message.clone(), self.theme.red),
            _ if self.messages.is_empty() => (
                "Ask the advisor anything about programs, fees or your fit.".to_string(),
                self.theme.text_muted,
            ),
            _ => return None,
        };
        Some(Line::from(Span::styled(text, Style::default().fg(color))))
    }

    /// Reply requested but no text has arrived yet
    fn awaiting_first_chunk(&self) -> bool {
        self.pending
            && self
                .messages
                .last()
                .map_or(true, |m| m.is_user || m.text.is_empty())
    }
}

impl Widget for MessageArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false))
            .title(" Conversation ");

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 1 || inner.width < 2 {
            return;
        }

        // Leave a column for the scrollbar
        let width = inner.width.saturating_sub(1) as usize;
        let mut lines: Vec<Line> = Vec::new();
        if let Some(line) = self.placeholder() {
            lines.push(line);
            lines.push(Line::from(""));
        }
        for msg in self.messages {
            if !msg.is_user && msg.text.is_empty() && msg.alert.is_empty() {
                continue;
            }
            lines.extend(self.message_lines(msg, width));
        }
        if self.awaiting_first_chunk() {
            let dots = THINKING_FRAMES[(self.frame as usize / 4) % THINKING_FRAMES.len()];
            lines.push(Line::from(Span::styled(
                format!("🎓 Thinking{}", dots),
                Style::default()
                    .fg(self.theme.advisor_bubble)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        // Anchor to the bottom; scroll counts lines up from there
        let total = lines.len();
        let height = inner.height as usize;
        let max_scroll = total.saturating_sub(height);
        let from_bottom = (self.scroll as usize).min(max_scroll);
        let top = max_scroll - from_bottom;

        Paragraph::new(lines)
            .scroll((top as u16, 0))
            .render(inner, buf);

        if total > height {
            let mut state = ScrollbarState::new(max_scroll).position(top);
            let scrollbar_area = Rect {
                x: inner.right().saturating_sub(1),
                width: 1,
                ..inner
            };
            StatefulWidget::render(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                scrollbar_area,
                buf,
                &mut state,
            );
        }
    }
}
