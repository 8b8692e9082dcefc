//! Chat View - The advisor conversation above a message box

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Widget,
};

use crate::app::AppState;
use crate::tui::theme::Theme;
use crate::tui::widgets::{InputWidget, MessageArea};

pub struct ChatView<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> ChatView<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }
}

impl Widget for ChatView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(area);

        let transcript = &self.state.transcript;
        let pending = transcript.is_pending();
        let messages = transcript.messages();

        MessageArea::new(&messages, self.theme)
            .history(transcript.history_state())
            .pending(pending)
            .scroll(self.state.chat_scroll)
            .frame(self.state.frame)
            .render(chunks[0], buf);

        let placeholder = if pending {
            "Waiting for the advisor..."
        } else {
            "Ask about programs, fees or your fit  (/clear resets the conversation)"
        };
        InputWidget::new(&self.state.input, self.theme)
            .title(" Message ")
            .placeholder(placeholder)
            .focused(self.state.modal.is_none())
            .disabled(pending)
            .render(chunks[1], buf);
    }
}
