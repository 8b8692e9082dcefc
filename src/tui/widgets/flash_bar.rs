//! Flash Bar Widget
//!
//! A single line under the current view: the newest toast, a pulse while
//! something is loading, or a muted dot when idle.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::notify::{Toast, ToastKind};
use crate::tui::theme::Theme;

const DOT_SMALL: char = '·';
const DOT_LARGE: char = '●';

/// Dots either side of the centre at full pulse
const MAX_SPREAD: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlashBarState {
    #[default]
    Idle,
    Working,
}

pub struct FlashBar<'a> {
    toast: Option<&'a Toast>,
    state: FlashBarState,
    frame: u8,
    theme: &'a Theme,
}

impl<'a> FlashBar<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            toast: None,
            state: FlashBarState::Idle,
            frame: 0,
            theme,
        }
    }

    pub fn toast(mut self, toast: Option<&'a Toast>) -> Self {
        self.toast = toast;
        self
    }

    pub fn state(mut self, state: FlashBarState) -> Self {
        self.state = state;
        self
    }

    pub fn frame(mut self, frame: u8) -> Self {
        self.frame = frame;
        self
    }

    fn icon(kind: ToastKind) -> &'static str {
        match kind {
            ToastKind::Success => "✓",
            ToastKind::Error => "✗",
            ToastKind::Info => "ℹ",
        }
    }

    /// Triangle wave 0..=MAX_SPREAD..=0
    fn spread(&self) -> u8 {
        let period = MAX_SPREAD * 2;
        let phase = (self.frame / 2) % period;
        if phase <= MAX_SPREAD {
            phase
        } else {
            period - phase
        }
    }
}

impl Widget for FlashBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let base = Style::default().bg(self.theme.bg_dark);
        buf.set_style(area, base);

        if let Some(toast) = self.toast {
            let color = self.theme.toast_color(toast.kind);
            let line = Line::from(vec![
                Span::styled(format!(" {} ", Self::icon(toast.kind)), base.fg(color)),
                Span::styled(toast.message.as_str(), base.fg(self.theme.text_primary)),
            ]);
            Paragraph::new(line).render(area, buf);
            return;
        }

        let center = area.left() + area.width / 2;
        let y = area.top();
        match self.state {
            FlashBarState::Idle => {
                buf[(center, y)]
                    .set_char(DOT_SMALL)
                    .set_style(base.fg(self.theme.text_muted));
            }
            FlashBarState::Working => {
                let spread = u16::from(self.spread());
                for offset in 0..=spread {
                    let ch = if offset == 0 { DOT_LARGE } else { DOT_SMALL };
                    let style = base.fg(self.theme.cyan);
                    if center + offset < area.right() {
                        buf[(center + offset, y)].set_char(ch).set_style(style);
                    }
                    if center >= area.left() + offset {
                        buf[(center - offset, y)].set_char(ch).set_style(style);
                    }
                }
            }
        }
    }
}
