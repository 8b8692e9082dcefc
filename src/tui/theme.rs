//! Colors and styles for the terminal UI

use ratatui::style::{Color, Modifier, Style};

use crate::notify::ToastKind;

/// Theme colors for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg_main: Color,
    pub bg_dark: Color,
    pub bg_sidebar: Color,
    pub bg_code: Color,
    pub bg_selected: Color,

    // Border colors
    pub border: Color,
    pub border_focused: Color,

    // Text colors
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    // Accent colors
    pub brand: Color,
    pub cyan: Color,
    pub blue: Color,
    pub green: Color,
    pub yellow: Color,
    pub red: Color,

    // Message colors
    pub user_bubble: Color,
    pub advisor_bubble: Color,
    pub alert_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::studywat()
    }
}

impl Theme {
    /// Dark palette around the Studywat purple
    pub fn studywat() -> Self {
        Self {
            bg_main: Color::Rgb(30, 30, 46),
            bg_dark: Color::Rgb(24, 24, 37),
            bg_sidebar: Color::Rgb(36, 32, 52),
            bg_code: Color::Rgb(49, 50, 68),
            bg_selected: Color::Rgb(62, 52, 84),

            border: Color::Rgb(69, 71, 90),
            border_focused: Color::Rgb(187, 167, 190),

            text_primary: Color::Rgb(205, 214, 244),
            text_secondary: Color::Rgb(166, 173, 200),
            text_muted: Color::Rgb(108, 112, 134),

            brand: Color::Rgb(0x88, 0x64, 0x8d),
            cyan: Color::Rgb(148, 226, 213),
            blue: Color::Rgb(137, 180, 250),
            green: Color::Rgb(166, 227, 161),
            yellow: Color::Rgb(249, 226, 175),
            red: Color::Rgb(243, 139, 168),

            user_bubble: Color::Rgb(137, 180, 250),
            advisor_bubble: Color::Rgb(203, 166, 247),
            alert_fg: Color::Rgb(249, 226, 175),
        }
    }

    pub fn rgb((r, g, b): (u8, u8, u8)) -> Color {
        Color::Rgb(r, g, b)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        let color = if focused {
            self.border_focused
        } else {
            self.border
        };
        Style::default().fg(color)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.bg_selected)
            .fg(self.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn toast_color(&self, kind: ToastKind) -> Color {
        match kind {
            ToastKind::Success => self.green,
            ToastKind::Error => self.red,
            ToastKind::Info => self.blue,
        }
    }
}
