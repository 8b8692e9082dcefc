//! Header Widget
//!
//! Product name, current route and who is signed in

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::app::Route;
use crate::models::User;
use crate::tui::theme::Theme;

pub struct Header<'a> {
    route: Route,
    user: Option<&'a User>,
    theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(route: Route, theme: &'a Theme) -> Self {
        Self {
            route,
            user: None,
            theme,
        }
    }

    pub fn user(mut self, user: Option<&'a User>) -> Self {
        self.user = user;
        self
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        // Format: "🎓 Studywat  ›  Programs"
        let left = Line::from(vec![
            Span::styled("🎓 ", Style::default().fg(self.theme.brand)),
            Span::styled(
                "Studywat",
                Style::default()
                    .fg(self.theme.text_primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  ›  ", Style::default().fg(self.theme.text_muted)),
            Span::styled(self.route.title(), Style::default().fg(self.theme.cyan)),
        ]);
        Paragraph::new(left).render(area, buf);

        let who = match self.user {
            Some(user) => format!("{} <{}>", user.name, user.email),
            None => "Not signed in".to_string(),
        };
        let width = who.width() as u16;
        if width + 2 < area.width {
            let right = Rect {
                x: area.x + area.width - width - 1,
                width: width + 1,
                height: 1,
                ..area
            };
            Paragraph::new(Span::styled(who, Style::default().fg(self.theme.text_muted)))
                .render(right, buf);
        }
    }
}
