//! Sidebar Widget - Route navigation and key hints

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::Route;
use crate::tui::theme::Theme;

/// Function key that opens each sidebar entry
pub fn route_key(route: Route) -> Option<&'static str> {
    match route {
        Route::Catalog => Some("F1"),
        Route::Chat => Some("F2"),
        Route::Profile => Some("F3"),
        Route::Settings => Some("F4"),
        Route::Login => None,
    }
}

pub struct Sidebar<'a> {
    current: Route,
    signed_in: bool,
    theme: &'a Theme,
}

impl<'a> Sidebar<'a> {
    pub fn new(current: Route, theme: &'a Theme) -> Self {
        Self {
            current,
            signed_in: false,
            theme,
        }
    }

    pub fn signed_in(mut self, signed_in: bool) -> Self {
        self.signed_in = signed_in;
        self
    }

    fn entry(&self, route: Route) -> Line<'static> {
        let active = route == self.current;
        let key = route_key(route).unwrap_or("");
        let label_style = if active {
            self.theme.selected()
        } else if self.signed_in {
            Style::default().fg(self.theme.text_secondary)
        } else {
            Style::default().fg(self.theme.text_muted)
        };
        let marker = if active { "▌" } else { " " };
        Line::from(vec![
            Span::styled(marker, Style::default().fg(self.theme.brand)),
            Span::styled(format!("{} {:<9}", route.icon(), route.title()), label_style),
            Span::styled(format!("{:>3}", key), Style::default().fg(self.theme.text_muted)),
        ])
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(self.theme.border))
            .style(Style::default().bg(self.theme.bg_sidebar));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![
            Line::from(Span::styled(
                " Navigate",
                Style::default()
                    .fg(self.theme.text_muted)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        lines.extend(Route::NAV.iter().map(|route| self.entry(*route)));

        lines.push(Line::from(""));
        let hint = |keys: &'static str, label: &'static str| {
            Line::from(vec![
                Span::styled(format!(" {:<7}", keys), Style::default().fg(self.theme.cyan)),
                Span::styled(label, Style::default().fg(self.theme.text_muted)),
            ])
        };
        if self.signed_in {
            lines.push(hint("Ctrl+L", "sign out"));
        }
        lines.push(hint("Ctrl+C", "quit"));

        Paragraph::new(lines).render(inner, buf);
    }
}
