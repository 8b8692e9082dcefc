//! Pagination Widget - `‹ 1 … 4 [5] 6 … 10 ›` under the results

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::catalog::{pagination_range, PageItem, PAGINATION_DELTA};
use crate::tui::theme::Theme;

pub struct PaginationBar<'a> {
    current: usize,
    total_pages: usize,
    total_items: usize,
    theme: &'a Theme,
}

impl<'a> PaginationBar<'a> {
    pub fn new(current: usize, total_pages: usize, theme: &'a Theme) -> Self {
        Self {
            current,
            total_pages,
            total_items: 0,
            theme,
        }
    }

    pub fn total_items(mut self, total: usize) -> Self {
        self.total_items = total;
        self
    }

    pub fn line(&self) -> Line<'static> {
        let muted = Style::default().fg(self.theme.text_muted);
        let arrow = |enabled: bool| {
            if enabled {
                Style::default().fg(self.theme.text_primary)
            } else {
                muted
            }
        };

        let mut spans = vec![Span::styled("‹ ", arrow(self.current > 1))];
        for item in pagination_range(self.current, self.total_pages, PAGINATION_DELTA) {
            let span = match item {
                PageItem::Page(n) if n == self.current => Span::styled(
                    format!("[{}]", n),
                    Style::default()
                        .fg(self.theme.brand)
                        .add_modifier(Modifier::BOLD),
                ),
                PageItem::Page(n) => {
                    Span::styled(n.to_string(), Style::default().fg(self.theme.text_secondary))
                }
                PageItem::Ellipsis => Span::styled("…", muted),
            };
            spans.push(span);
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled("›", arrow(self.current < self.total_pages)));
        spans.push(Span::styled(
            format!("   {} programs", self.total_items),
            muted,
        ));
        Line::from(spans)
    }
}

impl Widget for PaginationBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.line()).centered().render(area, buf);
    }
}
