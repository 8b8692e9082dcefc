//! Catalog View
//!
//! Program results with their filter summary and pagination on the left,
//! saved lists on the right.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::app::{AppState, CatalogPane};
use crate::catalog::cost::format_cost;
use crate::catalog::{FilterKind, Load};
use crate::lists::validation::emoji_or_default;
use crate::tui::theme::Theme;
use crate::tui::widgets::{ListRow, PaginationBar, ProgramCard};

const LISTS_WIDTH: u16 = 32;

pub struct CatalogView<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> CatalogView<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn summary(&self) -> Vec<Line<'static>> {
        let catalog = &self.state.catalog;
        let muted = Style::default().fg(self.theme.text_muted);

        let first = if let Some(list) = catalog.active_list() {
            Line::from(vec![
                Span::styled(
                    format!("{} {}", emoji_or_default(Some(&list.emoji)), list.title),
                    Style::default()
                        .fg(self.theme.brand)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("   x to return to search", muted),
            ])
        } else {
            let filters = catalog.filters();
            let mut spans = vec![Span::styled("Filters ", muted)];
            if filters.is_empty() {
                spans.push(Span::styled("none", muted));
            }
            for kind in FilterKind::ALL {
                let values = filters.get(kind);
                if values.is_empty() {
                    continue;
                }
                spans.push(Span::styled(
                    format!("{}: {}", kind.title(), values.join(", ")),
                    Style::default().fg(self.theme.cyan),
                ));
                spans.push(Span::raw("  "));
            }
            Line::from(spans)
        };

        let (min, max) = catalog.cost_range();
        let sort = catalog.sort().map(|s| s.label()).unwrap_or("Default");
        let second = Line::from(vec![
            Span::styled("Sort ", muted),
            Span::styled(sort.to_string(), Style::default().fg(self.theme.text_secondary)),
            Span::styled("   Per page ", muted),
            Span::styled(
                catalog.page_size().to_string(),
                Style::default().fg(self.theme.text_secondary),
            ),
            Span::styled("   Cost ", muted),
            Span::styled(
                format!(
                    "{} - {}",
                    format_cost(Some(min as f64)),
                    format_cost(Some(max as f64))
                ),
                Style::default().fg(self.theme.text_secondary),
            ),
        ]);
        vec![first, second]
    }

    fn render_results(&self, area: Rect, buf: &mut Buffer) {
        let catalog = &self.state.catalog;
        let programs = catalog.visible();

        let message = match catalog.load() {
            Load::Loading if programs.is_empty() => {
                Some(("Loading programs...".to_string(), self.theme.text_muted))
            }
            Load::Failed(error) => Some((error.clone(), self.theme.red)),
            _ if programs.is_empty() => {
                let text = if catalog.active_list().is_some() {
                    "This list is empty. Press a on a program to add it."
                } else {
                    "No programs match these filters."
                };
                Some((text.to_string(), self.theme.text_muted))
            }
            _ => None,
        };
        if let Some((text, color)) = message {
            Paragraph::new(Span::styled(text, Style::default().fg(color)))
                .wrap(Wrap { trim: true })
                .render(area, buf);
            return;
        }

        let per_screen = (area.height / ProgramCard::HEIGHT).max(1) as usize;
        let cursor = self.state.program_cursor;
        let first = cursor.saturating_sub(per_screen - 1);
        let focused = self.state.catalog_pane == CatalogPane::Programs;

        for (row, (index, program)) in programs
            .iter()
            .enumerate()
            .skip(first)
            .take(per_screen)
            .enumerate()
        {
            let card_area = Rect {
                y: area.y + row as u16 * ProgramCard::HEIGHT,
                height: ProgramCard::HEIGHT,
                ..area
            };
            if card_area.bottom() > area.bottom() {
                break;
            }
            let lists = self
                .state
                .lists
                .lists()
                .iter()
                .filter(|l| l.contains(&program.id))
                .map(|l| emoji_or_default(Some(&l.emoji)))
                .collect();
            ProgramCard::new(program, self.theme)
                .lists(lists)
                .selected(focused && index == cursor)
                .render(card_area, buf);
        }
    }

    fn render_lists(&self, area: Rect, buf: &mut Buffer) {
        let focused = self.state.catalog_pane == CatalogPane::Lists;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(focused))
            .title(" Saved lists ")
            .title_bottom(Line::from(Span::styled(
                " n new  e edit  d delete ",
                Style::default().fg(self.theme.text_muted),
            )));
        let inner = block.inner(area);
        block.render(area, buf);

        let lists = self.state.lists.lists();
        let status = match self.state.lists.load() {
            Load::Loading if lists.is_empty() => Some(("Loading lists...", self.theme.text_muted)),
            Load::Failed(_) if lists.is_empty() => {
                Some(("Could not load your lists", self.theme.red))
            }
            _ if lists.is_empty() => Some(("No lists yet. Press n to create one.", self.theme.text_muted)),
            _ => None,
        };
        if let Some((text, color)) = status {
            Paragraph::new(Span::styled(text, Style::default().fg(color)))
                .wrap(Wrap { trim: true })
                .render(inner, buf);
            return;
        }

        let active_id = self.state.catalog.active_list().map(|l| l.id.as_str());
        let visible = inner.height as usize;
        let first = self.state.list_cursor.saturating_sub(visible.saturating_sub(1));
        for (row, (index, list)) in lists.iter().enumerate().skip(first).take(visible).enumerate() {
            let row_area = Rect {
                y: inner.y + row as u16,
                height: 1,
                ..inner
            };
            ListRow::new(list, self.theme)
                .selected(focused && index == self.state.list_cursor)
                .active(active_id == Some(list.id.as_str()))
                .updating(self.state.lists.is_updating(&list.id))
                .render(row_area, buf);
        }
    }
}

impl Widget for CatalogView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(LISTS_WIDTH)])
            .split(area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(ProgramCard::HEIGHT),
                Constraint::Length(1),
            ])
            .split(columns[0]);

        Paragraph::new(self.summary()).render(rows[0], buf);
        self.render_results(rows[1], buf);
        PaginationBar::new(
            self.state.catalog.page(),
            self.state.catalog.total_pages(),
            self.theme,
        )
        .total_items(self.state.catalog.total())
        .render(rows[2], buf);

        self.render_lists(columns[1], buf);
    }
}
