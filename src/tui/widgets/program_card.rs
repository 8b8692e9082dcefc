//! Program Card Widget
//!
//! One search result: name, institution, field, duration, intakes and the
//! estimated cost, with the emoji of every saved list that holds it.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::catalog::cost::{estimated_cost, format_cost};
use crate::catalog::options::field_label;
use crate::models::Program;
use crate::tui::theme::Theme;

pub struct ProgramCard<'a> {
    program: &'a Program,
    /// Emoji of each list containing this program
    lists: Vec<String>,
    selected: bool,
    theme: &'a Theme,
}

impl<'a> ProgramCard<'a> {
    /// Rows taken by one card, borders included
    pub const HEIGHT: u16 = 6;

    pub fn new(program: &'a Program, theme: &'a Theme) -> Self {
        Self {
            program,
            lists: Vec::new(),
            selected: false,
            theme,
        }
    }

    pub fn lists(mut self, lists: Vec<String>) -> Self {
        self.lists = lists;
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    fn institution_line(&self) -> Line<'static> {
        let mut parts = vec![self.program.institution_name().to_string()];
        if let Some(inst) = &self.program.institution {
            if !inst.institution_country.is_empty() {
                parts.push(inst.institution_country.clone());
            }
            if !inst.institution_type.is_empty() {
                parts.push(inst.institution_type.clone());
            }
            if let Some(rank) = inst.world_rank {
                parts.push(format!("#{} world", rank));
            }
        }
        parts.retain(|p| !p.is_empty());
        Line::from(vec![
            Span::raw("🏛 "),
            Span::styled(
                parts.join(" · "),
                Style::default().fg(self.theme.text_secondary),
            ),
        ])
    }

    fn details_line(&self) -> Line<'static> {
        let muted = Style::default().fg(self.theme.text_muted);
        let value = Style::default().fg(self.theme.text_primary);
        let mut spans = Vec::new();
        if let Some(field) = &self.program.field_of_study {
            spans.push(Span::styled(field_label(field).to_string(), Style::default().fg(self.theme.cyan)));
            spans.push(Span::styled("  ", muted));
        }
        if let Some(years) = self.program.program_duration_years {
            spans.push(Span::styled("Duration ", muted));
            spans.push(Span::styled(format!("{} yrs", years), value));
            spans.push(Span::styled("  ", muted));
        }
        spans.push(Span::styled("Intakes ", muted));
        spans.push(Span::styled(self.program.intakes_label(), value));
        Line::from(spans)
    }

    fn cost_line(&self) -> Line<'static> {
        let cost = estimated_cost(self.program.fees.as_ref());
        let color = if cost.is_some() {
            self.theme.green
        } else {
            self.theme.text_muted
        };
        Line::from(vec![
            Span::styled("Est. cost ", Style::default().fg(self.theme.text_muted)),
            Span::styled(
                format_cost(cost),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ])
    }
}

impl Widget for ProgramCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.selected));
        if !self.lists.is_empty() {
            block = block.title_top(
                Line::from(format!(" {} ", self.lists.join(" "))).right_aligned(),
            );
        }
        let inner = block.inner(area);
        block.render(area, buf);

        let name_style = if self.selected {
            self.theme.selected()
        } else {
            Style::default()
                .fg(self.theme.text_primary)
                .add_modifier(Modifier::BOLD)
        };
        let name = if self.program.program_name.is_empty() {
            "Untitled program"
        } else {
            self.program.program_name.as_str()
        };

        let lines = vec![
            Line::from(Span::styled(name.to_string(), name_style)),
            self.institution_line(),
            self.details_line(),
            self.cost_line(),
        ];
        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fees, Institution};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn program() -> Program {
        Program {
            id: "p1".to_string(),
            program_name: "BSc Computer Science".to_string(),
            field_of_study: Some("computer_science".to_string()),
            program_duration_years: Some(3.0),
            fees: Some(Fees {
                registration_fee: Some(1000.0),
                tuition_fee: Some(9000.0),
                ..Fees::default()
            }),
            institution: Some(Institution {
                institution_name: "Sunway University".to_string(),
                institution_country: "Malaysia".to_string(),
                institution_type: "Private".to_string(),
                ..Institution::default()
            }),
            ..Program::default()
        }
    }

    #[test]
    fn test_card_shows_cost_and_default_intakes() {
        let backend = TestBackend::new(70, ProgramCard::HEIGHT);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::default();
        let program = program();

        terminal
            .draw(|f| f.render_widget(ProgramCard::new(&program, &theme), f.area()))
            .unwrap();

        let text = screen(&terminal);
        assert!(text.contains("BSc Computer Science"));
        assert!(text.contains("Sunway University"));
        assert!(text.contains("MYR 10,000"));
        assert!(text.contains("Jan, Sep"));
    }

    #[test]
    fn test_card_without_fees_reads_no_data() {
        let backend = TestBackend::new(70, ProgramCard::HEIGHT);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::default();
        let program = Program {
            fees: None,
            ..program()
        };

        terminal
            .draw(|f| f.render_widget(ProgramCard::new(&program, &theme), f.area()))
            .unwrap();

        assert!(screen(&terminal).contains("No Data"));
    }
}
