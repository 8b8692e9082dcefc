//! Profile View
//!
//! Inferred traits on the left and suggested courses on the right. Each side
//! loads and fails on its own.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::api::profile::Recommendations;
use crate::app::AppState;
use crate::models::Trait;
use crate::profile::{format_trait, trait_style, FitTier, Section};
use crate::tui::theme::Theme;

pub struct ProfileView<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> ProfileView<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn status_line<T>(&self, section: &Section<T>, what: &str) -> Option<Line<'static>> {
        match section {
            Section::Loading => Some(Line::from(Span::styled(
                format!("Loading {}...", what),
                Style::default().fg(self.theme.text_muted),
            ))),
            Section::Failed(message) => Some(Line::from(Span::styled(
                format!("{}. Press R to retry.", message),
                Style::default().fg(self.theme.red),
            ))),
            Section::Loaded(_) => None,
        }
    }

    fn trait_lines(&self, traits: &[Trait]) -> Vec<Line<'static>> {
        if traits.is_empty() {
            return vec![Line::from(Span::styled(
                "Chat with the advisor and your traits will appear here.",
                Style::default().fg(self.theme.text_muted),
            ))];
        }
        let mut lines = Vec::new();
        for (i, item) in traits.iter().enumerate() {
            let selected = i == self.state.trait_cursor;
            let (icon, accent) = match trait_style(&item.trait_key) {
                Some(style) => (style.icon, Theme::rgb(style.color)),
                None => ("•", self.theme.text_secondary),
            };
            let heading_style = if selected {
                self.theme.selected()
            } else {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            };
            let mut heading = vec![
                Span::styled(if selected { "▶ " } else { "  " }, Style::default().fg(self.theme.brand)),
                Span::raw(format!("{} ", icon)),
                Span::styled(format_trait(&item.trait_key), heading_style),
            ];
            if let Some(confidence) = item.confidence {
                heading.push(Span::styled(
                    format!("  {:.0}%", confidence * 100.0),
                    Style::default().fg(self.theme.text_muted),
                ));
            }
            lines.push(Line::from(heading));
            lines.push(Line::from(Span::styled(
                format!("    {}", item.label),
                Style::default()
                    .fg(self.theme.text_primary)
                    .add_modifier(Modifier::BOLD),
            )));
            if !item.label_description.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("    {}", item.label_description),
                    Style::default().fg(self.theme.text_secondary),
                )));
            }
            lines.push(Line::from(""));
        }
        lines
    }

    fn suggestion_lines(&self, recs: &Recommendations) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if let Some(message) = &recs.message {
            lines.push(Line::from(Span::styled(
                message.clone(),
                Style::default()
                    .fg(self.theme.text_secondary)
                    .add_modifier(Modifier::ITALIC),
            )));
            lines.push(Line::from(""));
        }
        if recs.suggestions.is_empty() {
            lines.push(Line::from(Span::styled(
                "No course suggestions yet.",
                Style::default().fg(self.theme.text_muted),
            )));
        }
        for course in &recs.suggestions {
            let tier = FitTier::from_fit(course.fit);
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {} ", tier.label()),
                    Style::default()
                        .bg(Theme::rgb(tier.color()))
                        .fg(Theme::rgb(tier.text_color()))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(
                    course.name.clone(),
                    Style::default()
                        .fg(self.theme.text_primary)
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
            if !course.matched_traits.is_empty() {
                let matched: Vec<String> =
                    course.matched_traits.iter().map(|t| format_trait(t)).collect();
                lines.push(Line::from(Span::styled(
                    format!("  matches {}", matched.join(", ")),
                    Style::default().fg(self.theme.cyan),
                )));
            }
            if let Some(reason) = &course.reason {
                lines.push(Line::from(Span::styled(
                    format!("  {}", reason),
                    Style::default().fg(self.theme.text_secondary),
                )));
            }
            lines.push(Line::from(""));
        }
        lines
    }
}

impl Widget for ProfileView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let profile = &self.state.profile;

        let traits_block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true))
            .title(" Your traits ")
            .title_bottom(Line::from(Span::styled(
                " Enter ask the advisor  R reload ",
                Style::default().fg(self.theme.text_muted),
            )));
        let traits = match (&profile.traits, self.status_line(&profile.traits, "traits")) {
            (_, Some(line)) => vec![line],
            (Section::Loaded(traits), None) => self.trait_lines(traits),
            _ => Vec::new(),
        };
        // Keep the selected trait in view; each entry is up to four lines
        let inner_height = traits_block.inner(columns[0]).height;
        let cursor_line = (self.state.trait_cursor * 4) as u16;
        let scroll = (cursor_line + 4).saturating_sub(inner_height);
        Paragraph::new(traits)
            .block(traits_block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .render(columns[0], buf);

        let recs_block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false))
            .title(" Suggested courses ");
        let suggestions = match (
            &profile.recommendations,
            self.status_line(&profile.recommendations, "recommendations"),
        ) {
            (_, Some(line)) => vec![line],
            (Section::Loaded(recs), None) => self.suggestion_lines(recs),
            _ => Vec::new(),
        };
        Paragraph::new(suggestions)
            .block(recs_block)
            .wrap(Wrap { trim: false })
            .render(columns[1], buf);
    }
}
