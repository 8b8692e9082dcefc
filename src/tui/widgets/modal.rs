//! Modal Widgets
//!
//! A centered frame plus the dialogs drawn in it: help, filter picker,
//! list create/edit form, delete confirmation and the list-membership picker.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::app::state::{FilterOptions, FilterPicker, MembershipPicker};
use crate::app::{DialogField, ListDialog};
use crate::catalog::{FilterKind, Filters};
use crate::lists::validation::{emoji_or_default, is_submittable, MAX_TITLE_LEN};
use crate::lists::ListCollection;
use crate::tui::theme::Theme;

/// Centered rectangle of the given size percentages, clamped to `area`
pub fn centered_rect(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let scale = |len: u16, percent: u16| (u32::from(len) * u32::from(percent) / 100) as u16;
    let width = scale(area.width, width_percent).max(20).min(area.width);
    let height = scale(area.height, height_percent).max(5).min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Bordered frame that clears what is behind it
pub struct Modal<'a> {
    title: &'a str,
    content: Vec<Line<'a>>,
    footer: Option<&'a str>,
    theme: &'a Theme,
    width_percent: u16,
    height_percent: u16,
}

impl<'a> Modal<'a> {
    pub fn new(title: &'a str, theme: &'a Theme) -> Self {
        Self {
            title,
            content: Vec::new(),
            footer: None,
            theme,
            width_percent: 60,
            height_percent: 60,
        }
    }

    pub fn content(mut self, content: Vec<Line<'a>>) -> Self {
        self.content = content;
        self
    }

    /// Key hints along the bottom border
    pub fn footer(mut self, footer: &'a str) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn size(mut self, width_percent: u16, height_percent: u16) -> Self {
        self.width_percent = width_percent;
        self.height_percent = height_percent;
        self
    }
}

impl Widget for Modal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let modal_area = centered_rect(area, self.width_percent, self.height_percent);
        Clear.render(modal_area, buf);

        let mut block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused))
            .style(Style::default().bg(self.theme.bg_dark));
        if let Some(footer) = self.footer {
            block = block.title_bottom(Line::from(Span::styled(
                format!(" {} ", footer),
                Style::default().fg(self.theme.text_muted),
            )));
        }

        let inner = block.inner(modal_area);
        block.render(modal_area, buf);

        Paragraph::new(self.content)
            .style(Style::default().fg(self.theme.text_primary))
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

fn picker_line(theme: &Theme, cursor: bool, checked: bool, label: String) -> Line<'static> {
    let prefix = if cursor { "▶ " } else { "  " };
    let mark = if checked { "[x] " } else { "[ ] " };
    let style = if cursor {
        Style::default().fg(theme.cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_primary)
    };
    Line::from(vec![
        Span::styled(prefix, style),
        Span::styled(mark, Style::default().fg(theme.brand)),
        Span::styled(label, style),
    ])
}

/// Show at most `rows` entries, keeping `cursor` in view
fn window(len: usize, cursor: usize, rows: usize) -> std::ops::Range<usize> {
    if len <= rows || rows == 0 {
        return 0..len;
    }
    let start = cursor.saturating_sub(rows - 1).min(len - rows);
    start..start + rows
}

/// Help modal showing keyboard shortcuts
pub struct HelpModal<'a> {
    theme: &'a Theme,
}

impl<'a> HelpModal<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    fn shortcuts() -> &'static [(&'static str, &'static str)] {
        &[
            ("F1-F4", "Programs / Advisor / Profile / Settings"),
            ("Ctrl+L", "Sign out"),
            ("Ctrl+C / Ctrl+Q", "Quit"),
            ("Esc", "Close dialog / go back"),
            ("Tab", "Switch pane or field"),
            ("↑ ↓ / j k", "Move selection"),
            ("Enter", "Open list / add to list / send"),
            ("f", "Filters (←→ group, Space toggle)"),
            ("r", "Reset filters"),
            ("[ ]", "Previous / next page"),
            ("+", "Cycle page size"),
            ("s", "Cycle sort order"),
            ("< > , .", "Adjust cost range"),
            ("y", "Show shareable link"),
            ("n e d", "New / edit / delete list"),
            ("a", "Add selected program to lists"),
            ("x", "Leave the open list"),
            ("/clear", "Clear the advisor conversation"),
            ("R", "Reload profile"),
        ]
    }
}

impl Widget for HelpModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content: Vec<Line> = Self::shortcuts()
            .iter()
            .map(|(key, desc)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:18}", key),
                        Style::default()
                            .fg(self.theme.cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(*desc, Style::default().fg(self.theme.text_primary)),
                ])
            })
            .collect();

        Modal::new("Help - Keyboard Shortcuts", self.theme)
            .content(content)
            .footer("Esc close")
            .size(60, 80)
            .render(area, buf);
    }
}

/// Multi-select picker for one filter group at a time
pub struct FilterModal<'a> {
    picker: &'a FilterPicker,
    options: &'a FilterOptions,
    filters: &'a Filters,
    theme: &'a Theme,
}

impl<'a> FilterModal<'a> {
    pub fn new(
        picker: &'a FilterPicker,
        options: &'a FilterOptions,
        filters: &'a Filters,
        theme: &'a Theme,
    ) -> Self {
        Self {
            picker,
            options,
            filters,
            theme,
        }
    }

    fn tabs(&self) -> Line<'static> {
        let current = self.picker.kind();
        let mut spans = Vec::new();
        for kind in FilterKind::ALL {
            let count = self.filters.get(kind).len();
            let label = if count > 0 {
                format!(" {} ({}) ", kind.title(), count)
            } else {
                format!(" {} ", kind.title())
            };
            let style = if kind == current {
                self.theme.selected()
            } else {
                Style::default().fg(self.theme.text_secondary)
            };
            spans.push(Span::styled(label, style));
        }
        Line::from(spans)
    }
}

impl Widget for FilterModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let kind = self.picker.kind();
        let options = self.options.options(kind);
        let selected = self.filters.get(kind);

        let mut content = vec![self.tabs(), Line::from("")];
        if options.is_empty() {
            let text = if self.options.loaded {
                "No options available"
            } else {
                "Loading options..."
            };
            content.push(Line::from(Span::styled(
                text,
                Style::default().fg(self.theme.text_muted),
            )));
        } else {
            let modal_rows = centered_rect(area, 70, 70).height.saturating_sub(4) as usize;
            for i in window(options.len(), self.picker.cursor, modal_rows) {
                let (label, value) = &options[i];
                content.push(picker_line(
                    self.theme,
                    i == self.picker.cursor,
                    selected.contains(value),
                    label.clone(),
                ));
            }
        }

        Modal::new("Filters", self.theme)
            .content(content)
            .footer("←→ group  ↑↓ move  Space toggle  Esc done")
            .size(70, 70)
            .render(area, buf);
    }
}

/// Create / rename form for a saved list
pub struct ListDialogModal<'a> {
    dialog: &'a ListDialog,
    theme: &'a Theme,
}

impl<'a> ListDialogModal<'a> {
    pub fn new(dialog: &'a ListDialog, theme: &'a Theme) -> Self {
        Self { dialog, theme }
    }

    fn field(&self, label: &str, value: &str, field: DialogField) -> Line<'static> {
        let focused = self.dialog.field == field;
        let label_style = if focused {
            Style::default().fg(self.theme.cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.text_secondary)
        };
        let mut spans = vec![
            Span::styled(format!("{:<7}", label), label_style),
            Span::styled(value.to_string(), Style::default().fg(self.theme.text_primary)),
        ];
        if focused {
            spans.push(Span::styled(" ", Style::default().bg(self.theme.text_primary)));
        }
        Line::from(spans)
    }
}

impl Widget for ListDialogModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.dialog.editing.is_some() {
            "Edit list"
        } else {
            "New list"
        };
        let mut content = vec![
            self.field("Name", &self.dialog.title, DialogField::Title),
            Line::from(Span::styled(
                format!("       {}/{}", self.dialog.title.chars().count(), MAX_TITLE_LEN),
                Style::default().fg(self.theme.text_muted),
            )),
            self.field("Emoji", &self.dialog.emoji, DialogField::Emoji),
            Line::from(vec![
                Span::styled("       preview ", Style::default().fg(self.theme.text_muted)),
                Span::raw(self.dialog.emoji_preview().to_string()),
            ]),
            Line::from(""),
        ];

        if let Some(error) = &self.dialog.error {
            content.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(self.theme.red),
            )));
        } else if self.dialog.saving {
            content.push(Line::from(Span::styled(
                "Saving...",
                Style::default().fg(self.theme.text_muted),
            )));
        } else {
            let (text, color) = if is_submittable(&self.dialog.title) {
                ("Enter to save", self.theme.green)
            } else {
                ("A name is required", self.theme.text_muted)
            };
            content.push(Line::from(Span::styled(text, Style::default().fg(color))));
        }

        Modal::new(title, self.theme)
            .content(content)
            .footer("Tab switch field  Enter save  Esc cancel")
            .size(50, 40)
            .render(area, buf);
    }
}

/// Are-you-sure step before a list is deleted
pub struct ConfirmModal<'a> {
    message: String,
    theme: &'a Theme,
}

impl<'a> ConfirmModal<'a> {
    pub fn delete_list(title: &str, emoji: &str, theme: &'a Theme) -> Self {
        Self {
            message: format!(
                "Delete {} \"{}\"? This cannot be undone.",
                emoji_or_default(Some(emoji)),
                title
            ),
            theme,
        }
    }
}

impl Widget for ConfirmModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content = vec![
            Line::from(Span::styled(
                self.message,
                Style::default().fg(self.theme.text_primary),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("y", Style::default().fg(self.theme.red).add_modifier(Modifier::BOLD)),
                Span::styled(" delete   ", Style::default().fg(self.theme.text_secondary)),
                Span::styled("n", Style::default().fg(self.theme.cyan).add_modifier(Modifier::BOLD)),
                Span::styled(" keep", Style::default().fg(self.theme.text_secondary)),
            ]),
        ];
        Modal::new("Delete list", self.theme)
            .content(content)
            .size(50, 30)
            .render(area, buf);
    }
}

/// Every saved list with a check mark where the program is already a member
pub struct MembershipModal<'a> {
    picker: &'a MembershipPicker,
    lists: &'a ListCollection,
    theme: &'a Theme,
}

impl<'a> MembershipModal<'a> {
    pub fn new(picker: &'a MembershipPicker, lists: &'a ListCollection, theme: &'a Theme) -> Self {
        Self {
            picker,
            lists,
            theme,
        }
    }
}

impl Widget for MembershipModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut content = vec![
            Line::from(Span::styled(
                self.picker.program_name.clone(),
                Style::default()
                    .fg(self.theme.text_secondary)
                    .add_modifier(Modifier::ITALIC),
            )),
            Line::from(""),
        ];

        let lists = self.lists.lists();
        if lists.is_empty() {
            content.push(Line::from(Span::styled(
                "No lists yet. Press n in the catalog to create one.",
                Style::default().fg(self.theme.text_muted),
            )));
        }
        for (i, list) in lists.iter().enumerate() {
            let mut line = picker_line(
                self.theme,
                i == self.picker.cursor,
                list.contains(&self.picker.program_id),
                format!("{} {}", emoji_or_default(Some(&list.emoji)), list.title),
            );
            if self.lists.is_updating(&list.id) {
                line.spans.push(Span::styled(" ⟳", Style::default().fg(self.theme.yellow)));
            }
            content.push(line);
        }

        Modal::new("Add to list", self.theme)
            .content(content)
            .footer("↑↓ move  Space/Enter toggle  Esc done")
            .size(50, 50)
            .render(area, buf);
    }
}
