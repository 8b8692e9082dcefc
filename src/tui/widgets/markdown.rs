//! Markdown rendering for advisor replies
//!
//! Prose goes through pulldown-cmark. Tables are cut out first and laid out
//! as fixed-width grids whose cells are truncated instead of wrapped.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::chat::{split_blocks, Block};
use crate::tui::theme::Theme;

/// Hard-wrap styled lines at `max_width` display columns
fn wrap_lines(lines: Vec<Line<'static>>, max_width: usize) -> Vec<Line<'static>> {
    if max_width == 0 {
        return lines;
    }

    let mut wrapped: Vec<Line<'static>> = Vec::new();

    for line in lines {
        if line.spans.is_empty() {
            wrapped.push(Line::from(""));
            continue;
        }

        let mut current_spans: Vec<Span<'static>> = Vec::new();
        let mut current_width = 0usize;

        for span in line.spans {
            let style = span.style;
            let mut chunk = String::new();
            for ch in span.content.chars() {
                let w = ch.width().unwrap_or(0);
                if current_width + w > max_width && current_width > 0 {
                    if !chunk.is_empty() {
                        current_spans.push(Span::styled(std::mem::take(&mut chunk), style));
                    }
                    wrapped.push(Line::from(std::mem::take(&mut current_spans)));
                    current_width = 0;
                }
                chunk.push(ch);
                current_width += w;
            }
            if !chunk.is_empty() {
                current_spans.push(Span::styled(chunk, style));
            }
        }

        wrapped.push(Line::from(current_spans));
    }

    wrapped
}

fn flush(lines: &mut Vec<Line<'static>>, spans: &mut Vec<Span<'static>>) {
    if !spans.is_empty() {
        lines.push(Line::from(std::mem::take(spans)));
    }
}

/// Render markdown prose to styled lines
///
/// Handles emphasis, inline and fenced code, headings, block quotes, ordered
/// and bullet lists, and links (shown underlined).
pub fn render_markdown(text: &str, theme: &Theme, max_width: usize) -> Vec<Line<'static>> {
    let parser = Parser::new(text);
    let mut lines = Vec::new();
    let mut current_spans: Vec<Span<'static>> = Vec::new();
    let mut style_stack: Vec<Style> = vec![Style::default().fg(theme.text_primary)];
    let mut in_code_block = false;
    // Next number per open list; None for bullets
    let mut list_stack: Vec<Option<u64>> = Vec::new();
    let mut quote_depth = 0usize;

    for event in parser {
        match event {
            Event::Text(text) => {
                let style = style_stack.last().copied().unwrap_or_default();
                if in_code_block {
                    for line in text.lines() {
                        lines.push(Line::from(vec![
                            Span::raw("  "),
                            Span::styled(
                                line.to_string(),
                                Style::default().fg(theme.text_primary).bg(theme.bg_code),
                            ),
                        ]));
                    }
                } else {
                    if current_spans.is_empty() && quote_depth > 0 {
                        current_spans.push(Span::styled(
                            "▎ ".repeat(quote_depth),
                            Style::default().fg(theme.text_muted),
                        ));
                    }
                    current_spans.push(Span::styled(text.to_string(), style));
                }
            }
            Event::Code(code) => {
                current_spans.push(Span::styled(
                    format!("`{}`", code),
                    Style::default().fg(theme.cyan).bg(theme.bg_code),
                ));
            }
            Event::Start(Tag::Strong) => {
                let current_style = style_stack.last().copied().unwrap_or_default();
                style_stack.push(current_style.add_modifier(Modifier::BOLD));
            }
            Event::Start(Tag::Emphasis) => {
                let current_style = style_stack.last().copied().unwrap_or_default();
                style_stack.push(current_style.add_modifier(Modifier::ITALIC));
            }
            Event::End(TagEnd::Strong) | Event::End(TagEnd::Emphasis) | Event::End(TagEnd::Link) => {
                style_stack.pop();
            }
            Event::Start(Tag::CodeBlock(_)) => {
                flush(&mut lines, &mut current_spans);
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                lines.push(Line::from(""));
            }
            Event::Start(Tag::List(start)) => {
                flush(&mut lines, &mut current_spans);
                list_stack.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                flush(&mut lines, &mut current_spans);
                list_stack.pop();
                if list_stack.is_empty() {
                    lines.push(Line::from(""));
                }
            }
            Event::Start(Tag::Item) => {
                flush(&mut lines, &mut current_spans);
                let indent = "  ".repeat(list_stack.len().saturating_sub(1));
                let marker = match list_stack.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}{}. ", indent, n);
                        *n += 1;
                        marker
                    }
                    _ => format!("{}• ", indent),
                };
                current_spans.push(Span::styled(marker, Style::default().fg(theme.cyan)));
            }
            Event::End(TagEnd::Item) => {
                flush(&mut lines, &mut current_spans);
            }
            Event::Start(Tag::Link { .. }) => {
                let current_style = style_stack.last().copied().unwrap_or_default();
                style_stack.push(
                    current_style
                        .fg(theme.cyan)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            Event::Start(Tag::Heading { .. }) => {
                flush(&mut lines, &mut current_spans);
                let current_style = style_stack.last().copied().unwrap_or_default();
                style_stack.push(current_style.fg(theme.cyan).add_modifier(Modifier::BOLD));
            }
            Event::End(TagEnd::Heading { .. }) => {
                style_stack.pop();
                flush(&mut lines, &mut current_spans);
                lines.push(Line::from(""));
            }
            Event::Start(Tag::BlockQuote) => {
                flush(&mut lines, &mut current_spans);
                quote_depth += 1;
                let current_style = style_stack.last().copied().unwrap_or_default();
                style_stack.push(current_style.fg(theme.text_secondary).add_modifier(Modifier::ITALIC));
            }
            Event::End(TagEnd::BlockQuote) => {
                quote_depth = quote_depth.saturating_sub(1);
                style_stack.pop();
            }
            Event::SoftBreak => {
                current_spans.push(Span::raw(" "));
            }
            Event::HardBreak => {
                flush(&mut lines, &mut current_spans);
            }
            Event::End(TagEnd::Paragraph) => {
                flush(&mut lines, &mut current_spans);
                if list_stack.is_empty() {
                    lines.push(Line::from(""));
                }
            }
            Event::Rule => {
                flush(&mut lines, &mut current_spans);
                lines.push(Line::from(Span::styled(
                    "─".repeat(max_width.clamp(3, 40)),
                    Style::default().fg(theme.border),
                )));
            }
            Event::InlineHtml(html) => {
                let style = style_stack.last().copied().unwrap_or_default();
                current_spans.push(Span::styled(html.to_string(), style));
            }
            Event::Html(html) => {
                let style = style_stack.last().copied().unwrap_or_default();
                for line in html.lines() {
                    lines.push(Line::from(Span::styled(line.to_string(), style)));
                }
            }
            _ => {}
        }
    }

    flush(&mut lines, &mut current_spans);

    while lines.last().is_some_and(|l| l.spans.is_empty()) {
        lines.pop();
    }

    wrap_lines(lines, max_width)
}

/// Cells of one `| a | b |` row, outer pipes optional
fn table_cells(row: &str) -> Vec<String> {
    let trimmed = row.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    trimmed.split('|').map(|c| c.trim().replace("**", "")).collect()
}

/// Cut to `width` columns, marking the cut with `…`
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        let pad = width - text.width();
        return format!("{}{}", text, " ".repeat(pad));
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// Column widths that fit `max_width`, shrinking the widest column first
fn column_widths(rows: &[Vec<String>], max_width: usize) -> Vec<usize> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|r| r.get(c))
                .map(|cell| cell.width())
                .max()
                .unwrap_or(0)
                .max(1)
        })
        .collect();

    // Separators: "│ " before each column and " │" at the end
    let chrome = columns * 3 + 1;
    let budget = max_width.saturating_sub(chrome);
    while widths.iter().sum::<usize>() > budget {
        let Some((idx, widest)) = widths.iter().copied().enumerate().max_by_key(|(_, w)| *w) else {
            break;
        };
        if widest <= 3 {
            break;
        }
        widths[idx] = widest - 1;
    }
    widths
}

/// Render a markdown table block as a boxed grid
pub fn render_table(table: &str, theme: &Theme, max_width: usize) -> Vec<Line<'static>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (i, row) in table.lines().enumerate() {
        // The second line is the `---` separator
        if i == 1 {
            continue;
        }
        rows.push(table_cells(row));
    }
    if rows.is_empty() {
        return Vec::new();
    }

    let widths = column_widths(&rows, max_width);
    let border = Style::default().fg(theme.border);
    let rule = |left: &str, mid: &str, right: &str| {
        let body: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        Line::from(Span::styled(
            format!("{}{}{}", left, body.join(mid), right),
            border,
        ))
    };

    let mut lines = vec![rule("┌", "┬", "┐")];
    for (i, row) in rows.iter().enumerate() {
        let cell_style = if i == 0 {
            Style::default()
                .fg(theme.cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_primary)
        };
        let mut spans = Vec::with_capacity(widths.len() * 2 + 1);
        for (c, width) in widths.iter().enumerate() {
            spans.push(Span::styled("│ ", border));
            let cell = row.get(c).map(String::as_str).unwrap_or("");
            spans.push(Span::styled(format!("{} ", fit(cell, *width)), cell_style));
        }
        spans.push(Span::styled("│", border));
        lines.push(Line::from(spans));
        if i == 0 {
            lines.push(rule("├", "┼", "┤"));
        }
    }
    lines.push(rule("└", "┴", "┘"));
    lines
}

/// Render a full reply: prose blocks wrap, table blocks truncate
pub fn render_reply(text: &str, theme: &Theme, max_width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for block in split_blocks(text) {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        match block {
            Block::Text(prose) => lines.extend(render_markdown(&prose, theme, max_width)),
            Block::Table(table) => lines.extend(render_table(&table, theme, max_width)),
        }
    }
    lines
}
