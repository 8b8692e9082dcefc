//! Split assistant replies into prose and table blocks
//!
//! Tables are rendered separately from the surrounding text so they can get
//! their own width handling.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Text(String),
    Table(String),
}

impl Block {
    pub fn content(&self) -> &str {
        match self {
            Block::Text(s) | Block::Table(s) => s,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }
}

/// `| --- | :---: |`, with or without the outer pipes
fn separator_row() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\|?\s*:?-{3,}:?\s*(\|\s*:?-{3,}:?\s*)*\|?\s*$").ok())
        .as_ref()
}

fn is_row(line: &str) -> bool {
    line.contains('|') && !line.trim().is_empty()
}

/// Header row followed by a separator row starts a table
fn starts_table(lines: &[&str], i: usize) -> bool {
    i + 1 < lines.len() && is_row(lines[i])
        && separator_row().is_some_and(|re| re.is_match(lines[i + 1]))
}

fn flush_text(text: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    let joined = text.join("\n");
    if !joined.trim().is_empty() {
        blocks.push(Block::Text(joined.trim_matches('\n').to_string()));
    }
    text.clear();
}

/// Alternating text and table blocks, in document order
pub fn split_blocks(markdown: &str) -> Vec<Block> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut blocks = Vec::new();
    let mut text: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        if starts_table(&lines, i) {
            flush_text(&mut text, &mut blocks);
            let start = i;
            i += 2;
            while i < lines.len() && is_row(lines[i]) {
                i += 1;
            }
            blocks.push(Block::Table(lines[start..i].join("\n")));
        } else {
            text.push(lines[i]);
            i += 1;
        }
    }
    flush_text(&mut text, &mut blocks);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_table_text() {
        let input = "Here are two options\nthat fit your profile:\n\
                     | Course | Fit |\n\
                     |---|---|\n\
                     | Data Science | High |\n\
                     Let me know which interests you.";
        let blocks = split_blocks(input);
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[0],
            Block::Text("Here are two options\nthat fit your profile:".to_string())
        );
        assert!(blocks[1].is_table());
        assert_eq!(blocks[1].content().lines().count(), 3);
        assert_eq!(blocks[2], Block::Text("Let me know which interests you.".to_string()));
    }

    #[test]
    fn test_pipe_without_separator_is_text() {
        let blocks = split_blocks("a | b\nc | d");
        assert_eq!(blocks, vec![Block::Text("a | b\nc | d".to_string())]);
    }

    #[test]
    fn test_alignment_separator_without_outer_pipes() {
        let blocks = split_blocks("Name | Rank\n:--- | ---:\nUM | 1");
        assert_eq!(blocks, vec![Block::Table("Name | Rank\n:--- | ---:\nUM | 1".to_string())]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_blocks("").is_empty());
        assert!(split_blocks("\n\n").is_empty());
    }
}
