//! Line-oriented Markdown block parser
//!
//! Scans lines in order, keeping accumulators for the open paragraph, bullet
//! list, numbered list and fenced code block. Block order always matches
//! source order; malformed constructs degrade to paragraphs or code rather
//! than failing.

use super::inline::parse_inlines;
use super::table::{fit_row, is_header_candidate, parse_separator, split_row};
use super::types::{Block, ListItem, TableBlock};

const FENCE: &str = "```";

/// Parse Markdown text into blocks. Never fails.
pub fn parse(text: &str) -> Vec<Block> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();

    let mut state = ParseState::default();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if let Some(fence) = state.code.as_mut() {
            if is_fence(line) {
                state.flush_code();
            } else {
                fence.push(line);
            }
            i += 1;
            continue;
        }

        if is_fence(line) {
            state.flush_all();
            state.code = Some(CodeFence::open(line));
            i += 1;
            continue;
        }

        if line.trim().is_empty() {
            state.flush_paragraph();
            state.flush_lists();
            i += 1;
            continue;
        }

        if let Some((level, content)) = heading(line) {
            state.flush_all();
            state.blocks.push(Block::Heading {
                level,
                inlines: parse_inlines(content.trim_end()),
            });
            i += 1;
            continue;
        }

        if let Some((table, consumed)) = parse_table(&lines[i..]) {
            state.flush_all();
            state.blocks.push(Block::Table(table));
            i += consumed;
            continue;
        }

        if let Some(marker) = list_marker(line) {
            state.flush_paragraph();
            match marker.kind {
                ListKind::Bullet => {
                    state.flush_numbers();
                    state.bullets.push(PendingItem::new(&marker));
                }
                ListKind::Numbered => {
                    state.flush_bullets();
                    state.numbers.push(PendingItem::new(&marker));
                }
            }
            i += 1;
            continue;
        }

        // Indented text directly under a list item continues that item
        if leading_width(line) > 0 {
            if let Some(item) = state.open_item() {
                item.text.push(' ');
                item.text.push_str(line.trim());
                i += 1;
                continue;
            }
        }

        state.flush_lists();
        state.paragraph.push(line.trim_end().to_string());
        i += 1;
    }

    state.finish()
}

#[derive(Default)]
struct ParseState {
    blocks: Vec<Block>,
    paragraph: Vec<String>,
    bullets: Vec<PendingItem>,
    numbers: Vec<PendingItem>,
    code: Option<CodeFence>,
}

impl ParseState {
    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.paragraph).join("\n");
        self.blocks.push(Block::Paragraph {
            inlines: parse_inlines(&text),
        });
    }

    fn flush_bullets(&mut self) {
        if self.bullets.is_empty() {
            return;
        }
        let items = finish_items(std::mem::take(&mut self.bullets));
        self.blocks.push(Block::BulletList { items });
    }

    fn flush_numbers(&mut self) {
        if self.numbers.is_empty() {
            return;
        }
        let items = finish_items(std::mem::take(&mut self.numbers));
        self.blocks.push(Block::NumberedList { items });
    }

    fn flush_lists(&mut self) {
        self.flush_bullets();
        self.flush_numbers();
    }

    fn flush_code(&mut self) {
        if let Some(fence) = self.code.take() {
            self.blocks.push(fence.into_block());
        }
    }

    /// Flush everything in priority order: paragraph, bullets, numbers, code
    fn flush_all(&mut self) {
        self.flush_paragraph();
        self.flush_lists();
        self.flush_code();
    }

    /// The last item of whichever list is open
    fn open_item(&mut self) -> Option<&mut PendingItem> {
        if self.bullets.is_empty() {
            self.numbers.last_mut()
        } else {
            self.bullets.last_mut()
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_all();
        if self.blocks.is_empty() {
            self.blocks.push(Block::empty_paragraph());
        }
        self.blocks
    }
}

/// An open fenced code block
struct CodeFence {
    indent: String,
    language: Option<String>,
    lines: Vec<String>,
}

impl CodeFence {
    fn open(line: &str) -> Self {
        let trimmed = strip_indent(line);
        let indent = line[..line.len() - trimmed.len()].to_string();
        let tag = trimmed.trim_start_matches('`').trim().to_lowercase();
        Self {
            indent,
            language: (!tag.is_empty()).then_some(tag),
            lines: Vec::new(),
        }
    }

    /// Add a content line, stripping the fence's own indentation
    fn push(&mut self, line: &str) {
        let content = match line.strip_prefix(self.indent.as_str()) {
            Some(rest) => rest,
            None => {
                // Shallower than the fence: drop whatever indentation it has
                let ws = line.len() - strip_indent(line).len();
                &line[ws.min(self.indent.len())..]
            }
        };
        self.lines.push(content.to_string());
    }

    fn into_block(self) -> Block {
        let joined = self.lines.join("\n");
        let text = joined.strip_prefix('\n').unwrap_or(&joined);
        let text = text.strip_suffix('\n').unwrap_or(text);
        Block::CodeBlock {
            text: text.to_string(),
            language: self.language,
        }
    }
}

fn is_fence(line: &str) -> bool {
    strip_indent(line).starts_with(FENCE)
}

/// Drop leading spaces and tabs; other whitespace is content
fn strip_indent(line: &str) -> &str {
    line.trim_start_matches([' ', '\t'])
}

/// `#`..`######` followed by a single space
fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let content = line[hashes..].strip_prefix(' ')?;
    Some((hashes as u8, content))
}

/// Try to read a table at the start of `lines`; returns the table and the
/// number of lines it consumed.
fn parse_table(lines: &[&str]) -> Option<(TableBlock, usize)> {
    let header_line = *lines.first()?;
    if !is_header_candidate(header_line) {
        return None;
    }
    let alignments = parse_separator(lines.get(1)?)?;
    let columns = alignments.len();

    let cells = |line: &str| {
        fit_row(split_row(line), columns)
            .iter()
            .map(|cell| parse_inlines(cell))
            .collect::<Vec<_>>()
    };

    let header = cells(header_line);
    let mut rows = Vec::new();
    let mut consumed = 2;
    for line in &lines[2..] {
        if ends_table(line) {
            break;
        }
        rows.push(cells(line));
        consumed += 1;
    }

    Some((
        TableBlock {
            header,
            alignments,
            rows,
        },
        consumed,
    ))
}

fn ends_table(line: &str) -> bool {
    line.trim().is_empty()
        || !line.contains('|')
        || heading(line).is_some()
        || is_fence(line)
        || list_marker(line).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Numbered,
}

#[derive(Debug)]
struct ListMarker<'a> {
    kind: ListKind,
    indent_level: usize,
    content: &'a str,
}

/// Leading whitespace width: space = 1, tab = 4
fn leading_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Recognize `- item`, `* item`, `+ item`, `1. item` and `1) item`
fn list_marker(line: &str) -> Option<ListMarker<'_>> {
    let body = line.trim_start_matches([' ', '\t']);
    let indent_level = leading_width(line) / 2;

    let (kind, after_marker) = match body.as_bytes().first()? {
        b'-' | b'*' | b'+' => (ListKind::Bullet, &body[1..]),
        b'0'..=b'9' => {
            let digits = body.bytes().take_while(u8::is_ascii_digit).count();
            let rest = &body[digits..];
            let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
            (ListKind::Numbered, rest)
        }
        _ => return None,
    };

    if !after_marker.starts_with([' ', '\t']) {
        return None;
    }

    Some(ListMarker {
        kind,
        indent_level,
        content: after_marker.trim(),
    })
}

/// List item text collected before inline parsing
struct PendingItem {
    text: String,
    indent_level: usize,
}

impl PendingItem {
    fn new(marker: &ListMarker<'_>) -> Self {
        Self {
            text: marker.content.to_string(),
            indent_level: marker.indent_level,
        }
    }
}

fn finish_items(items: Vec<PendingItem>) -> Vec<ListItem> {
    items
        .into_iter()
        .map(|item| ListItem {
            inlines: parse_inlines(&item.text),
            indent_level: item.indent_level,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::types::{plain_text, InlineRun, TableAlign};

    #[test]
    fn test_heading_requires_space() {
        assert_eq!(heading("## Title"), Some((2, "Title")));
        assert_eq!(heading("#Title"), None);
        assert_eq!(heading("####### seven"), None);
        assert_eq!(heading("# "), Some((1, "")));
    }

    #[test]
    fn test_list_marker_shapes() {
        let m = list_marker("- item").unwrap();
        assert_eq!((m.kind, m.indent_level, m.content), (ListKind::Bullet, 0, "item"));

        let m = list_marker("    * deep").unwrap();
        assert_eq!((m.kind, m.indent_level), (ListKind::Bullet, 2));

        let m = list_marker("\t+ tabbed").unwrap();
        assert_eq!(m.indent_level, 2);

        let m = list_marker("12) twelve").unwrap();
        assert_eq!((m.kind, m.content), (ListKind::Numbered, "twelve"));

        assert!(list_marker("-no space").is_none());
        assert!(list_marker("---").is_none());
        assert!(list_marker("3.14 is pi").is_none());
        assert!(list_marker("*emphasis*").is_none());
    }

    #[test]
    fn test_leading_width_counts_tabs_as_four() {
        assert_eq!(leading_width("  x"), 2);
        assert_eq!(leading_width("\tx"), 4);
        assert_eq!(leading_width(" \t x"), 6);
    }

    #[test]
    fn test_fence_indent_is_stripped() {
        let blocks = parse("  ```py\n  if x:\n      y()\n  ```");
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                text: "if x:\n    y()".into(),
                language: Some("py".into()),
            }]
        );
    }

    #[test]
    fn test_fence_shallower_lines_lose_their_indent() {
        let blocks = parse("    ```\n  x\n      y\nz\n    ```");
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                text: "x\n  y\nz".into(),
                language: None,
            }]
        );
    }

    #[test]
    fn test_tab_indented_fence() {
        let blocks = parse("\t```rs\n\tfn a() {}\n\t\tb();\n\t```");
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                text: "fn a() {}\n\tb();".into(),
                language: Some("rs".into()),
            }]
        );
    }

    #[test]
    fn test_fence_keeps_unicode_whitespace() {
        let blocks = parse(" ```\n\u{a0}x\n ```");
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                text: "\u{a0}x".into(),
                language: None,
            }]
        );

        let blocks = parse("  ```py\n\u{3000}y = 1\n \u{3000}z\n  ```");
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                text: "\u{3000}y = 1\n\u{3000}z".into(),
                language: Some("py".into()),
            }]
        );
    }

    #[test]
    fn test_fence_language_is_lowercased() {
        let blocks = parse("``` JSON \n{}\n```");
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                text: "{}".into(),
                language: Some("json".into()),
            }]
        );
    }

    #[test]
    fn test_list_continuation_line() {
        let blocks = parse("- first line\n  continues here\n- second");
        let Block::BulletList { items } = &blocks[0] else {
            panic!("expected bullet list, got {:?}", blocks);
        };
        assert_eq!(items.len(), 2);
        assert_eq!(plain_text(&items[0].inlines), "first line continues here");
    }

    #[test]
    fn test_paragraph_after_list_keeps_order() {
        let blocks = parse("- a\nplain text");
        assert!(matches!(blocks[0], Block::BulletList { .. }));
        assert_eq!(
            blocks[1],
            Block::Paragraph {
                inlines: vec![InlineRun::plain("plain text")]
            }
        );
    }

    #[test]
    fn test_table_stops_at_line_without_pipe() {
        let (table, consumed) = parse_table(&["a | b", "--|--", "1 | 2", "after"]).unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(table.alignments, vec![TableAlign::Left, TableAlign::Left]);
        assert_eq!(table.rows.len(), 1);
    }
}
