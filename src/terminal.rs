//! ANSI terminal rendering of parsed transcripts
//!
//! Uses 24-bit color escapes. With color disabled the same layout is produced
//! as plain text.

use std::fmt::Write;

use crate::highlight::ColoredSegment;
use crate::markdown::{plain_text, Block, InlineRun, InlineStyle, ListItem, TableAlign, TableBlock};
use crate::theme::{Color, Theme};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const ITALIC: &str = "\x1b[3m";
const UNDERLINE: &str = "\x1b[4m";

fn fg(color: Color) -> String {
    format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
}

fn bg(color: Color) -> String {
    format!("\x1b[48;2;{};{};{}m", color.r, color.g, color.b)
}

/// Renders blocks for a terminal using one resolved theme
pub struct TerminalRenderer<'a> {
    theme: &'a Theme,
    color: bool,
}

impl<'a> TerminalRenderer<'a> {
    pub fn new(theme: &'a Theme, color: bool) -> Self {
        Self { theme, color }
    }

    /// Render a document.
    ///
    /// `code` holds the segments for each code block in document order; a
    /// code block without an entry is printed uncolored.
    pub fn render(&self, blocks: &[Block], code: &[Vec<ColoredSegment>]) -> String {
        let mut out = String::new();
        let mut code_blocks = code.iter();

        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            match block {
                Block::Heading { level, inlines } => self.heading(&mut out, *level, inlines),
                Block::Paragraph { inlines } => {
                    self.inlines(&mut out, inlines, InlineStyle::NONE);
                    out.push('\n');
                }
                Block::CodeBlock { text, language } => {
                    self.code_block(&mut out, text, language.as_deref(), code_blocks.next())
                }
                Block::BulletList { items } => self.list(&mut out, items, false),
                Block::NumberedList { items } => self.list(&mut out, items, true),
                Block::Table(table) => self.table(&mut out, table),
            }
        }

        out
    }

    fn paint(&self, out: &mut String, text: &str, codes: &[&str]) {
        if !self.color || codes.is_empty() {
            out.push_str(text);
            return;
        }
        for code in codes {
            out.push_str(code);
        }
        out.push_str(text);
        out.push_str(RESET);
    }

    fn heading(&self, out: &mut String, level: u8, inlines: &[InlineRun]) {
        let marker = "#".repeat(level as usize);
        let color = fg(self.theme.ui.heading);
        self.paint(out, &format!("{} ", marker), &[BOLD, color.as_str()]);
        self.inlines(out, inlines, InlineStyle::BOLD);
        out.push('\n');
    }

    fn inlines(&self, out: &mut String, runs: &[InlineRun], base: InlineStyle) {
        for run in runs {
            let style = run.style | base;
            let mut codes: Vec<String> = Vec::new();
            if style.contains(InlineStyle::BOLD) {
                codes.push(BOLD.to_string());
            }
            if style.contains(InlineStyle::ITALIC) {
                codes.push(ITALIC.to_string());
            }
            if style.contains(InlineStyle::CODE) {
                codes.push(bg(self.theme.ui.code_background));
            }
            if let Some(url) = &run.link_url {
                codes.push(UNDERLINE.to_string());
                codes.push(fg(self.theme.ui.link));
                let codes: Vec<&str> = codes.iter().map(String::as_str).collect();
                self.paint(out, &run.text, &codes);
                if url != &run.text {
                    let muted = fg(self.theme.ui.muted);
                    self.paint(out, &format!(" ({})", url), &[muted.as_str()]);
                }
                continue;
            }
            let codes: Vec<&str> = codes.iter().map(String::as_str).collect();
            self.paint(out, &run.text, &codes);
        }
    }

    fn code_block(
        &self,
        out: &mut String,
        text: &str,
        language: Option<&str>,
        segments: Option<&Vec<ColoredSegment>>,
    ) {
        let muted = fg(self.theme.ui.muted);
        self.paint(out, &format!("```{}", language.unwrap_or("")), &[muted.as_str()]);
        out.push('\n');

        match segments {
            Some(segments) if self.color => {
                let background = bg(self.theme.ui.code_background);
                for segment in segments {
                    // Keep the reset before each newline so the background
                    // does not bleed to the end of the terminal line
                    for (i, piece) in segment.text.split('\n').enumerate() {
                        if i > 0 {
                            out.push('\n');
                        }
                        if !piece.is_empty() {
                            let color = fg(segment.color);
                            self.paint(out, piece, &[background.as_str(), color.as_str()]);
                        }
                    }
                }
            }
            _ => out.push_str(text),
        }

        out.push('\n');
        self.paint(out, "```", &[muted.as_str()]);
        out.push('\n');
    }

    fn list(&self, out: &mut String, items: &[ListItem], numbered: bool) {
        // One counter per nesting depth, reset when the list goes shallower
        let mut counters: Vec<usize> = Vec::new();
        for item in items {
            let depth = item.indent_level;
            counters.truncate(depth + 1);
            counters.resize(depth + 1, 0);
            counters[depth] += 1;

            out.push_str(&"  ".repeat(depth));
            let marker = if numbered {
                format!("{}. ", counters[depth])
            } else {
                "• ".to_string()
            };
            let muted = fg(self.theme.ui.muted);
            self.paint(out, &marker, &[muted.as_str()]);
            self.inlines(out, &item.inlines, InlineStyle::NONE);
            out.push('\n');
        }
    }

    fn table(&self, out: &mut String, table: &TableBlock) {
        let columns = table.column_count();
        let mut widths = vec![0usize; columns];
        for row in std::iter::once(&table.header).chain(&table.rows) {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(plain_text(cell).chars().count());
            }
        }

        self.table_row(out, &table.header, &table.alignments, &widths, InlineStyle::BOLD);

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(3))).collect();
        let muted = fg(self.theme.ui.muted);
        self.paint(out, &format!("| {} |", rule.join(" | ")), &[muted.as_str()]);
        out.push('\n');

        for row in &table.rows {
            self.table_row(out, row, &table.alignments, &widths, InlineStyle::NONE);
        }
    }

    fn table_row(
        &self,
        out: &mut String,
        cells: &[Vec<InlineRun>],
        alignments: &[TableAlign],
        widths: &[usize],
        base: InlineStyle,
    ) {
        out.push('|');
        for ((cell, align), width) in cells.iter().zip(alignments).zip(widths) {
            let width = (*width).max(3);
            let pad = width.saturating_sub(plain_text(cell).chars().count());
            let (left, right) = match align {
                TableAlign::Left => (0, pad),
                TableAlign::Right => (pad, 0),
                TableAlign::Center => (pad / 2, pad - pad / 2),
            };
            let _ = write!(out, " {}", " ".repeat(left));
            self.inlines(out, cell, base);
            let _ = write!(out, "{} |", " ".repeat(right));
        }
        out.push('\n');
    }
}
