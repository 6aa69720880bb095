//! Colored runs ready for display

use serde::Serialize;

use crate::syntax::{CodeToken, TokenType};
use crate::theme::{Color, SyntaxPalette};

/// A run of code text painted in one color.
///
/// `start` is the byte offset of `text` within the source code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColoredSegment {
    pub text: String,
    pub color: Color,
    pub start: usize,
}

impl ColoredSegment {
    pub fn new(text: impl Into<String>, color: Color, start: usize) -> Self {
        Self {
            text: text.into(),
            color,
            start,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Turn normalized tokens into segments that cover `code` exactly.
///
/// Gaps between tokens are filled with the palette's `Normal` color, so the
/// concatenated segment text always equals `code`.
pub fn materialize(
    code: &str,
    tokens: &[CodeToken],
    palette: &dyn SyntaxPalette,
    dark: bool,
) -> Vec<ColoredSegment> {
    let normal = palette.token_color(TokenType::Normal, dark);
    let mut segments = Vec::with_capacity(tokens.len() * 2 + 1);
    let mut pos = 0;

    for token in tokens {
        // Tokens come in sorted and disjoint; anything else is skipped
        if token.start < pos || code.get(token.start..token.end()).is_none() {
            continue;
        }
        if token.start > pos {
            segments.push(ColoredSegment::new(&code[pos..token.start], normal, pos));
        }
        if token.len > 0 {
            segments.push(ColoredSegment::new(
                &code[token.start..token.end()],
                palette.token_color(token.kind, dark),
                token.start,
            ));
        }
        pos = token.end();
    }

    if pos < code.len() {
        segments.push(ColoredSegment::new(&code[pos..], normal, pos));
    }

    segments
}

/// A single segment holding the raw code in the default text color, or
/// nothing for empty code
pub fn placeholder(
    code: &str,
    palette: Option<&dyn SyntaxPalette>,
    dark: bool,
) -> Vec<ColoredSegment> {
    let color = match palette {
        Some(palette) => palette.foreground(dark),
        None if dark => Color::rgb(0xD4, 0xD4, 0xD4),
        None => Color::rgb(0x00, 0x00, 0x00),
    };
    if code.is_empty() {
        return Vec::new();
    }
    vec![ColoredSegment::new(code, color, 0)]
}

/// Concatenated segment text
pub fn segments_text(segments: &[ColoredSegment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}
