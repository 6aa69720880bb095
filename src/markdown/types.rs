//! Document model produced by the Markdown parser.

use std::ops::{BitOr, BitOrAssign};

use serde::{Serialize, Serializer};

/// Style bitset for an inline run
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InlineStyle(u8);

impl InlineStyle {
    pub const NONE: InlineStyle = InlineStyle(0);
    pub const BOLD: InlineStyle = InlineStyle(1);
    pub const ITALIC: InlineStyle = InlineStyle(1 << 1);
    pub const CODE: InlineStyle = InlineStyle(1 << 2);
    pub const LINK: InlineStyle = InlineStyle(1 << 3);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: InlineStyle) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_plain(self) -> bool {
        self.0 == 0
    }

    pub const fn with(self, other: InlineStyle) -> Self {
        InlineStyle(self.0 | other.0)
    }

    pub const fn without(self, other: InlineStyle) -> Self {
        InlineStyle(self.0 & !other.0)
    }

    /// Flip `other` on or off
    pub const fn toggle(self, other: InlineStyle) -> Self {
        InlineStyle(self.0 ^ other.0)
    }

    fn names(self) -> Vec<&'static str> {
        [
            (Self::BOLD, "bold"),
            (Self::ITALIC, "italic"),
            (Self::CODE, "code"),
            (Self::LINK, "link"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect()
    }
}

impl BitOr for InlineStyle {
    type Output = InlineStyle;

    fn bitor(self, rhs: InlineStyle) -> InlineStyle {
        self.with(rhs)
    }
}

impl BitOrAssign for InlineStyle {
    fn bitor_assign(&mut self, rhs: InlineStyle) {
        *self = self.with(rhs);
    }
}

impl std::fmt::Debug for InlineStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_plain() {
            return write!(f, "Normal");
        }
        write!(f, "{}", self.names().join("|"))
    }
}

impl Serialize for InlineStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

/// A contiguous span of text with one style.
///
/// `link_url` is set exactly when `style` contains `LINK`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineRun {
    pub text: String,
    pub style: InlineStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
}

impl InlineRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, InlineStyle::NONE)
    }

    pub fn styled(text: impl Into<String>, style: InlineStyle) -> Self {
        Self {
            text: text.into(),
            style: style.without(InlineStyle::LINK),
            link_url: None,
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>, style: InlineStyle) -> Self {
        Self {
            text: text.into(),
            style: style.with(InlineStyle::LINK),
            link_url: Some(url.into()),
        }
    }

    pub fn is_link(&self) -> bool {
        self.style.contains(InlineStyle::LINK)
    }
}

/// Concatenated text of a run list, styles dropped
pub fn plain_text(runs: &[InlineRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

/// One list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub inlines: Vec<InlineRun>,
    /// Nesting depth derived from leading whitespace
    pub indent_level: usize,
}

/// Column alignment from a table separator row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TableAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A table cell is a run list
pub type TableCell = Vec<InlineRun>;

/// Pipe table; every row has exactly `alignments.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableBlock {
    pub header: Vec<TableCell>,
    pub alignments: Vec<TableAlign>,
    pub rows: Vec<Vec<TableCell>>,
}

impl TableBlock {
    pub fn column_count(&self) -> usize {
        self.alignments.len()
    }
}

/// A top-level block of a parsed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading {
        level: u8,
        inlines: Vec<InlineRun>,
    },
    Paragraph {
        inlines: Vec<InlineRun>,
    },
    CodeBlock {
        text: String,
        language: Option<String>,
    },
    BulletList {
        items: Vec<ListItem>,
    },
    NumberedList {
        items: Vec<ListItem>,
    },
    Table(TableBlock),
}

impl Block {
    pub fn empty_paragraph() -> Self {
        Block::Paragraph {
            inlines: vec![InlineRun::plain("")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_combination() {
        let style = InlineStyle::BOLD | InlineStyle::ITALIC;
        assert!(style.contains(InlineStyle::BOLD));
        assert!(style.contains(InlineStyle::ITALIC));
        assert!(!style.contains(InlineStyle::CODE));
        assert_eq!(style.toggle(InlineStyle::BOLD), InlineStyle::ITALIC);
        assert_eq!(format!("{:?}", style), "bold|italic");
        assert_eq!(format!("{:?}", InlineStyle::NONE), "Normal");
    }

    #[test]
    fn test_link_flag_tracks_url() {
        let link = InlineRun::link("docs", "https://x.dev", InlineStyle::BOLD);
        assert!(link.is_link());
        assert!(link.style.contains(InlineStyle::BOLD));

        let plain = InlineRun::styled("text", InlineStyle::LINK);
        assert!(!plain.is_link());
        assert!(plain.link_url.is_none());
    }

    #[test]
    fn test_block_serializes_with_tag() {
        let block = Block::CodeBlock {
            text: "x".into(),
            language: Some("py".into()),
        };
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, r#"{"type":"code_block","text":"x","language":"py"}"#);
    }
}
