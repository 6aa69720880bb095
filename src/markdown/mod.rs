//! Markdown for chat transcripts
//!
//! A forgiving, line-oriented subset: headings, paragraphs, fenced code,
//! bullet and numbered lists, pipe tables, and inline bold / italic / code /
//! links with URL autolinking. Parsing never fails; anything malformed comes
//! out as plain text.

mod inline;
mod parser;
mod table;
mod types;

pub use inline::{autolink, parse_inlines};
pub use parser::parse;
pub use table::{parse_separator, split_row};
pub use types::{
    plain_text, Block, InlineRun, InlineStyle, ListItem, TableAlign, TableBlock, TableCell,
};
