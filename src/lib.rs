//! Chat transcript rendering
//!
//! Parses chat-style Markdown into a block model and colors fenced code
//! blocks on a background worker with a content-addressed cache.

pub mod config;
pub mod config_paths;
pub mod highlight;
pub mod markdown;
pub mod syntax;
pub mod terminal;
pub mod theme;
pub mod tracing;

// Re-export commonly used types
pub use config::RenderConfig;
pub use highlight::{CacheKey, ColoredSegment, Highlight, HighlightPipeline};
pub use markdown::{parse, Block};
pub use syntax::{CodeToken, TokenType, TokenizerRegistry};
pub use theme::{Color, SyntaxPalette, Theme, ThemeSet};
