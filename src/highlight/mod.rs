//! Asynchronous syntax highlighting for code blocks
//!
//! Turns `(language, code)` pairs into colored segments on a background
//! worker and caches the results by content.

mod pipeline;
mod segments;

pub use pipeline::{CacheKey, Highlight, HighlightPipeline, PipelineConfig};
pub use segments::{materialize, placeholder, segments_text, ColoredSegment};
