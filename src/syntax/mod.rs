//! Code tokenization
//!
//! Classifies source code into colorable tokens:
//! - `TokenType` / `CodeToken` value types
//! - Fence-tag → language mapping for the built-in grammars
//! - Tree-sitter backed tokenizers
//! - A registry that dispatches by language id and never fails
//!
//! ## Architecture
//!
//! ```text
//! fence tag → TokenizerRegistry::highlight → Tokenizer::tokenize
//!           → (Err / panic / unknown id) → one Normal token
//! ```

mod highlights;
mod languages;
mod parser;
mod registry;

pub use highlights::{kind_for_capture, CodeToken, TokenType, CAPTURE_KINDS};
pub use languages::LanguageId;
pub use parser::TreeSitterTokenizer;
pub use registry::{Tokenizer, TokenizerRegistry};
