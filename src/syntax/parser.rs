//! Tree-sitter tokenizers
//!
//! Each built-in language pairs a grammar with a highlight query. Parsing
//! yields a tree, the query yields captures, and the captures are flattened
//! into non-overlapping `CodeToken`s.

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Parser, Query, QueryCursor};

use super::highlights::{kind_for_capture, CodeToken, TokenType};
use super::languages::LanguageId;
use super::registry::Tokenizer;

// Embedded query files
const JAVASCRIPT_HIGHLIGHTS: &str = include_str!("../../queries/javascript/highlights.scm");
const TYPESCRIPT_HIGHLIGHTS: &str = include_str!("../../queries/typescript/highlights.scm");
const JSON_HIGHLIGHTS: &str = include_str!("../../queries/json/highlights.scm");

// Queries shipped with the grammar crates
const RUST_HIGHLIGHTS: &str = tree_sitter_rust::HIGHLIGHTS_QUERY;
const PYTHON_HIGHLIGHTS: &str = tree_sitter_python::HIGHLIGHTS_QUERY;
const GO_HIGHLIGHTS: &str = tree_sitter_go::HIGHLIGHTS_QUERY;
const PHP_HIGHLIGHTS: &str = tree_sitter_php::HIGHLIGHTS_QUERY;
const C_HIGHLIGHTS: &str = tree_sitter_c::HIGHLIGHT_QUERY;
const CPP_HIGHLIGHTS: &str = tree_sitter_cpp::HIGHLIGHT_QUERY;
const JAVA_HIGHLIGHTS: &str = tree_sitter_java::HIGHLIGHTS_QUERY;
const BASH_HIGHLIGHTS: &str = tree_sitter_bash::HIGHLIGHT_QUERY;
const XML_HIGHLIGHTS: &str = tree_sitter_xml::XML_HIGHLIGHT_QUERY;

/// Grammar and highlight query source for a language
fn grammar(lang: LanguageId) -> (Language, String) {
    match lang {
        LanguageId::Rust => (tree_sitter_rust::LANGUAGE.into(), RUST_HIGHLIGHTS.into()),
        LanguageId::Python => (tree_sitter_python::LANGUAGE.into(), PYTHON_HIGHLIGHTS.into()),
        LanguageId::JavaScript => (
            tree_sitter_javascript::LANGUAGE.into(),
            JAVASCRIPT_HIGHLIGHTS.into(),
        ),
        // TypeScript grammars extend JavaScript, so the JS query applies too
        LanguageId::TypeScript => (
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            format!("{}\n{}", JAVASCRIPT_HIGHLIGHTS, TYPESCRIPT_HIGHLIGHTS),
        ),
        LanguageId::Tsx => (
            tree_sitter_typescript::LANGUAGE_TSX.into(),
            format!("{}\n{}", JAVASCRIPT_HIGHLIGHTS, TYPESCRIPT_HIGHLIGHTS),
        ),
        LanguageId::Json => (tree_sitter_json::LANGUAGE.into(), JSON_HIGHLIGHTS.into()),
        LanguageId::Go => (tree_sitter_go::LANGUAGE.into(), GO_HIGHLIGHTS.into()),
        LanguageId::C => (tree_sitter_c::LANGUAGE.into(), C_HIGHLIGHTS.into()),
        LanguageId::Cpp => (tree_sitter_cpp::LANGUAGE.into(), CPP_HIGHLIGHTS.into()),
        LanguageId::Java => (tree_sitter_java::LANGUAGE.into(), JAVA_HIGHLIGHTS.into()),
        LanguageId::Bash => (tree_sitter_bash::LANGUAGE.into(), BASH_HIGHLIGHTS.into()),
        LanguageId::Php => (tree_sitter_php::LANGUAGE_PHP.into(), PHP_HIGHLIGHTS.into()),
        LanguageId::Xml => (tree_sitter_xml::LANGUAGE_XML.into(), XML_HIGHLIGHTS.into()),
    }
}

/// A capture resolved to a byte range and token kind
#[derive(Debug, Clone, Copy)]
struct Capture {
    start: usize,
    end: usize,
    pattern: usize,
    kind: Option<TokenType>,
}

/// Tokenizer backed by a tree-sitter grammar.
///
/// Parsers are `!Sync`, so the parser sits behind a mutex; the compiled
/// query is shared freely.
pub struct TreeSitterTokenizer {
    language: LanguageId,
    parser: Mutex<Parser>,
    query: Query,
}

impl TreeSitterTokenizer {
    /// Build the parser and compile the highlight query for a language
    pub fn new(language: LanguageId) -> Result<Self> {
        let (ts_lang, highlights_scm) = grammar(language);

        let mut parser = Parser::new();
        parser
            .set_language(&ts_lang)
            .map_err(|e| anyhow!("failed to set language for {:?}: {}", language, e))?;

        let query = Query::new(&ts_lang, &highlights_scm)
            .map_err(|e| anyhow!("failed to compile query for {:?}: {:?}", language, e))?;

        Ok(Self {
            language,
            parser: Mutex::new(parser),
            query,
        })
    }

    pub fn language(&self) -> LanguageId {
        self.language
    }

    /// Collect every capture the query produces for `source`
    fn captures(&self, source: &str) -> Result<Vec<Capture>> {
        let tree = {
            let mut parser = self
                .parser
                .lock()
                .map_err(|_| anyhow!("parser for {:?} poisoned", self.language))?;
            parser
                .parse(source, None)
                .ok_or_else(|| anyhow!("parse failed for {:?}", self.language))?
        };

        let mut cursor = QueryCursor::new();
        let names = self.query.capture_names();
        let mut out = Vec::new();

        let mut captures = cursor.captures(&self.query, tree.root_node(), source.as_bytes());
        while let Some((query_match, capture_idx)) = captures.next() {
            let capture = &query_match.captures[*capture_idx];
            let range = capture.node.byte_range();
            if range.start >= range.end {
                continue;
            }
            let name = names[capture.index as usize];
            let mut kind = kind_for_capture(name);
            // Some grammars file numeric literals under @constant.builtin
            if name.starts_with("constant")
                && source
                    .get(range.clone())
                    .is_some_and(|text| text.starts_with(|c: char| c.is_ascii_digit()))
            {
                kind = Some(TokenType::Number);
            }
            out.push(Capture {
                start: range.start,
                end: range.end,
                pattern: query_match.pattern_index,
                kind,
            });
        }

        Ok(out)
    }
}

impl Tokenizer for TreeSitterTokenizer {
    fn tokenize(&self, code: &str) -> Result<Vec<CodeToken>> {
        let captures = self.captures(code)?;
        let tokens = flatten_captures(code, captures);
        tracing::trace!(
            "{:?}: {} bytes -> {} tokens",
            self.language,
            code.len(),
            tokens.len()
        );
        Ok(tokens)
    }
}

/// Flatten possibly nested captures into sorted, non-overlapping tokens.
///
/// For the same node the earliest pattern wins; a nested node paints over
/// its parent within its own range.
fn flatten_captures(source: &str, mut captures: Vec<Capture>) -> Vec<CodeToken> {
    captures.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(b.end.cmp(&a.end))
            .then(a.pattern.cmp(&b.pattern))
    });
    captures.dedup_by(|later, first| later.start == first.start && later.end == first.end);

    let mut paint: Vec<Option<TokenType>> = vec![None; source.len()];
    for capture in &captures {
        let end = capture.end.min(source.len());
        for slot in &mut paint[capture.start.min(end)..end] {
            *slot = capture.kind;
        }
    }

    let mut tokens = Vec::new();
    let mut idx = 0;
    while idx < paint.len() {
        let Some(kind) = paint[idx] else {
            idx += 1;
            continue;
        };
        let start = idx;
        while idx < paint.len() && paint[idx] == Some(kind) {
            idx += 1;
        }
        // Node ranges are char-aligned; guard anyway so slicing never panics
        if kind != TokenType::Normal
            && source.is_char_boundary(start)
            && source.is_char_boundary(idx)
        {
            tokens.push(CodeToken::new(&source[start..idx], kind, start));
        }
    }

    tokens
}
