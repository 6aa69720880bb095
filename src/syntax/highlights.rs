//! Code token data structures
//!
//! Defines the token kinds a tokenizer can emit and the mapping from
//! tree-sitter capture names onto those kinds.

use serde::Serialize;

/// Lexical class of a code token. Anything unclassified is `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TokenType {
    #[default]
    Normal,
    Keyword,
    String,
    Comment,
    Number,
    Operator,
    Punctuation,
    Type,
    Method,
}

impl TokenType {
    pub const ALL: [TokenType; 9] = [
        TokenType::Normal,
        TokenType::Keyword,
        TokenType::String,
        TokenType::Comment,
        TokenType::Number,
        TokenType::Operator,
        TokenType::Punctuation,
        TokenType::Type,
        TokenType::Method,
    ];
}

/// A classified slice of source code.
///
/// `start` and `len` are byte offsets into the tokenized string and always
/// fall on UTF-8 char boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeToken {
    pub text: String,
    pub kind: TokenType,
    pub start: usize,
    pub len: usize,
}

impl CodeToken {
    pub fn new(text: impl Into<String>, kind: TokenType, start: usize) -> Self {
        let text = text.into();
        let len = text.len();
        Self {
            text,
            kind,
            start,
            len,
        }
    }

    /// A single Normal token covering all of `code`
    pub fn whole(code: &str) -> Self {
        Self::new(code, TokenType::Normal, 0)
    }

    /// Exclusive end offset
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Capture names (as used by tree-sitter highlight queries) and the token
/// kind each maps to. Lookup falls back through dotted parents, so
/// `keyword.control.import` resolves via `keyword`.
pub const CAPTURE_KINDS: &[(&str, TokenType)] = &[
    ("attribute", TokenType::Type),
    ("boolean", TokenType::Keyword),
    ("character", TokenType::String),
    ("comment", TokenType::Comment),
    ("conditional", TokenType::Keyword),
    ("constant.builtin", TokenType::Keyword),
    ("constant.numeric", TokenType::Number),
    ("constructor", TokenType::Type),
    ("escape", TokenType::String),
    ("float", TokenType::Number),
    ("function", TokenType::Method),
    ("function.method", TokenType::Method),
    ("include", TokenType::Keyword),
    ("keyword", TokenType::Keyword),
    ("method", TokenType::Method),
    ("number", TokenType::Number),
    ("operator", TokenType::Operator),
    ("punctuation", TokenType::Punctuation),
    ("repeat", TokenType::Keyword),
    ("storageclass", TokenType::Keyword),
    ("string", TokenType::String),
    ("tag", TokenType::Keyword),
    ("type", TokenType::Type),
];

/// Look up the token kind for a capture name
pub fn kind_for_capture(name: &str) -> Option<TokenType> {
    // Exact match first, then progressively shorter parents
    // (e.g. "keyword.control.import" -> "keyword.control" -> "keyword").
    let mut current = name;
    loop {
        if let Some((_, kind)) = CAPTURE_KINDS.iter().find(|(n, _)| *n == current) {
            return Some(*kind);
        }

        let Some(dot_pos) = current.rfind('.') else {
            break;
        };
        current = &current[..dot_pos];
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_lookup() {
        assert_eq!(kind_for_capture("keyword"), Some(TokenType::Keyword));
        assert_eq!(
            kind_for_capture("keyword.control.import"),
            Some(TokenType::Keyword)
        );
        assert_eq!(kind_for_capture("string.special"), Some(TokenType::String));
        assert_eq!(kind_for_capture("function.macro"), Some(TokenType::Method));
        assert_eq!(kind_for_capture("type.builtin"), Some(TokenType::Type));
        assert_eq!(kind_for_capture("variable"), None);
        assert_eq!(kind_for_capture("property"), None);
    }

    #[test]
    fn test_constant_builtin_is_not_a_number() {
        assert_eq!(kind_for_capture("constant.builtin"), Some(TokenType::Keyword));
        assert_eq!(kind_for_capture("constant"), None);
    }

    #[test]
    fn test_whole_token_spans_input() {
        let token = CodeToken::whole("let x = 1;");
        assert_eq!(token.start, 0);
        assert_eq!(token.len, 10);
        assert_eq!(token.end(), 10);
        assert_eq!(token.kind, TokenType::Normal);
    }
}
