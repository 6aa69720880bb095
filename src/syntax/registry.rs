//! Tokenizer registry
//!
//! Maps language ids and aliases to tokenizer instances. `highlight` is the
//! only entry point callers need: it never fails and never panics, degrading
//! to a single Normal token when no tokenizer applies or the tokenizer breaks.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::Result;

use super::highlights::CodeToken;
use super::languages::LanguageId;
use super::parser::TreeSitterTokenizer;

/// Turns source text into classified tokens
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, code: &str) -> Result<Vec<CodeToken>>;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Result<Vec<CodeToken>> + Send + Sync,
{
    fn tokenize(&self, code: &str) -> Result<Vec<CodeToken>> {
        self(code)
    }
}

/// Alias → tokenizer lookup
#[derive(Default, Clone)]
pub struct TokenizerRegistry {
    tokenizers: HashMap<String, Arc<dyn Tokenizer>>,
}

impl std::fmt::Debug for TokenizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut aliases: Vec<&String> = self.tokenizers.keys().collect();
        aliases.sort();
        f.debug_struct("TokenizerRegistry")
            .field("aliases", &aliases)
            .finish()
    }
}

impl TokenizerRegistry {
    /// Empty registry: every lookup falls back to plain text
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in tree-sitter language registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for lang in LanguageId::ALL {
            match TreeSitterTokenizer::new(lang) {
                Ok(tokenizer) => registry.register(lang.aliases(), Arc::new(tokenizer)),
                Err(e) => tracing::error!("Skipping {} tokenizer: {:#}", lang.display_name(), e),
            }
        }
        tracing::debug!("Registered {} tokenizer aliases", registry.tokenizers.len());
        registry
    }

    /// Register one tokenizer under several aliases. Later registrations of
    /// the same alias replace earlier ones.
    pub fn register(&mut self, aliases: &[&str], tokenizer: Arc<dyn Tokenizer>) {
        for alias in aliases {
            let key = normalize(alias);
            if self.tokenizers.insert(key, Arc::clone(&tokenizer)).is_some() {
                tracing::debug!("Tokenizer alias '{}' overwritten", alias);
            }
        }
    }

    /// Look up a tokenizer by id or alias (case-insensitive)
    pub fn get(&self, language: &str) -> Option<Arc<dyn Tokenizer>> {
        self.tokenizers.get(&normalize(language)).cloned()
    }

    pub fn contains(&self, language: &str) -> bool {
        self.tokenizers.contains_key(&normalize(language))
    }

    /// Tokenize `code` with the tokenizer registered for `language`.
    ///
    /// - Empty code yields no tokens.
    /// - Unknown languages, tokenizer errors and tokenizer panics yield one
    ///   Normal token spanning the whole input.
    /// - Output is sorted, non-overlapping and sliced from `code`.
    pub fn highlight(&self, language: &str, code: &str) -> Vec<CodeToken> {
        if code.is_empty() {
            return Vec::new();
        }

        let Some(tokenizer) = self.get(language) else {
            tracing::trace!("No tokenizer for '{}', using plain text", language);
            return vec![CodeToken::whole(code)];
        };

        match panic::catch_unwind(AssertUnwindSafe(|| tokenizer.tokenize(code))) {
            Ok(Ok(tokens)) => normalize_tokens(code, tokens),
            Ok(Err(e)) => {
                tracing::warn!("Tokenizer for '{}' failed: {:#}", language, e);
                vec![CodeToken::whole(code)]
            }
            Err(_) => {
                tracing::warn!("Tokenizer for '{}' panicked", language);
                vec![CodeToken::whole(code)]
            }
        }
    }
}

fn normalize(language: &str) -> String {
    language.trim().to_lowercase()
}

/// Sort tokens, drop any that overlap a predecessor, run past the input or
/// split a UTF-8 sequence, and re-slice `text` from the source.
fn normalize_tokens(code: &str, mut tokens: Vec<CodeToken>) -> Vec<CodeToken> {
    tokens.sort_by_key(|t| (t.start, t.len));

    let mut out = Vec::with_capacity(tokens.len());
    let mut cursor = 0;
    for token in tokens {
        let end = token.start.saturating_add(token.len);
        if token.len == 0
            || token.start < cursor
            || end > code.len()
            || !code.is_char_boundary(token.start)
            || !code.is_char_boundary(end)
        {
            tracing::trace!("Dropping malformed token {:?}", token);
            continue;
        }
        out.push(CodeToken::new(&code[token.start..end], token.kind, token.start));
        cursor = end;
    }
    out
}
