//! Language identification for built-in tokenizers
//!
//! Maps fence tags (`rust`, `py`, `c++`, ...) to the grammars compiled into
//! the binary. Fence tags are free-form; anything not listed here simply has
//! no built-in tokenizer.

/// Languages with a built-in tree-sitter tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Json,
    Go,
    C,
    Cpp,
    Java,
    Bash,
    Php,
    Xml,
}

impl LanguageId {
    pub const ALL: [LanguageId; 13] = [
        LanguageId::Rust,
        LanguageId::Python,
        LanguageId::JavaScript,
        LanguageId::TypeScript,
        LanguageId::Tsx,
        LanguageId::Json,
        LanguageId::Go,
        LanguageId::C,
        LanguageId::Cpp,
        LanguageId::Java,
        LanguageId::Bash,
        LanguageId::Php,
        LanguageId::Xml,
    ];

    /// Fence tags this language answers to. The first entry is the primary id.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            LanguageId::Rust => &["rust", "rs"],
            LanguageId::Python => &["python", "py", "python3", "py3"],
            LanguageId::JavaScript => &["javascript", "js", "jsx", "mjs", "cjs", "node"],
            LanguageId::TypeScript => &["typescript", "ts", "mts", "cts"],
            LanguageId::Tsx => &["tsx"],
            LanguageId::Json => &["json", "jsonc", "json5"],
            LanguageId::Go => &["go", "golang"],
            LanguageId::C => &["c", "h"],
            LanguageId::Cpp => &["cpp", "c++", "cc", "cxx", "hpp", "hxx"],
            LanguageId::Java => &["java"],
            LanguageId::Bash => &["bash", "sh", "shell", "zsh", "console"],
            LanguageId::Php => &["php"],
            LanguageId::Xml => &["xml", "xaml", "svg", "csproj"],
        }
    }

    /// Primary id (first alias)
    pub fn id(&self) -> &'static str {
        self.aliases()[0]
    }

    /// Detect language from a fence tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.aliases().contains(&tag.as_str()))
    }

    /// Get display name for the language
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageId::Rust => "Rust",
            LanguageId::Python => "Python",
            LanguageId::JavaScript => "JavaScript",
            LanguageId::TypeScript => "TypeScript",
            LanguageId::Tsx => "TSX",
            LanguageId::Json => "JSON",
            LanguageId::Go => "Go",
            LanguageId::C => "C",
            LanguageId::Cpp => "C++",
            LanguageId::Java => "Java",
            LanguageId::Bash => "Bash",
            LanguageId::Php => "PHP",
            LanguageId::Xml => "XML",
        }
    }
}
