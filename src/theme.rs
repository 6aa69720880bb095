//! Theme system for rendered transcripts
//!
//! Provides YAML-based theming support with compile-time embedded themes
//! and user-defined themes from the config directory.
//!
//! Theme loading priority:
//! 1. User config: `~/.config/chatmark/themes/{id}.yaml`
//! 2. Embedded: Built-in themes compiled into binary

use std::path::Path;

use serde::Deserialize;

use crate::syntax::TokenType;

// Embed theme YAML files at compile time
pub const DEFAULT_DARK_YAML: &str = include_str!("../themes/default-dark.yaml");
pub const DEFAULT_LIGHT_YAML: &str = include_str!("../themes/default-light.yaml");
pub const GITHUB_DARK_YAML: &str = include_str!("../themes/github-dark.yaml");
pub const GITHUB_LIGHT_YAML: &str = include_str!("../themes/github-light.yaml");

/// A built-in theme entry
pub struct BuiltinTheme {
    /// Stable identifier for config (e.g. "default-dark", "github-light")
    pub id: &'static str,
    /// Embedded YAML content
    pub yaml: &'static str,
}

/// Registry of all built-in themes
pub const BUILTIN_THEMES: &[BuiltinTheme] = &[
    BuiltinTheme {
        id: "default-dark",
        yaml: DEFAULT_DARK_YAML,
    },
    BuiltinTheme {
        id: "default-light",
        yaml: DEFAULT_LIGHT_YAML,
    },
    BuiltinTheme {
        id: "github-dark",
        yaml: GITHUB_DARK_YAML,
    },
    BuiltinTheme {
        id: "github-light",
        yaml: GITHUB_LIGHT_YAML,
    },
];

/// Load a theme from a YAML file
pub fn from_file(path: &Path) -> Result<Theme, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read theme file {}: {}", path.display(), e))?;
    Theme::from_yaml(&content)
}

/// Load theme by id with priority: user → builtin
pub fn load_theme(id: &str) -> Result<Theme, String> {
    if let Some(user_dir) = crate::config_paths::themes_dir() {
        let user_path = user_dir.join(format!("{}.yaml", id));
        if user_path.exists() {
            tracing::info!("Loading user theme from {}", user_path.display());
            return from_file(&user_path);
        }
    }

    tracing::info!("Loading builtin theme: {}", id);
    Theme::from_builtin(id)
}

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGB values (alpha defaults to 255)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a new color from RGBA values
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse from "#RRGGBB" or "#RRGGBBAA" hex string
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let s = s.trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            s.get(range)
                .ok_or_else(|| format!("Invalid color format: {}", s))
                .and_then(|hex| u8::from_str_radix(hex, 16).map_err(|e| e.to_string()))
        };
        match s.len() {
            6 => Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Color::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(format!("Invalid color format: {}", s)),
        }
    }

    /// "#rrggbb" (alpha dropped)
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Raw theme data as parsed from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeData {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub dark: bool,
    pub ui: UiThemeData,
    pub syntax: SyntaxThemeData,
}

/// Document colors (raw strings from YAML)
#[derive(Debug, Clone, Deserialize)]
pub struct UiThemeData {
    pub background: String,
    pub foreground: String,
    #[serde(default)]
    pub code_background: Option<String>,
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub muted: Option<String>,
}

/// Token colors (raw strings from YAML). Missing entries fall back to `normal`.
#[derive(Debug, Clone, Deserialize)]
pub struct SyntaxThemeData {
    pub normal: String,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub string: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub punctuation: Option<String>,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

/// Resolved theme with parsed colors
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub dark: bool,
    pub ui: UiTheme,
    pub syntax: SyntaxTheme,
}

/// Document colors (resolved)
#[derive(Debug, Clone)]
pub struct UiTheme {
    pub background: Color,
    pub foreground: Color,
    pub code_background: Color,
    pub heading: Color,
    pub link: Color,
    /// Table borders, list markers, code fence labels
    pub muted: Color,
}

/// Token colors (resolved)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxTheme {
    pub normal: Color,
    pub keyword: Color,
    pub string: Color,
    pub comment: Color,
    pub number: Color,
    pub operator: Color,
    pub punctuation: Color,
    pub type_name: Color,
    pub method: Color,
}

impl SyntaxTheme {
    pub fn color(&self, kind: TokenType) -> Color {
        match kind {
            TokenType::Normal => self.normal,
            TokenType::Keyword => self.keyword,
            TokenType::String => self.string,
            TokenType::Comment => self.comment,
            TokenType::Number => self.number,
            TokenType::Operator => self.operator,
            TokenType::Punctuation => self.punctuation,
            TokenType::Type => self.type_name,
            TokenType::Method => self.method,
        }
    }
}

fn optional_color(value: &Option<String>, fallback: Color) -> Result<Color, String> {
    Ok(value
        .as_deref()
        .map(Color::from_hex)
        .transpose()?
        .unwrap_or(fallback))
}

impl Theme {
    /// Load theme from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        let data: ThemeData =
            serde_yaml::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))?;
        Self::from_data(data)
    }

    /// Load a built-in theme by id
    pub fn from_builtin(id: &str) -> Result<Self, String> {
        let entry = BUILTIN_THEMES
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| format!("Unknown theme id: {}", id))?;
        Theme::from_yaml(entry.yaml)
    }

    /// Convert raw theme data to resolved theme
    pub fn from_data(data: ThemeData) -> Result<Self, String> {
        let foreground = Color::from_hex(&data.ui.foreground)?;
        let background = Color::from_hex(&data.ui.background)?;
        let normal = Color::from_hex(&data.syntax.normal)?;
        let s = &data.syntax;

        Ok(Theme {
            name: data.name,
            dark: data.dark,
            ui: UiTheme {
                background,
                foreground,
                code_background: optional_color(&data.ui.code_background, background)?,
                heading: optional_color(&data.ui.heading, foreground)?,
                link: optional_color(&data.ui.link, foreground)?,
                muted: optional_color(&data.ui.muted, foreground)?,
            },
            syntax: SyntaxTheme {
                normal,
                keyword: optional_color(&s.keyword, normal)?,
                string: optional_color(&s.string, normal)?,
                comment: optional_color(&s.comment, normal)?,
                number: optional_color(&s.number, normal)?,
                operator: optional_color(&s.operator, normal)?,
                punctuation: optional_color(&s.punctuation, normal)?,
                type_name: optional_color(&s.type_name, normal)?,
                method: optional_color(&s.method, normal)?,
            },
        })
    }

    /// Default dark theme (YAML-backed with Rust fallback)
    pub fn default_dark() -> Self {
        Theme::from_yaml(DEFAULT_DARK_YAML).unwrap_or_else(|_| Theme::fallback(true))
    }

    /// Default light theme (YAML-backed with Rust fallback)
    pub fn default_light() -> Self {
        Theme::from_yaml(DEFAULT_LIGHT_YAML).unwrap_or_else(|_| Theme::fallback(false))
    }

    /// Hardcoded monochrome theme used when YAML parsing fails
    fn fallback(dark: bool) -> Self {
        let (background, foreground) = if dark {
            (Color::rgb(0x1E, 0x1E, 0x1E), Color::rgb(0xD4, 0xD4, 0xD4))
        } else {
            (Color::rgb(0xFF, 0xFF, 0xFF), Color::rgb(0x00, 0x00, 0x00))
        };
        Theme {
            name: if dark { "Fallback Dark" } else { "Fallback Light" }.to_string(),
            dark,
            ui: UiTheme {
                background,
                foreground,
                code_background: background,
                heading: foreground,
                link: foreground,
                muted: foreground,
            },
            syntax: SyntaxTheme {
                normal: foreground,
                keyword: foreground,
                string: foreground,
                comment: foreground,
                number: foreground,
                operator: foreground,
                punctuation: foreground,
                type_name: foreground,
                method: foreground,
            },
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_dark()
    }
}

/// Resolves token colors for the dark/light theme flag.
///
/// Implementations must be pure: the same inputs always give the same color.
pub trait SyntaxPalette: Send + Sync {
    fn token_color(&self, kind: TokenType, dark: bool) -> Color;

    /// Default text color, used for placeholders and gap text
    fn foreground(&self, dark: bool) -> Color {
        self.token_color(TokenType::Normal, dark)
    }
}

/// The pair of themes a transcript view switches between
#[derive(Debug, Clone)]
pub struct ThemeSet {
    pub dark: Theme,
    pub light: Theme,
}

impl ThemeSet {
    /// Load both themes by id, falling back to the built-in defaults
    pub fn load(dark_id: &str, light_id: &str) -> Self {
        let dark = load_theme(dark_id).unwrap_or_else(|e| {
            tracing::warn!("Failed to load theme '{}': {}", dark_id, e);
            Theme::default_dark()
        });
        let light = load_theme(light_id).unwrap_or_else(|e| {
            tracing::warn!("Failed to load theme '{}': {}", light_id, e);
            Theme::default_light()
        });
        Self { dark, light }
    }

    pub fn get(&self, dark: bool) -> &Theme {
        if dark {
            &self.dark
        } else {
            &self.light
        }
    }
}

impl Default for ThemeSet {
    fn default() -> Self {
        Self {
            dark: Theme::default_dark(),
            light: Theme::default_light(),
        }
    }
}

impl SyntaxPalette for ThemeSet {
    fn token_color(&self, kind: TokenType, dark: bool) -> Color {
        self.get(dark).syntax.color(kind)
    }

    fn foreground(&self, dark: bool) -> Color {
        self.get(dark).ui.foreground
    }
}
