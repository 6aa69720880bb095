//! Command-line argument parsing for the transcript renderer

use std::path::PathBuf;

use clap::Parser;

/// Render chat-style Markdown with syntax-highlighted code blocks
#[derive(Parser, Debug)]
#[command(
    name = "chatmark",
    version,
    about = "Render chat-style Markdown with syntax-highlighted code blocks"
)]
pub struct CliArgs {
    /// Markdown files to render (reads stdin when empty)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Use the light theme
    #[arg(long)]
    pub light: bool,

    /// Print the parsed document as JSON instead of rendering it
    #[arg(long)]
    pub json: bool,

    /// Render without ANSI colors
    #[arg(long)]
    pub no_color: bool,

    /// How long to wait for background highlighting before printing
    #[arg(long, value_name = "N", default_value_t = 2000)]
    pub wait_ms: u64,

    /// Theme id for dark mode (overrides config)
    #[arg(long, value_name = "ID")]
    pub dark_theme: Option<String>,

    /// Theme id for light mode (overrides config)
    #[arg(long, value_name = "ID")]
    pub light_theme: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["chatmark"]).unwrap();
        assert!(args.files.is_empty());
        assert!(!args.light);
        assert!(!args.json);
        assert_eq!(args.wait_ms, 2000);
        assert!(args.dark_theme.is_none());
    }

    #[test]
    fn test_flags_and_files() {
        let args = CliArgs::try_parse_from([
            "chatmark",
            "a.md",
            "b.md",
            "--light",
            "--no-color",
            "--wait-ms",
            "50",
            "--light-theme",
            "github-light",
        ])
        .unwrap();
        assert_eq!(args.files, vec![PathBuf::from("a.md"), PathBuf::from("b.md")]);
        assert!(args.light);
        assert!(args.no_color);
        assert_eq!(args.wait_ms, 50);
        assert_eq!(args.light_theme.as_deref(), Some("github-light"));
    }
}
