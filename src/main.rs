use std::io::Read;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use chatmark::config::RenderConfig;
use chatmark::highlight::{CacheKey, ColoredSegment, Highlight, HighlightPipeline};
use chatmark::markdown::{self, Block};
use chatmark::syntax::TokenizerRegistry;
use chatmark::terminal::TerminalRenderer;
use chatmark::theme::ThemeSet;

mod cli;

use cli::CliArgs;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    chatmark::tracing::init();

    let mut config = RenderConfig::load();
    if args.light {
        config.dark = false;
    }
    if let Some(id) = args.dark_theme.clone() {
        config.dark_theme = id;
    }
    if let Some(id) = args.light_theme.clone() {
        config.light_theme = id;
    }

    let source = read_input(&args.files)?;
    let blocks = markdown::parse(&source);
    tracing::debug!("Parsed {} blocks from {} bytes", blocks.len(), source.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
        return Ok(());
    }

    let themes = Arc::new(ThemeSet::load(&config.dark_theme, &config.light_theme));
    let pipeline = HighlightPipeline::new(
        Arc::new(TokenizerRegistry::with_defaults()),
        config.pipeline_config(),
    );
    pipeline.set_palette(themes.clone());

    let completed = pipeline.subscribe();
    let mut highlights: Vec<Highlight> = blocks
        .iter()
        .filter_map(|block| match block {
            Block::CodeBlock { text, language } => {
                Some(pipeline.request(language.as_deref().unwrap_or(""), config.dark, text))
            }
            _ => None,
        })
        .collect();

    wait_for_highlights(
        &pipeline,
        &completed,
        &mut highlights,
        Duration::from_millis(args.wait_ms),
    );

    let segments: Vec<Vec<ColoredSegment>> = highlights
        .into_iter()
        .map(|highlight| match highlight {
            Highlight::Ready(segments) => segments,
            Highlight::Pending { placeholder, .. } => placeholder,
        })
        .collect();

    let renderer = TerminalRenderer::new(themes.get(config.dark), !args.no_color);
    print!("{}", renderer.render(&blocks, &segments));
    Ok(())
}

/// Concatenate the given files, or read stdin when there are none
fn read_input(files: &[PathBuf]) -> Result<String> {
    if files.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }

    let mut parts = Vec::with_capacity(files.len());
    for path in files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        parts.push(text);
    }
    Ok(parts.join("\n\n"))
}

/// Swap placeholders for finished results as completions arrive, until all
/// are ready or `timeout` passes
fn wait_for_highlights(
    pipeline: &HighlightPipeline,
    completed: &Receiver<CacheKey>,
    highlights: &mut [Highlight],
    timeout: Duration,
) {
    let deadline = Instant::now() + timeout;

    while highlights.iter().any(|h| !h.is_ready()) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let key = match completed.recv_timeout(remaining) {
            Ok(key) => key,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!("Highlighting did not finish within {:?}", timeout);
                return;
            }
            Err(RecvTimeoutError::Disconnected) => return,
        };

        for highlight in highlights.iter_mut() {
            if matches!(highlight, Highlight::Pending { key: pending, .. } if *pending == key) {
                if let Some(segments) = pipeline.cached(key) {
                    *highlight = Highlight::Ready(segments);
                }
            }
        }
    }
}
