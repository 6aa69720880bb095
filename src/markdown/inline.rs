//! Inline run parsing
//!
//! A single left-to-right scan over one paragraph, heading, list item or
//! table cell. Emphasis interiors recurse with the enclosing style as the
//! ambient style, so `_*x*_` composes without global toggles.

use std::sync::OnceLock;

use regex::Regex;

use super::types::{InlineRun, InlineStyle};

/// Parse inline markup into styled runs.
///
/// Never fails; empty input yields a single empty plain run.
pub fn parse_inlines(text: &str) -> Vec<InlineRun> {
    let mut runs = Vec::new();
    parse_into(text, InlineStyle::NONE, &mut runs);
    if runs.is_empty() {
        runs.push(InlineRun::plain(""));
    }
    runs
}

fn parse_into(text: &str, ambient: InlineStyle, out: &mut Vec<InlineRun>) {
    let bytes = text.as_bytes();
    // Styles toggled by `*` / `**` inside this span
    let mut local = InlineStyle::NONE;
    let mut pending = String::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'[' => {
                if let Some(link) = scan_link(text, i) {
                    flush(&mut pending, ambient | local, out);
                    out.push(InlineRun::link(link.label, link.url, ambient | local));
                    i = link.next;
                    continue;
                }
            }
            b'`' => {
                flush(&mut pending, ambient | local, out);
                let rest = &text[i + 1..];
                let (code, next) = match rest.find('`') {
                    Some(end) => (&rest[..end], i + 1 + end + 1),
                    None => (rest, text.len()),
                };
                if !code.is_empty() {
                    out.push(InlineRun::styled(code, ambient | local | InlineStyle::CODE));
                }
                i = next;
                continue;
            }
            b'*' => {
                let (flag, width) = if bytes.get(i + 1) == Some(&b'*') {
                    (InlineStyle::BOLD, 2)
                } else {
                    (InlineStyle::ITALIC, 1)
                };
                let opening = !local.contains(flag);
                let followed_by_space = text[i + width..]
                    .chars()
                    .next()
                    .map_or(true, char::is_whitespace);
                if opening && followed_by_space {
                    pending.push_str(&text[i..i + width]);
                } else {
                    flush(&mut pending, ambient | local, out);
                    local = local.toggle(flag);
                }
                i += width;
                continue;
            }
            b'_' => {
                let width = underscore_run(bytes, i);
                if width <= 2 {
                    if let Some(close) = find_underscore_close(text, i, width) {
                        flush(&mut pending, ambient | local, out);
                        let flag = if width == 1 {
                            InlineStyle::ITALIC
                        } else {
                            InlineStyle::BOLD
                        };
                        parse_into(&text[i + width..close], ambient | local | flag, out);
                        i = close + width;
                        continue;
                    }
                }
                pending.push_str(&text[i..i + width]);
                i += width;
                continue;
            }
            _ => {}
        }

        let ch_len = text[i..].chars().next().map_or(1, char::len_utf8);
        pending.push_str(&text[i..i + ch_len]);
        i += ch_len;
    }

    flush(&mut pending, ambient | local, out);
}

struct LinkSpan<'a> {
    label: &'a str,
    url: &'a str,
    /// Byte index just past the closing `)`
    next: usize,
}

/// Match `[label](url)` starting at `start`, with bracket/paren nesting
fn scan_link(text: &str, start: usize) -> Option<LinkSpan<'_>> {
    let bytes = text.as_bytes();
    let close_bracket = matching(bytes, start, b'[', b']')?;
    if bytes.get(close_bracket + 1) != Some(&b'(') {
        return None;
    }
    let open_paren = close_bracket + 1;
    let close_paren = matching(bytes, open_paren, b'(', b')')?;
    let url = text[open_paren + 1..close_paren].trim();
    if url.is_empty() {
        return None;
    }
    Some(LinkSpan {
        label: &text[start + 1..close_bracket],
        url,
        next: close_paren + 1,
    })
}

/// Index of the delimiter closing the one at `open`
fn matching(bytes: &[u8], open: usize, open_ch: u8, close_ch: u8) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, &b) in bytes.iter().enumerate().skip(open) {
        if b == open_ch {
            depth += 1;
        } else if b == close_ch {
            depth -= 1;
            if depth == 0 {
                return Some(idx);
            }
        }
    }
    None
}

fn underscore_run(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().take_while(|&&b| b == b'_').count()
}

/// Find the closer for an underscore opener of `width` at `open`.
///
/// The opener must sit at text start or after whitespace and be followed by
/// non-whitespace. The closer must be a run of exactly `width`, preceded by
/// non-whitespace, and followed by end of text, whitespace or punctuation.
fn find_underscore_close(text: &str, open: usize, width: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let before = text[..open].chars().next_back();
    if before.is_some_and(|c| !c.is_whitespace()) {
        return None;
    }
    let after = text[open + width..].chars().next()?;
    if after.is_whitespace() {
        return None;
    }

    let mut j = open + width;
    while j < bytes.len() {
        if bytes[j] != b'_' {
            j += 1;
            continue;
        }
        let run = underscore_run(bytes, j);
        let preceded_ok = text[..j].chars().next_back().is_some_and(|c| !c.is_whitespace());
        let followed_ok = text[j + run..]
            .chars()
            .next()
            .map_or(true, |c| c.is_whitespace() || c.is_ascii_punctuation());
        if run == width && j > open + width && preceded_ok && followed_ok {
            return Some(j);
        }
        j += run;
    }
    None
}

/// Emit the pending plain text, splitting out auto-detected URLs
fn flush(pending: &mut String, style: InlineStyle, out: &mut Vec<InlineRun>) {
    if pending.is_empty() {
        return;
    }
    autolink(pending, style, out);
    pending.clear();
}

fn url_regex() -> &'static Regex {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    URL_RE.get_or_init(|| {
        Regex::new(r#"https?://[^\s<>\[\]{}"']+"#).expect("url regex should compile")
    })
}

/// Split `text` into plain runs and Link runs for every URL it contains
pub fn autolink(text: &str, style: InlineStyle, out: &mut Vec<InlineRun>) {
    let mut plain_start = 0;

    for found in url_regex().find_iter(text) {
        let url = trim_url(found.as_str());
        if url.len() <= url.find("://").map_or(0, |p| p + 3) {
            continue;
        }
        if found.start() > plain_start {
            out.push(InlineRun::styled(&text[plain_start..found.start()], style));
        }
        out.push(InlineRun::link(url, url, style));
        plain_start = found.start() + url.len();
    }

    if plain_start < text.len() {
        out.push(InlineRun::styled(&text[plain_start..], style));
    }
}

/// Strip trailing punctuation and unbalanced closing parens from a URL match
fn trim_url(url: &str) -> &str {
    let mut end = url.len();
    while let Some(last) = url[..end].chars().next_back() {
        let candidate = &url[..end];
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | ']' | '}' | '>' | '\'' | '"' => true,
            ')' => candidate.matches('(').count() < candidate.matches(')').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        end -= last.len_utf8();
    }
    &url[..end]
}
