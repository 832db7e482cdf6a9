//! BBCode to GitHub-flavored Markdown conversion.
//!
//! The converter applies an ordered sequence of rewrite passes over the full
//! text; each pass sees the cumulative output of the passes before it. Only
//! Markdown is emitted, no HTML. Tags with no Markdown rendering are
//! silently stripped, unrecognized tags pass through unchanged, and
//! malformed tags are left as literal text. Nesting beyond a single level is
//! not reconstructed; nested lists flatten.
//!
//! Tag treatment:
//!
//! | BBCode | Markdown |
//! |---|---|
//! | `[b]text[/b]` | `***text***` |
//! | `[i]text[/i]` | `**text**` |
//! | `[u]`, `[color=]`, `[highlight=]`, `[sup]`, `[sub]`, `[left]`, `[center]`, `[right]`, `[justify]` | stripped, content kept |
//! | `[size=125]` alone on its own line | `# ` heading; every other size tag is stripped |
//! | `[list]` / `[list=n]` with `[*]` items | `* item` / `n. item` lines |
//! | `[code]` / `[code=lang]` | fenced block when the closing tag ends a line, inline span otherwise |
//! | `[quote]` / `[quote=author]` on its own lines | `> ` blockquote, attributed when an author is given |
//! | `[hr]`, `[url=]`, `[email=]`, `[img]` | recognized, currently passed through unchanged |
//!
//! The bold/italic weighting (three markers for bold, two for italic)
//! matches what readers of the migrated tickets saw before, so it is kept
//! even though plain Markdown convention would use fewer markers.

mod scanner;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use scanner::OpenTag;

/// Size attribute that marks heading-sized text.
const HEADING_SIZE: &str = "125";

/// Tags with no Markdown equivalent: delimiters removed, content kept.
const STRIPPED_TAGS: [&str; 9] = [
    "u", "color", "highlight", "sup", "sub", "left", "center", "right", "justify",
];

static STRIP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    STRIPPED_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?i)\[{tag}.*?\](.*?)\[/{tag}\]")).expect("valid strip pattern")
        })
        .collect()
});

static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[b\](.*?)\[/b\]").expect("valid bold pattern"));

static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[i\](.*?)\[/i\]").expect("valid italic pattern"));

static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\n\[size\s*=\s*{HEADING_SIZE}\](.*?)\[/size\]\n"
    ))
    .expect("valid heading pattern")
});

static SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[size.*?\](.*?)\[/size\]").expect("valid size pattern"));

/// Converts BBCode text to GitHub-flavored Markdown.
///
/// Conversion is a pure function of the input text plus the optional
/// username map consulted for quote attributions: no I/O, no shared state,
/// byte-identical output for identical input. It never fails; any string is
/// valid input.
#[derive(Debug, Clone, Default)]
pub struct BbcodeConverter {
    username_map: HashMap<String, String>,
}

impl BbcodeConverter {
    /// Converter with no username translation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Converter that translates quote authors through `username_map`.
    #[must_use]
    pub fn with_username_map(username_map: HashMap<String, String>) -> Self {
        Self { username_map }
    }

    /// Convert `text` to Markdown.
    ///
    /// Pass order is load-bearing: emphasis tags must be gone before the
    /// list, code, and quote passes scan the text, and the heading form of
    /// `[size]` runs before the catch-all size strip.
    #[must_use]
    pub fn convert(&self, text: &str) -> String {
        let text = strip_unsupported(text);
        let text = BOLD.replace_all(&text, "***${1}***").into_owned();
        let text = ITALIC.replace_all(&text, "**${1}**").into_owned();
        let text = headings(&text);
        let text = lists(&text);
        let text = code_spans(&text);
        // hr, url, email, and img are recognized Markdown targets but have
        // no rewrite yet; they pass through unchanged.
        self.quotes(&text)
    }

    /// Rewrite `[quote]` regions isolated on their own lines as blockquotes.
    /// Inline quote tags are left as literal text.
    fn quotes(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        while let Some(open) = scanner::find_open(text, "quote", pos) {
            out.push_str(&text[pos..open.start]);
            if let Some((content, end)) = isolated_quote_region(text, &open) {
                if let Some(author) = open.attr_value().filter(|value| !value.is_empty()) {
                    out.push_str(&format!("> **{} wrote:**\n", self.author_name(author)));
                }
                for line in content.split('\n') {
                    out.push_str("> ");
                    out.push_str(line);
                    out.push('\n');
                }
                pos = end;
            } else {
                out.push_str(&text[open.start..open.end]);
                pos = open.end;
            }
        }
        out.push_str(&text[pos..]);
        out
    }

    /// Attribution name for a quote author, translated through the username
    /// map when a non-empty mapping exists.
    fn author_name(&self, author: &str) -> String {
        match self.username_map.get(author) {
            Some(mapped) if !mapped.is_empty() => format!("@{mapped}"),
            _ => author.to_string(),
        }
    }
}

/// Remove tags that have no Markdown rendering, keeping their content.
/// Content must sit on a single line; spans with embedded line breaks are
/// left alone.
fn strip_unsupported(text: &str) -> String {
    let mut text = text.to_string();
    for pattern in STRIP_PATTERNS.iter() {
        text = pattern.replace_all(&text, "${1}").into_owned();
    }
    text
}

/// `[size=125]` standalone on its own line becomes an H1; every other size
/// tag is stripped with its content kept unstyled.
fn headings(text: &str) -> String {
    let text = HEADING.replace_all(text, "\n# ${1}\n");
    SIZE.replace_all(&text, "${1}").into_owned()
}

/// Rewrite `[list=n]` regions as numbered lines, then `[list]` regions as
/// bulleted lines. The textually first opening tag pairs with the nearest
/// closing tag, so nested lists flatten.
fn lists(text: &str) -> String {
    let text = ordered_lists(text);
    unordered_lists(&text)
}

fn ordered_lists(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(open) = scanner::find_open(text, "list", pos) {
        out.push_str(&text[pos..open.start]);
        match (ordered_start(&open), scanner::find_close(text, "list", open.end)) {
            (Some(start), Some(close)) => {
                let (_, items) = split_items(&text[open.end..close.start]);
                let mut number = start;
                for item in items {
                    out.push_str(&format!("{number}. {item}\n"));
                    number = number.saturating_add(1);
                }
                pos = close.end;
            }
            _ => {
                out.push_str(&text[open.start..open.end]);
                pos = open.end;
            }
        }
    }
    out.push_str(&text[pos..]);
    out
}

fn unordered_lists(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(open) = scanner::find_open(text, "list", pos) {
        out.push_str(&text[pos..open.start]);
        if let Some(close) = scanner::find_close(text, "list", open.end) {
            let (before, items) = split_items(&text[open.end..close.start]);
            out.push_str(before);
            for item in items {
                out.push_str(&format!("* {item}\n"));
            }
            pos = close.end;
        } else {
            out.push_str(&text[open.start..open.end]);
            pos = open.end;
        }
    }
    out.push_str(&text[pos..]);
    out
}

/// Parse the starting number of an ordered list opening, e.g. `[list=3]`.
/// Anything other than `=` followed by digits is not an ordered list.
fn ordered_start(open: &OpenTag<'_>) -> Option<u64> {
    let digits = open.raw_attr.trim_start().strip_prefix('=')?.trim_start();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Split list-region content at `[*]` markers. Returns the text before the
/// first marker and the trimmed item texts. An item runs to the next marker
/// or the end of the region; items are assumed not to contain line breaks.
fn split_items(content: &str) -> (&str, Vec<&str>) {
    let mut parts = content.split("[*]");
    let before = parts.next().unwrap_or_default();
    (before, parts.map(str::trim).collect())
}

/// Rewrite `[code]` regions. A region whose closing tag ends its line is a
/// fenced block; anything else is an inline span. The language attribute is
/// ignored.
fn code_spans(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(open) = scanner::find_open(text, "code", pos) {
        out.push_str(&text[pos..open.start]);
        if let Some(close) = scanner::find_close(text, "code", open.end) {
            let content = &text[open.end..close.start];
            if text[close.end..].starts_with('\n') {
                out.push_str("```");
                out.push_str(content);
                out.push_str("```\n");
                pos = close.end + 1;
            } else {
                out.push('`');
                out.push_str(content);
                out.push('`');
                pos = close.end;
            }
        } else {
            out.push_str(&text[open.start..open.end]);
            pos = open.end;
        }
    }
    out.push_str(&text[pos..]);
    out
}

/// Locate the content of a quote region whose opening tag ends its line and
/// whose closing tag sits alone between line breaks. Returns the content
/// (without the surrounding newlines) and the offset one past the newline
/// that follows the closing tag.
fn isolated_quote_region<'a>(text: &'a str, open: &OpenTag<'_>) -> Option<(&'a str, usize)> {
    if !text[open.end..].starts_with('\n') {
        return None;
    }
    let mut from = open.end + 1;
    while let Some(close) = scanner::find_close(text, "quote", from) {
        // The newline before the closing tag must not be the one that ends
        // the opening tag's line.
        let preceded = close.start > open.end + 1 && text.as_bytes()[close.start - 1] == b'\n';
        let followed = text[close.end..].starts_with('\n');
        if preceded && followed {
            return Some((&text[open.end + 1..close.start - 1], close.end + 1));
        }
        from = close.end;
    }
    None
}
