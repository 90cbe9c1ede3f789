//! Markdown-lite rendering for bot replies.
//!
//! This module provides:
//! - `render()`: convert raw reply text into a `MarkupTree`
//! - the markup node types consumed by presentation layers
//!
//! The reply vocabulary is deliberately restricted (headings, bold,
//! bullets, prose), so instead of a full markdown parser the conversion is
//! a fixed sequence of regex passes, each applied to the whole text before
//! the next begins. Unrecognized or malformed syntax passes through as
//! literal text; the function never fails.

use std::sync::LazyLock;

use regex::Regex;

static HEADING3_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^### (.*)$").expect("valid heading pattern"));
static HEADING2_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^## (.*)$").expect("valid heading pattern"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold pattern"));
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-•]\s+(.*)$").expect("valid bullet pattern"));

/// Inline style identifiers (UI-agnostic).
///
/// These are translated to actual terminal styles by the presentation
/// layer. This keeps the rendering core free of terminal dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStyle {
    /// No styling.
    Plain,
    /// Emphasized text (`**bold**`).
    Strong,
}

/// A styled run of inline text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

impl Span {
    /// Creates a plain span.
    pub fn plain(text: impl Into<String>) -> Self {
        Span {
            text: text.into(),
            style: SpanStyle::Plain,
        }
    }

    /// Creates a strong (bold) span.
    pub fn strong(text: impl Into<String>) -> Self {
        Span {
            text: text.into(),
            style: SpanStyle::Strong,
        }
    }
}

/// Heading depth supported by the reply vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    H2,
    H3,
}

/// A block-level node in the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Whole-line heading (`## ` or `### `).
    Heading {
        level: HeadingLevel,
        spans: Vec<Span>,
    },
    /// A run of adjacent bullet lines, one inline sequence per item.
    List { items: Vec<Vec<Span>> },
    /// Blank-line-delimited prose.
    Paragraph { spans: Vec<Span> },
}

/// The structured output of [`render`], consumed by a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkupTree {
    pub blocks: Vec<Block>,
}

impl MarkupTree {
    /// Wraps text in a single plain paragraph without running any passes.
    ///
    /// Used for user-authored entries, which are displayed literally.
    pub fn plain(text: &str) -> Self {
        if text.is_empty() {
            return MarkupTree::default();
        }
        MarkupTree {
            blocks: vec![Block::Paragraph {
                spans: vec![Span::plain(text)],
            }],
        }
    }

    /// Returns true if the tree has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Concatenated text content of every span, ignoring structure.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            let spans = match block {
                Block::Heading { spans, .. } | Block::Paragraph { spans } => spans.as_slice(),
                Block::List { items } => {
                    for item in items {
                        for span in item {
                            out.push_str(&span.text);
                        }
                    }
                    continue;
                }
            };
            for span in spans {
                out.push_str(&span.text);
            }
        }
        out
    }
}

/// A line after the heading pass, inline content still unparsed.
enum HeadedLine<'a> {
    Heading { level: HeadingLevel, text: &'a str },
    Text(&'a str),
}

/// A line after the bold and bullet passes.
enum ClassifiedLine {
    Heading {
        level: HeadingLevel,
        spans: Vec<Span>,
    },
    Item(Vec<Span>),
    Text(Vec<Span>),
}

/// Renders raw reply text into a markup tree.
///
/// Total over arbitrary input: every pass either recognizes its pattern or
/// leaves the text untouched, so there is no failure path.
pub fn render(raw_text: &str) -> MarkupTree {
    let headed = pass_headings(raw_text);
    let classified = pass_inline(headed);
    MarkupTree {
        blocks: pass_cleanup(pass_blocks(classified)),
    }
}

/// Pass 1: whole-line heading detection.
///
/// Anchored matches only, level 3 before level 2 so that `### x` is never
/// claimed by the two-marker pattern and `####x` (no space) stays text.
fn pass_headings(text: &str) -> Vec<HeadedLine<'_>> {
    text.lines()
        .map(|line| {
            if let Some(caps) = HEADING3_RE.captures(line) {
                HeadedLine::Heading {
                    level: HeadingLevel::H3,
                    text: caps.get(1).map_or("", |m| m.as_str()),
                }
            } else if let Some(caps) = HEADING2_RE.captures(line) {
                HeadedLine::Heading {
                    level: HeadingLevel::H2,
                    text: caps.get(1).map_or("", |m| m.as_str()),
                }
            } else {
                HeadedLine::Text(line)
            }
        })
        .collect()
}

/// Passes 2 and 3: bold spans on every line, then bullet classification.
///
/// Bullet markers are recognized on the leading plain text of a line, so a
/// bolded heading or span never splits a visually-adjacent bullet run.
fn pass_inline(lines: Vec<HeadedLine<'_>>) -> Vec<ClassifiedLine> {
    lines
        .into_iter()
        .map(|line| match line {
            HeadedLine::Heading { level, text } => ClassifiedLine::Heading {
                level,
                spans: bold_spans(text),
            },
            HeadedLine::Text(text) => {
                let spans = bold_spans(text);
                match strip_bullet_marker(&spans) {
                    Some(item) => ClassifiedLine::Item(item),
                    None => ClassifiedLine::Text(spans),
                }
            }
        })
        .collect()
}

/// Splits one line of text into plain/strong spans.
///
/// Non-greedy `**...**`: the first closing pair wins. An unmatched opener
/// stays literal.
fn bold_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;
    for caps in BOLD_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            spans.push(Span::plain(&text[last..whole.start()]));
        }
        spans.push(Span::strong(caps.get(1).map_or("", |m| m.as_str())));
        last = whole.end();
    }
    if last < text.len() {
        spans.push(Span::plain(&text[last..]));
    }
    spans
}

/// Returns the item content if the line's leading plain text carries a
/// bullet marker (`-` or `•` plus whitespace).
fn strip_bullet_marker(spans: &[Span]) -> Option<Vec<Span>> {
    let first = spans.first()?;
    if first.style != SpanStyle::Plain {
        return None;
    }
    let caps = BULLET_RE.captures(&first.text)?;
    let rest = caps.get(1).map_or("", |m| m.as_str());

    let mut item = Vec::new();
    if !rest.is_empty() {
        item.push(Span::plain(rest));
    }
    item.extend(spans[1..].iter().cloned());
    Some(item)
}

/// Pass 4: group classified lines into block containers.
///
/// Adjacent items collapse into one list; text lines accumulate into a
/// paragraph until an empty line, a heading, or an item ends it.
fn pass_blocks(lines: Vec<ClassifiedLine>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<Span> = Vec::new();
    let mut items: Vec<Vec<Span>> = Vec::new();

    for line in lines {
        match line {
            ClassifiedLine::Heading { level, spans } => {
                flush_items(&mut blocks, &mut items);
                flush_paragraph(&mut blocks, &mut paragraph);
                blocks.push(Block::Heading { level, spans });
            }
            ClassifiedLine::Item(spans) => {
                flush_paragraph(&mut blocks, &mut paragraph);
                items.push(spans);
            }
            ClassifiedLine::Text(spans) => {
                flush_items(&mut blocks, &mut items);
                if line_text_is_empty(&spans) {
                    flush_paragraph(&mut blocks, &mut paragraph);
                } else {
                    if !paragraph.is_empty() {
                        push_merged(&mut paragraph, Span::plain("\n"));
                    }
                    for span in spans {
                        push_merged(&mut paragraph, span);
                    }
                }
            }
        }
    }
    flush_items(&mut blocks, &mut items);
    flush_paragraph(&mut blocks, &mut paragraph);
    blocks
}

/// Pass 5: drop paragraph containers with no visible content.
///
/// Headings and lists are top-level blocks by construction, so the only
/// cleanup left is whitespace-only paragraphs.
fn pass_cleanup(blocks: Vec<Block>) -> Vec<Block> {
    blocks
        .into_iter()
        .filter(|block| match block {
            Block::Paragraph { spans } => spans.iter().any(|s| !s.text.trim().is_empty()),
            Block::Heading { .. } | Block::List { .. } => true,
        })
        .collect()
}

fn flush_paragraph(blocks: &mut Vec<Block>, paragraph: &mut Vec<Span>) {
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph {
            spans: std::mem::take(paragraph),
        });
    }
}

fn flush_items(blocks: &mut Vec<Block>, items: &mut Vec<Vec<Span>>) {
    if !items.is_empty() {
        blocks.push(Block::List {
            items: std::mem::take(items),
        });
    }
}

fn line_text_is_empty(spans: &[Span]) -> bool {
    spans.iter().all(|s| s.text.is_empty())
}

/// Appends a span, merging into the previous one when styles match.
fn push_merged(spans: &mut Vec<Span>, span: Span) {
    if span.text.is_empty() {
        return;
    }
    if let Some(last) = spans.last_mut() {
        if last.style == span.style {
            last.text.push_str(&span.text);
            return;
        }
    }
    spans.push(span);
}
