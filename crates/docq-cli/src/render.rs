//! Terminal presentation adapter.
//!
//! Maps markup trees and transcript entries onto ANSI output via
//! crossterm. All styling decisions live here; the display core stays
//! terminal-agnostic.

use std::fmt::Write as _;
use std::io::{self, Write};

use crossterm::style::Stylize;
use docq_ui::{Block, ChatMessage, HeadingLevel, MarkupTree, Role, Source, Span, SpanStyle};

pub fn print_welcome() {
    println!("{}", "docq chat".bold());
    println!("{}", "Type a question, :q to quit.".dim());
}

pub fn print_status_online(model: &str, documents: Option<u64>) {
    match documents {
        Some(count) => println!("{} {model} · {count} document chunks", "online".green()),
        None => println!("{} {model}", "online".green()),
    }
    println!();
}

pub fn print_status_offline() {
    println!("{} backend not reachable", "offline".red());
    println!();
}

pub fn print_prompt() -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{} ", ">".bold())?;
    stdout.flush()
}

pub fn print_thinking() {
    println!("{}", "… thinking".dim());
}

pub fn print_goodbye() {
    println!("Goodbye!");
}

pub fn print_message(message: &ChatMessage) {
    match message.role {
        Role::User => println!("{} {}", "you".dim(), message.raw_text),
        Role::Bot => print_bot(message),
    }
}

fn print_bot(message: &ChatMessage) {
    print_markup(&message.rendered);
    if let Some(sources) = &message.sources {
        print_sources(sources);
    }
    println!();
}

fn print_markup(tree: &MarkupTree) {
    for block in &tree.blocks {
        match block {
            Block::Heading { level, spans } => {
                let text = plain_text_of(spans);
                match level {
                    HeadingLevel::H2 => println!("{}", text.as_str().bold().underlined()),
                    HeadingLevel::H3 => println!("{}", text.as_str().bold()),
                }
            }
            Block::List { items } => {
                for item in items {
                    println!("  {} {}", "•".dim(), styled_line(item));
                }
            }
            Block::Paragraph { spans } => {
                println!("{}", styled_line(spans));
            }
        }
    }
}

/// Joins one inline sequence into a string with ANSI styling applied.
fn styled_line(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span.style {
            SpanStyle::Plain => out.push_str(&span.text),
            SpanStyle::Strong => {
                let _ = write!(out, "{}", span.text.as_str().bold());
            }
        }
    }
    out
}

fn plain_text_of(spans: &[Span]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

fn print_sources(sources: &[Source]) {
    println!("{}", "Sources:".dim());
    for (index, source) in sources.iter().enumerate() {
        let line = format!("  {}. {}", index + 1, source.display_label());
        println!("{}", line.dim());
        if let Some(snippet) = source.display_snippet() {
            println!("{}", format!("     {snippet}").dim().italic());
        }
    }
}
