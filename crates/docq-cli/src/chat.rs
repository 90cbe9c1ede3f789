//! Interactive chat loop.
//!
//! This is the caller layer around the display core: it owns stdin, the
//! network, and the awaiting. Each turn drives one request cycle,
//! `append_user_message` → `begin_loading` → request →
//! `resolve`/`resolve_with_error`, and prints whatever the transcript
//! gained since the last turn.

use std::io::{self, BufRead};

use anyhow::Result;
use docq_core::api::ApiClient;
use docq_core::api::types::SourcePayload;
use docq_core::config::Config;
use docq_ui::{Source, Transcript, TranscriptEntry};

use crate::render;

const QUIT_COMMAND: &str = ":q";

pub async fn run(config: &Config) -> Result<()> {
    let client = ApiClient::from_config(config)?;

    render::print_welcome();
    print_backend_banner(&client).await;

    let mut transcript = Transcript::new();
    let mut printed = 0;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        render::print_prompt()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let input = line.trim();
        if input == QUIT_COMMAND {
            break;
        }

        if transcript.append_user_message(input).is_err() {
            // Blank input: nothing is sent.
            continue;
        }
        flush_new(&transcript, &mut printed);

        let placeholder = transcript.begin_loading();
        render::print_thinking();

        match client.chat(input, config.use_rag).await {
            Ok(reply) => {
                let sources = reply
                    .sources
                    .map(|sources| sources.into_iter().map(to_source).collect());
                let text = reply.response.unwrap_or_default();
                transcript.resolve(placeholder, &text, sources);
            }
            Err(err) => {
                tracing::warn!(kind = %err.kind, "chat request failed: {err}");
                transcript.resolve_with_error(placeholder);
            }
        }
        flush_new(&transcript, &mut printed);
    }

    render::print_goodbye();
    Ok(())
}

/// Health first, then the chunk count. Neither failure is fatal; the
/// session just starts with an offline note.
async fn print_backend_banner(client: &ApiClient) {
    match client.health().await {
        Ok(report) if report.is_healthy() => {
            let documents = match client.document_count().await {
                Ok(count) => Some(count),
                Err(err) => {
                    tracing::warn!(kind = %err.kind, "document count failed: {err}");
                    None
                }
            };
            render::print_status_online(&report.model, documents);
        }
        Ok(report) => {
            tracing::warn!(status = %report.status, "backend reports unhealthy");
            render::print_status_offline();
        }
        Err(err) => {
            tracing::warn!(kind = %err.kind, "health check failed: {err}");
            render::print_status_offline();
        }
    }
}

/// Prints messages appended since the last call.
///
/// Only called at points where no placeholder is pending, so entry
/// indices are stable between calls.
fn flush_new(transcript: &Transcript, printed: &mut usize) {
    let entries = transcript.entries();
    let start = (*printed).min(entries.len());
    for entry in &entries[start..] {
        if let TranscriptEntry::Message(message) = entry {
            render::print_message(message);
        }
    }
    *printed = entries.len();
}

fn to_source(payload: SourcePayload) -> Source {
    Source {
        label: payload.source,
        chunk_index: payload.chunk,
        snippet: payload.text,
    }
}
