//! Transcript state: the ordered list of chat entries and the loading
//! placeholder lifecycle.
//!
//! The transcript is plain data. It never suspends; the caller layer owns
//! all awaiting and drives one request cycle as
//! `append_user_message` → `begin_loading` → network → `resolve` /
//! `resolve_with_error`. Placeholder removal is keyed by the returned
//! identifier, never by position, so overlapping cycles interleave safely.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::markdown::{self, MarkupTree};

/// Fallback reply body when the backend returns an empty response.
pub const NO_RESPONSE_FALLBACK: &str = "No response returned.";

/// Uniform bot reply for failed request cycles, whatever the cause.
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Label used for a cited source without one of its own.
pub const DEFAULT_SOURCE_LABEL: &str = "Document";

/// Display budget for a source snippet, in terminal columns.
pub const SNIPPET_MAX_WIDTH: usize = 160;

/// Global counter for generating unique message IDs.
static MESSAGE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a transcript entry.
///
/// IDs are monotonically increasing and unique within a process. Loading
/// placeholders are addressed (and removed) by ID, never by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Generates a new unique message ID.
    pub fn new() -> Self {
        MessageId(MESSAGE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

/// One cited passage attached to a bot reply.
///
/// Stored fields are kept exactly as received; the display accessors
/// produce the normalized forms.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Source {
    /// Document label, e.g. a file name. Absent labels display as
    /// [`DEFAULT_SOURCE_LABEL`].
    pub label: Option<String>,
    /// Index of the retrieved chunk within the document.
    pub chunk_index: Option<u32>,
    /// The cited passage itself.
    pub snippet: Option<String>,
}

impl Source {
    /// Normalized label, with the chunk suffix when an index is present.
    pub fn display_label(&self) -> String {
        let label = self
            .label
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SOURCE_LABEL);
        match self.chunk_index {
            Some(chunk) => format!("{label} (chunk {chunk})"),
            None => label.to_string(),
        }
    }

    /// Trimmed snippet, hard-truncated to [`SNIPPET_MAX_WIDTH`] columns
    /// with a trailing ellipsis. Returns None when there is nothing to show.
    pub fn display_snippet(&self) -> Option<String> {
        let snippet = self.snippet.as_deref()?.trim();
        if snippet.is_empty() {
            return None;
        }
        Some(truncate_with_ellipsis(snippet, SNIPPET_MAX_WIDTH))
    }
}

/// A finalized chat message.
///
/// Immutable once created and owned by the transcript's ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    /// The text as submitted/received, before any rendering.
    pub raw_text: String,
    /// Markup for display. User text is wrapped literally; bot replies go
    /// through the markdown-lite renderer.
    pub rendered: MarkupTree,
    /// Cited passages, present only on bot replies that carried any.
    pub sources: Option<Vec<Source>>,
    pub created_at: DateTime<Utc>,
}

/// A unit in the transcript sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    Message(ChatMessage),
    /// Transient marker for an in-flight request. Removed by ID before the
    /// resolved message is appended, on both success and failure paths.
    Loading {
        id: MessageId,
        started_at: DateTime<Utc>,
    },
}

/// Error for a user submission that is empty after trimming.
///
/// Recoverable: the caller declines to send and leaves the transcript
/// untouched.
#[derive(Debug, PartialEq, Eq)]
pub struct EmptyInputError;

impl std::fmt::Display for EmptyInputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "message text is empty")
    }
}

impl std::error::Error for EmptyInputError {}

/// Ordered sequence of chat entries for one session.
///
/// Insertion order is display order. Instantiated per session; holds no
/// ambient state beyond its own entries.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in display order, loading placeholders included.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Finalized messages in display order.
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter().filter_map(|entry| match entry {
            TranscriptEntry::Message(message) => Some(message),
            TranscriptEntry::Loading { .. } => None,
        })
    }

    /// Returns true if any request cycle is still awaiting resolution.
    pub fn has_pending(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry, TranscriptEntry::Loading { .. }))
    }

    /// Appends a user message with the literal submitted text.
    ///
    /// User-authored text is never run through the markdown renderer.
    ///
    /// # Errors
    /// Returns [`EmptyInputError`] if the text is empty after trimming;
    /// the caller must not issue a network request in that case.
    pub fn append_user_message(&mut self, text: &str) -> Result<&ChatMessage, EmptyInputError> {
        if text.trim().is_empty() {
            return Err(EmptyInputError);
        }
        Ok(self.push_message(ChatMessage {
            id: MessageId::new(),
            role: Role::User,
            raw_text: text.to_string(),
            rendered: MarkupTree::plain(text),
            sources: None,
            created_at: Utc::now(),
        }))
    }

    /// Inserts a loading placeholder at the tail and returns its ID.
    ///
    /// The caller must eventually pass the ID to [`Transcript::resolve`]
    /// or [`Transcript::resolve_with_error`], even when abandoning the
    /// request, or the transient entry leaks.
    pub fn begin_loading(&mut self) -> MessageId {
        let id = MessageId::new();
        self.entries.push(TranscriptEntry::Loading {
            id,
            started_at: Utc::now(),
        });
        id
    }

    /// Completes a request cycle with the backend's reply.
    ///
    /// Removes the placeholder (a no-op if already absent, so duplicate or
    /// late calls stay safe), renders the reply text, and appends the bot
    /// message. A blank reply substitutes [`NO_RESPONSE_FALLBACK`].
    pub fn resolve(
        &mut self,
        placeholder: MessageId,
        reply_text: &str,
        sources: Option<Vec<Source>>,
    ) -> &ChatMessage {
        self.remove_placeholder(placeholder);
        let reply = if reply_text.trim().is_empty() {
            NO_RESPONSE_FALLBACK
        } else {
            reply_text
        };
        self.push_message(ChatMessage {
            id: MessageId::new(),
            role: Role::Bot,
            raw_text: reply.to_string(),
            rendered: markdown::render(reply),
            sources: sources.filter(|s| !s.is_empty()),
            created_at: Utc::now(),
        })
    }

    /// Completes a failed request cycle.
    ///
    /// Network failure, non-success HTTP status, and malformed payloads all
    /// take this path; the transcript shows the same apology for each.
    pub fn resolve_with_error(&mut self, placeholder: MessageId) -> &ChatMessage {
        self.remove_placeholder(placeholder);
        self.push_message(ChatMessage {
            id: MessageId::new(),
            role: Role::Bot,
            raw_text: ERROR_REPLY.to_string(),
            rendered: markdown::render(ERROR_REPLY),
            sources: None,
            created_at: Utc::now(),
        })
    }

    fn remove_placeholder(&mut self, placeholder: MessageId) {
        self.entries
            .retain(|entry| !matches!(entry, TranscriptEntry::Loading { id, .. } if *id == placeholder));
    }

    fn push_message(&mut self, message: ChatMessage) -> &ChatMessage {
        self.entries.push(TranscriptEntry::Message(message));
        match self.entries.last() {
            Some(TranscriptEntry::Message(message)) => message,
            _ => unreachable!("a message was just pushed"),
        }
    }
}

/// Truncates a string to a display width, unicode-aware, appending `…`
/// when anything was cut.
fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut truncated = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width + 1 > max_width {
            break;
        }
        truncated.push(ch);
        used += ch_width;
    }
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{Block, Span};

    #[test]
    fn test_message_ids_unique_and_monotonic() {
        let a = MessageId::new();
        let b = MessageId::new();
        assert_ne!(a, b);
        assert!(a.0 < b.0);
    }

    #[test]
    fn test_append_user_message_stores_literal_text() {
        let mut transcript = Transcript::new();
        let message = transcript.append_user_message("hi **there**").unwrap();
        assert_eq!(message.role, Role::User);
        assert_eq!(message.raw_text, "hi **there**");
        // Literal: the bold marker must not be interpreted.
        assert_eq!(
            message.rendered.blocks[0],
            Block::Paragraph {
                spans: vec![Span::plain("hi **there**")],
            }
        );
    }

    #[test]
    fn test_append_user_message_rejects_blank_text() {
        let mut transcript = Transcript::new();
        assert_eq!(
            transcript.append_user_message("   ").unwrap_err(),
            EmptyInputError
        );
        assert!(transcript.entries().is_empty());
    }

    #[test]
    fn test_begin_loading_inserts_placeholder_at_tail() {
        let mut transcript = Transcript::new();
        transcript.append_user_message("hello").unwrap();
        let id = transcript.begin_loading();
        assert_eq!(transcript.entries().len(), 2);
        assert!(transcript.has_pending());
        assert!(matches!(
            transcript.entries().last(),
            Some(TranscriptEntry::Loading { id: got, .. }) if *got == id
        ));
    }

    #[test]
    fn test_resolve_replaces_placeholder_with_rendered_reply() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_loading();
        let message = transcript.resolve(id, "## Answer\nbody", None);
        assert_eq!(message.role, Role::Bot);
        assert!(matches!(
            message.rendered.blocks[0],
            Block::Heading { .. }
        ));
        assert!(!transcript.has_pending());
        assert_eq!(transcript.entries().len(), 1);
    }

    #[test]
    fn test_resolve_blank_reply_uses_fallback() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_loading();
        let message = transcript.resolve(id, "  ", None);
        assert_eq!(message.raw_text, NO_RESPONSE_FALLBACK);
    }

    #[test]
    fn test_resolve_with_error_appends_apology_without_sources() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_loading();
        let message = transcript.resolve_with_error(id);
        assert_eq!(message.role, Role::Bot);
        assert_eq!(message.raw_text, ERROR_REPLY);
        assert!(message.sources.is_none());
        assert!(!transcript.has_pending());
    }

    #[test]
    fn test_resolve_on_absent_placeholder_is_idempotent_cleanup() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_loading();
        transcript.resolve(id, "first", None);
        // Late duplicate: removal is a no-op, the reply still lands.
        transcript.resolve(id, "second", None);
        assert_eq!(transcript.messages().count(), 2);
        assert!(!transcript.has_pending());
    }

    #[test]
    fn test_interleaved_cycles_resolve_independently() {
        let mut transcript = Transcript::new();
        let first = transcript.begin_loading();
        let second = transcript.begin_loading();
        assert_ne!(first, second);

        // Resolve out of order: each cycle is keyed by its own ID.
        transcript.resolve(second, "second reply", None);
        transcript.resolve_with_error(first);

        assert_eq!(transcript.messages().count(), 2);
        assert!(!transcript.has_pending());
        let raw: Vec<&str> = transcript.messages().map(|m| m.raw_text.as_str()).collect();
        assert_eq!(raw, vec!["second reply", ERROR_REPLY]);
    }

    #[test]
    fn test_resolve_drops_empty_source_list() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_loading();
        let message = transcript.resolve(id, "reply", Some(Vec::new()));
        assert!(message.sources.is_none());
    }

    #[test]
    fn test_source_label_defaults_to_document() {
        let source = Source {
            label: None,
            chunk_index: Some(2),
            snippet: None,
        };
        assert_eq!(source.display_label(), "Document (chunk 2)");
    }

    #[test]
    fn test_source_label_without_chunk_has_no_suffix() {
        let source = Source {
            label: Some("manual.pdf".to_string()),
            chunk_index: None,
            snippet: None,
        };
        assert_eq!(source.display_label(), "manual.pdf");
    }

    #[test]
    fn test_snippet_truncated_to_display_budget() {
        let source = Source {
            label: None,
            chunk_index: Some(2),
            snippet: Some("x".repeat(200)),
        };
        let shown = source.display_snippet().unwrap();
        assert!(shown.ends_with('…'));
        assert_eq!(shown.chars().count(), SNIPPET_MAX_WIDTH);
        // The stored snippet is untouched.
        assert_eq!(source.snippet.as_deref().map(str::len), Some(200));
    }

    #[test]
    fn test_short_snippet_passes_through_trimmed() {
        let source = Source {
            snippet: Some("  quoted passage  ".to_string()),
            ..Source::default()
        };
        assert_eq!(source.display_snippet().as_deref(), Some("quoted passage"));
    }

    #[test]
    fn test_blank_snippet_displays_nothing() {
        let source = Source {
            snippet: Some("   ".to_string()),
            ..Source::default()
        };
        assert_eq!(source.display_snippet(), None);
    }
}
