//! Display core for docq: reply rendering and transcript state.
//!
//! Everything in this crate is UI-agnostic plain data. A presentation
//! layer (the CLI adapter, or any other frontend) maps markup trees and
//! transcript entries onto concrete output.

pub mod markdown;
pub mod transcript;

pub use markdown::{Block, HeadingLevel, MarkupTree, Span, SpanStyle};
pub use transcript::{
    ChatMessage, EmptyInputError, MessageId, Role, Source, Transcript, TranscriptEntry,
};
