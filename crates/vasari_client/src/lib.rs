//! Completion backend implementations for the Vasari generation pipeline.
//!
//! Two [`CompletionBackend`](vasari_interface::CompletionBackend)
//! implementations:
//!
//! - [`HttpCompletion`] — JSON POST against a text-completion HTTP
//!   endpoint.
//! - [`ScriptedCompletion`] — replays canned responses and counts calls,
//!   for tests and offline demos.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod http;
mod scripted;

pub use http::HttpCompletion;
pub use scripted::ScriptedCompletion;
