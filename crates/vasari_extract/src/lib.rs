//! Structured response extraction for the Vasari generation pipeline.
//!
//! Completion responses often contain JSON wrapped in markdown code blocks
//! or mixed with explanatory prose, and long generations are sometimes cut
//! off mid-stream. This crate recovers a schema-validated record from such
//! text, or fails with a specific, retry-classifiable error.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod extraction;

pub use extraction::extract_record;
