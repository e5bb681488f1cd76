//! Keyed store implementations for the Vasari generation pipeline.
//!
//! Two [`StageStore`](vasari_interface::StageStore) backends:
//!
//! - [`MemoryStore`] — in-process map with TTL expiry, for tests and
//!   single-shot runs.
//! - [`FileStore`] — one JSON envelope file per key with wall-clock TTL
//!   stamps, so interrupted runs resume across processes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod memory;

pub use filesystem::FileStore;
pub use memory::MemoryStore;
