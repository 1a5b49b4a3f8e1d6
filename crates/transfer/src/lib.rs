//! Chunked file iteration for resumable uploads.
//!
//! A file is walked strictly in order as fixed-size chunks. Each chunk is
//! folded into a running SHA-256, and the digest after each chunk (a
//! checksum over bytes `0..end_of_chunk`) is handed to a caller-supplied
//! step. Iteration can be paused cooperatively between chunks.

mod file;
mod gate;
mod walker;

pub use file::{FileSource, LocalFile};
pub use gate::PauseGate;
pub use walker::ChunkWalker;

/// Granularity the remote resumable-upload protocol requires of chunk
/// sizes: every chunk except the last must be a multiple of 256 KiB.
pub const CHUNK_GRANULARITY: u64 = 262_144;
