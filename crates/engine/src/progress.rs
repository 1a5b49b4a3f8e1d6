/// Per-chunk progress event, emitted after the remote endpoint accepts a
/// chunk and its checksum is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkProgress {
    /// Total size of the file in bytes.
    pub total_bytes: u64,
    /// Bytes confirmed uploaded, i.e. the end of the accepted chunk.
    pub uploaded_bytes: u64,
    /// Index of the accepted chunk.
    pub chunk_index: u64,
    /// Length of the accepted chunk in bytes.
    pub chunk_length: u64,
}

/// Callback invoked with per-chunk progress. Delivery is best-effort and
/// not part of the error contract.
pub type ProgressCallback = Box<dyn Fn(ChunkProgress) + Send + Sync>;
