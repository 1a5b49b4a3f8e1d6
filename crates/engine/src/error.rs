use chunklift_store::StoreError;

use crate::transport::{HttpResponse, TransportError};

/// Errors produced by the upload engine.
///
/// `DifferentChunk` is an internal reconciliation signal: the engine
/// catches it exactly once, clears persisted progress, and restarts the
/// upload from scratch, so callers of [`Upload::start`](crate::Upload::start)
/// never observe it. Every other kind is a terminal outcome of the call
/// that raised it.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("missing required option: {0}")]
    MissingOptions(&'static str),

    #[error("invalid chunk size {0}: must be a positive multiple of 262144")]
    InvalidChunkSize(u64),

    #[error("upload has already finished")]
    AlreadyFinished,

    #[error("chunk {index} differs from the previous attempt")]
    DifferentChunk {
        index: u64,
        expected: String,
        actual: String,
    },

    #[error("server reports the upload as incomplete")]
    UploadIncomplete,

    #[error("file has already been uploaded in full")]
    FileAlreadyUploaded,

    #[error("upload URL not found")]
    UrlNotFound,

    #[error("upload failed with status {status}")]
    UploadFailed { status: u16 },

    #[error("unexpected response status {}", response.status)]
    UnknownResponse { response: HttpResponse },

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Whether re-invoking `start()` on the same engine configuration is a
    /// reasonable recovery. True for server-side failures (5xx) and
    /// network-level transport errors; everything else needs caller
    /// intervention first (e.g. a fresh upload URL).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            UploadError::UploadFailed { .. } | UploadError::Transport(_)
        )
    }
}
