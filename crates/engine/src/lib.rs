//! Client-side engine for resumable uploads to object storage.
//!
//! A file is sent as a sequence of contiguous byte-range PUTs against one
//! upload URL. Progress (a prefix checksum per acknowledged chunk) is
//! persisted locally, and on a later `start()` the engine reconciles that
//! local record against the server's received-byte offset before resuming:
//! it validates the overlap chunk by chunk and restarts from scratch if the
//! file has changed since the previous attempt.
//!
//! ```no_run
//! use chunklift_engine::Upload;
//! use chunklift_transfer::LocalFile;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let file = LocalFile::open("/tmp/big.bin").await?;
//! let upload = Upload::builder()
//!     .id("backup-2026-08")
//!     .url("https://storage.example.com/upload/session-url")
//!     .file(file)
//!     .build()?;
//! let response = upload.start().await?;
//! assert_eq!(response.status, 200);
//! # Ok(())
//! # }
//! ```

mod error;
mod progress;
mod response;
mod transport;
mod upload;

pub use error::UploadError;
pub use progress::{ChunkProgress, ProgressCallback};
pub use transport::{HttpResponse, HttpTransport, Transport, TransportError};
pub use upload::{DEFAULT_CHUNK_SIZE, Upload, UploadBuilder};

pub use chunklift_store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use chunklift_transfer::{CHUNK_GRANULARITY, FileSource, LocalFile};
