use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chunklift_store::{
    DEFAULT_NAMESPACE, KeyValueStore, MemoryStore, ProgressRecord, ProgressStore,
};
use chunklift_transfer::{CHUNK_GRANULARITY, ChunkWalker, FileSource, PauseGate};
use tracing::{debug, info, warn};

use crate::error::UploadError;
use crate::progress::{ChunkProgress, ProgressCallback};
use crate::response::{check_response, parse_last_byte};
use crate::transport::{HttpResponse, HttpTransport, Transport};

/// Default chunk size: 2 MiB (8 × the protocol granularity).
pub const DEFAULT_CHUNK_SIZE: u64 = 8 * CHUNK_GRANULARITY;

/// Statuses accepted for a chunk PUT.
const CHUNK_ALLOWED: &[u16] = &[200, 201, 308];
/// Statuses accepted for the received-bytes probe.
const PROBE_ALLOWED: &[u16] = &[308];

/// A single resumable upload: one file, one destination URL, one id.
///
/// Constructed via [`Upload::builder`]. `start()` drives the upload to
/// completion; `pause()`/`unpause()` gate it at chunk boundaries;
/// `cancel()` stops it and discards persisted progress. One engine instance
/// per id at a time — concurrent engines on the same id are the caller's
/// bug and are not guarded against.
pub struct Upload {
    id: String,
    url: String,
    file: Arc<dyn FileSource>,
    chunk_size: u64,
    content_type: String,
    transport: Arc<dyn Transport>,
    progress: ProgressStore,
    on_chunk_upload: Option<ProgressCallback>,
    gate: PauseGate,
    finished: AtomicBool,
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("chunk_size", &self.chunk_size)
            .field("content_type", &self.content_type)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl Upload {
    /// Starts building an upload.
    pub fn builder() -> UploadBuilder {
        UploadBuilder::new()
    }

    /// Runs the upload to completion and returns the final response.
    ///
    /// If a progress record from a previous attempt matches this
    /// configuration, the engine probes the server for its received-byte
    /// offset, resumes from the lesser of the local and remote positions
    /// after re-validating the overlap, and restarts from scratch when the
    /// overlap has diverged. On success the record is cleared and the
    /// engine is finished; a second `start()` fails with
    /// [`UploadError::AlreadyFinished`] without touching the network.
    pub async fn start(&self) -> Result<HttpResponse, UploadError> {
        if self.finished.load(Ordering::SeqCst) {
            return Err(UploadError::AlreadyFinished);
        }

        let record = self
            .progress
            .read(&self.id, self.chunk_size, self.file.size())?;
        let resumable = record.started
            && record.chunk_size == self.chunk_size
            && record.file_size == self.file.size();

        let response = if resumable {
            info!(id = %self.id, chunks = record.resume_index(), "previous progress found, resuming");
            match self.resume(record).await {
                Ok(response) => response,
                Err(UploadError::DifferentChunk { index, .. }) => {
                    warn!(id = %self.id, index, "file diverged from previous attempt, restarting");
                    self.upload_from_scratch().await?
                }
                Err(e) => return Err(e),
            }
        } else {
            debug!(id = %self.id, "no usable previous progress, uploading from scratch");
            self.upload_from_scratch().await?
        };

        self.progress.clear(&self.id)?;
        self.finished.store(true, Ordering::SeqCst);
        info!(id = %self.id, status = response.status, "upload finished");
        Ok(response)
    }

    /// Pauses the upload at the next chunk boundary. An in-flight chunk
    /// request is not interrupted.
    pub fn pause(&self) {
        debug!(id = %self.id, "pause requested");
        self.gate.pause();
    }

    /// Resumes a paused upload.
    pub fn unpause(&self) {
        debug!(id = %self.id, "unpause requested");
        self.gate.unpause();
    }

    /// Stops the upload before the next chunk and deletes its persisted
    /// progress. An in-flight chunk request is not aborted, so the remote
    /// endpoint may retain bytes the local record no longer reflects.
    pub fn cancel(&self) -> Result<(), UploadError> {
        self.gate.pause();
        self.progress.clear(&self.id)?;
        info!(id = %self.id, "upload cancelled");
        Ok(())
    }

    /// Whether a previous `start()` completed successfully.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Uploads the whole file with a fresh record and checksum prefix.
    async fn upload_from_scratch(&self) -> Result<HttpResponse, UploadError> {
        let mut record = ProgressRecord::new(self.chunk_size, self.file.size());
        let mut walker = ChunkWalker::new(self.file.as_ref(), self.chunk_size, self.gate.clone());
        self.upload_range(&mut walker, &mut record, 0).await
    }

    /// Reconciles local and remote progress, validates the overlap, and
    /// uploads the remainder.
    async fn resume(&self, mut record: ProgressRecord) -> Result<HttpResponse, UploadError> {
        let local_index = record.resume_index();
        let remote_index = self.remote_resume_index().await?;
        let resume_index = local_index.min(remote_index);
        debug!(local_index, remote_index, resume_index, "reconciled resume point");

        let mut walker = ChunkWalker::new(self.file.as_ref(), self.chunk_size, self.gate.clone());
        self.validate_prefix(&mut walker, &record, resume_index)
            .await?;
        self.upload_range(&mut walker, &mut record, resume_index)
            .await
    }

    /// Probes the server for its received-byte offset and converts it to a
    /// chunk index.
    async fn remote_resume_index(&self) -> Result<u64, UploadError> {
        let headers = vec![(
            "Content-Range".to_string(),
            format!("bytes */{}", self.file.size()),
        )];
        let response = self.transport.put(&self.url, Vec::new(), &headers).await?;
        check_response(&response, PROBE_ALLOWED)?;

        match response.header("range").and_then(parse_last_byte) {
            Some(last_byte) => Ok((last_byte + 1) / self.chunk_size),
            None => {
                warn!(id = %self.id, "probe response has no parseable range header");
                Err(UploadError::UnknownResponse { response })
            }
        }
    }

    /// Re-computes prefix checksums for chunks `[0, end)` and compares them
    /// to the record. On the first mismatch the record is cleared and
    /// [`UploadError::DifferentChunk`] is raised.
    async fn validate_prefix(
        &self,
        walker: &mut ChunkWalker<'_>,
        record: &ProgressRecord,
        end: u64,
    ) -> Result<(), UploadError> {
        walker
            .run(
                async |index: u64, checksum: &str, _data: &[u8]| -> Result<bool, UploadError> {
                    let expected = record.checksum_at(index).unwrap_or_default();
                    if expected != checksum {
                        self.progress.clear(&self.id)?;
                        return Err(UploadError::DifferentChunk {
                            index,
                            expected: expected.to_string(),
                            actual: checksum.to_string(),
                        });
                    }
                    debug!(index, "chunk validated against previous attempt");
                    Ok(true)
                },
                0,
                Some(end),
            )
            .await
    }

    /// Uploads chunks `[start, total)`, persisting each accepted chunk's
    /// checksum and reporting progress. Returns the last response.
    async fn upload_range(
        &self,
        walker: &mut ChunkWalker<'_>,
        record: &mut ProgressRecord,
        start: u64,
    ) -> Result<HttpResponse, UploadError> {
        let total_bytes = self.file.size();
        let mut last: Option<HttpResponse> = None;

        walker
            .run(
                async |index: u64, checksum: &str, data: &[u8]| -> Result<bool, UploadError> {
                    let begin = index * self.chunk_size;
                    let end = begin + data.len() as u64 - 1;
                    let headers = vec![
                        ("Content-Type".to_string(), self.content_type.clone()),
                        (
                            "Content-Range".to_string(),
                            format!("bytes {begin}-{end}/{total_bytes}"),
                        ),
                    ];

                    let response = self.transport.put(&self.url, data.to_vec(), &headers).await?;
                    check_response(&response, CHUNK_ALLOWED)?;

                    record.add_checksum(index as usize, checksum.to_string());
                    self.progress.write(&self.id, record)?;
                    debug!(index, status = response.status, "chunk accepted");

                    if let Some(callback) = &self.on_chunk_upload {
                        callback(ChunkProgress {
                            total_bytes,
                            uploaded_bytes: end + 1,
                            chunk_index: index,
                            chunk_length: data.len() as u64,
                        });
                    }

                    last = Some(response);
                    Ok(true)
                },
                start,
                None,
            )
            .await?;

        // A run that sent nothing (zero-length file) has no response to
        // confirm completion with.
        last.ok_or(UploadError::UploadIncomplete)
    }
}

/// Builder for [`Upload`].
pub struct UploadBuilder {
    id: Option<String>,
    url: Option<String>,
    file: Option<Arc<dyn FileSource>>,
    chunk_size: u64,
    force_chunk_size: bool,
    storage: Option<Arc<dyn KeyValueStore>>,
    namespace: String,
    content_type: String,
    transport: Option<Arc<dyn Transport>>,
    on_chunk_upload: Option<ProgressCallback>,
}

impl UploadBuilder {
    fn new() -> Self {
        Self {
            id: None,
            url: None,
            file: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            force_chunk_size: false,
            storage: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            content_type: "application/octet-stream".to_string(),
            transport: None,
            on_chunk_upload: None,
        }
    }

    /// Upload id, the key progress is persisted under. Required.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Ready-to-use destination URL for the upload session. Required.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Source of the bytes to upload. Required.
    pub fn file(mut self, file: impl FileSource + 'static) -> Self {
        self.file = Some(Arc::new(file));
        self
    }

    /// Chunk size in bytes. Must be a positive multiple of
    /// [`CHUNK_GRANULARITY`] unless [`force_chunk_size`](Self::force_chunk_size)
    /// is set. Defaults to [`DEFAULT_CHUNK_SIZE`].
    pub fn chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Accept a chunk size that is not a multiple of the protocol
    /// granularity. It must still be positive.
    pub fn force_chunk_size(mut self, force: bool) -> Self {
        self.force_chunk_size = force;
        self
    }

    /// Storage backend for progress records. Defaults to an in-memory
    /// store; pass a [`chunklift_store::JsonFileStore`] for progress that
    /// survives a process restart.
    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Key namespace for progress records.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Content type sent with each chunk. Defaults to
    /// `application/octet-stream`.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Transport used for PUTs. Defaults to [`HttpTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Callback invoked after each accepted chunk.
    pub fn on_chunk_upload(
        mut self,
        callback: impl Fn(ChunkProgress) + Send + Sync + 'static,
    ) -> Self {
        self.on_chunk_upload = Some(Box::new(callback));
        self
    }

    /// Validates the configuration and builds the engine.
    pub fn build(self) -> Result<Upload, UploadError> {
        let id = self.id.ok_or(UploadError::MissingOptions("id"))?;
        let url = self.url.ok_or(UploadError::MissingOptions("url"))?;
        let file = self.file.ok_or(UploadError::MissingOptions("file"))?;

        if self.chunk_size == 0
            || (!self.force_chunk_size && self.chunk_size % CHUNK_GRANULARITY != 0)
        {
            return Err(UploadError::InvalidChunkSize(self.chunk_size));
        }

        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new()));

        Ok(Upload {
            id,
            url,
            file,
            chunk_size: self.chunk_size,
            content_type: self.content_type,
            transport,
            progress: ProgressStore::new(storage, self.namespace),
            on_chunk_upload: self.on_chunk_upload,
            gate: PauseGate::new(),
            finished: AtomicBool::new(false),
        })
    }
}
