use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{FileSource, PauseGate};

/// Walks a file as fixed-size chunks, strictly in increasing order,
/// feeding each chunk into a running SHA-256.
///
/// The hasher is walker state: successive [`run`](Self::run) calls on one
/// walker extend the same prefix, so a validation pass over `[0, n)`
/// followed by an upload pass over `[n, total)` produces checksums that are
/// always digests of bytes `0..end_of_chunk`. Start a fresh walker to start
/// a fresh prefix.
///
/// The per-chunk checksum is taken by cloning the running hasher and
/// finalizing the clone, so the accumulator keeps absorbing later chunks.
pub struct ChunkWalker<'a> {
    file: &'a dyn FileSource,
    chunk_size: u64,
    gate: PauseGate,
    hasher: Sha256,
}

impl<'a> ChunkWalker<'a> {
    /// Creates a walker over `file` with the given chunk size (bytes, > 0).
    pub fn new(file: &'a dyn FileSource, chunk_size: u64, gate: PauseGate) -> Self {
        debug_assert!(chunk_size > 0);
        Self {
            file,
            chunk_size,
            gate,
            hasher: Sha256::new(),
        }
    }

    /// Number of chunks in the file; the final chunk may be short.
    pub fn total_chunks(&self) -> u64 {
        self.file.size().div_ceil(self.chunk_size)
    }

    /// Iterates chunk indices `[start, end)` (capped at
    /// [`total_chunks`](Self::total_chunks); `None` means to the end),
    /// invoking `step(index, prefix_checksum, chunk_bytes)` for each.
    ///
    /// Before every chunk the walker waits on the pause gate, so a pause
    /// takes effect at the next chunk boundary; an in-flight step is never
    /// interrupted. Iteration stops early when `step` returns `Ok(false)`
    /// (a clean stop, not an error) and unwinds when it returns `Err`.
    pub async fn run<F, E>(&mut self, mut step: F, start: u64, end: Option<u64>) -> Result<(), E>
    where
        F: AsyncFnMut(u64, &str, &[u8]) -> Result<bool, E>,
        E: From<std::io::Error>,
    {
        let total = self.total_chunks();
        let stop = end.map_or(total, |e| e.min(total));

        let mut index = start;
        while index < stop {
            self.gate.wait_until_resumed().await;

            let begin = index * self.chunk_size;
            let finish = ((index + 1) * self.chunk_size).min(self.file.size());
            let data = self.file.read_slice(begin, finish).await?;

            self.hasher.update(&data);
            let checksum = hex::encode(self.hasher.clone().finalize());

            if !step(index, &checksum, &data).await? {
                debug!(index, "step requested stop");
                return Ok(());
            }
            index += 1;
        }
        Ok(())
    }
}
