use std::future::Future;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Source of upload bytes: a size plus random-access slice reads.
///
/// A trait keeps the walker decoupled from the filesystem and testable
/// against in-memory sources.
pub trait FileSource: Send + Sync {
    /// Total size in bytes.
    fn size(&self) -> u64;

    /// Reads bytes `[start, end)`, with `end` clamped to [`size`](Self::size).
    fn read_slice(
        &self,
        start: u64,
        end: u64,
    ) -> Pin<Box<dyn Future<Output = std::io::Result<Vec<u8>>> + Send + '_>>;
}

/// A [`FileSource`] backed by a file on disk.
///
/// The size is captured once at [`open`](Self::open); each read opens the
/// file, seeks, and reads exactly the requested range.
pub struct LocalFile {
    path: PathBuf,
    size: u64,
}

impl LocalFile {
    /// Opens `path` and records its current size.
    pub async fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let size = tokio::fs::metadata(&path).await?.len();
        Ok(Self { path, size })
    }

    /// Path this source reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileSource for LocalFile {
    fn size(&self) -> u64 {
        self.size
    }

    fn read_slice(
        &self,
        start: u64,
        end: u64,
    ) -> Pin<Box<dyn Future<Output = std::io::Result<Vec<u8>>> + Send + '_>> {
        Box::pin(async move {
            let end = end.min(self.size);
            if start >= end {
                return Ok(Vec::new());
            }
            let mut file = tokio::fs::File::open(&self.path).await?;
            file.seek(SeekFrom::Start(start)).await?;
            let mut buf = vec![0u8; (end - start) as usize];
            file.read_exact(&mut buf).await?;
            Ok(buf)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn source_with(data: &[u8]) -> (tempfile::TempDir, LocalFile) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, data).unwrap();
        let file = LocalFile::open(&path).await.unwrap();
        (dir, file)
    }

    #[tokio::test]
    async fn open_captures_size() {
        let (_dir, file) = source_with(b"0123456789").await;
        assert_eq!(file.size(), 10);
    }

    #[tokio::test]
    async fn read_slice_returns_exact_range() {
        let (_dir, file) = source_with(b"0123456789").await;
        assert_eq!(file.read_slice(2, 6).await.unwrap(), b"2345");
        assert_eq!(file.read_slice(0, 10).await.unwrap(), b"0123456789");
    }

    #[tokio::test]
    async fn read_slice_clamps_end_to_size() {
        let (_dir, file) = source_with(b"0123456789").await;
        assert_eq!(file.read_slice(8, 100).await.unwrap(), b"89");
    }

    #[tokio::test]
    async fn read_slice_past_end_is_empty() {
        let (_dir, file) = source_with(b"0123456789").await;
        assert!(file.read_slice(10, 20).await.unwrap().is_empty());
    }
}
