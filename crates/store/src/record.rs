use serde::{Deserialize, Serialize};

/// Persisted progress for one upload id.
///
/// `checksums[i]` is the cumulative checksum of the file's bytes from offset
/// zero through the end of chunk `i`. Its length is exactly the number of
/// chunks the remote endpoint has acknowledged (or that a resumed session
/// has re-validated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Prefix checksums, indexed by chunk.
    pub checksums: Vec<String>,
    /// Chunk size in bytes, fixed for the life of the record.
    pub chunk_size: u64,
    /// True once at least one checksum has been recorded.
    pub started: bool,
    /// File size in bytes when the record was last written.
    pub file_size: u64,
}

impl ProgressRecord {
    /// Creates an empty record for a fresh upload.
    pub fn new(chunk_size: u64, file_size: u64) -> Self {
        Self {
            checksums: Vec::new(),
            chunk_size,
            started: false,
            file_size,
        }
    }

    /// Records the prefix checksum for chunk `index`.
    ///
    /// Entries past `index` are dropped: when an upload resumes behind a
    /// previously recorded position, the re-sent chunks overwrite the
    /// remote bytes, so stale checksums beyond the resume point no longer
    /// describe acknowledged data.
    pub fn add_checksum(&mut self, index: usize, checksum: String) {
        self.checksums.truncate(index);
        self.checksums.push(checksum);
        self.started = true;
    }

    /// Returns the recorded prefix checksum for chunk `index`, if any.
    pub fn checksum_at(&self, index: u64) -> Option<&str> {
        self.checksums.get(index as usize).map(String::as_str)
    }

    /// Number of chunks recorded so far, i.e. the local resume index.
    pub fn resume_index(&self) -> u64 {
        self.checksums.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_empty() {
        let record = ProgressRecord::new(1024, 4096);
        assert!(!record.started);
        assert_eq!(record.resume_index(), 0);
        assert!(record.checksum_at(0).is_none());
    }

    #[test]
    fn add_checksum_sets_started_and_advances() {
        let mut record = ProgressRecord::new(1024, 4096);
        record.add_checksum(0, "aaa".into());
        record.add_checksum(1, "bbb".into());

        assert!(record.started);
        assert_eq!(record.resume_index(), 2);
        assert_eq!(record.checksum_at(1), Some("bbb"));
    }

    #[test]
    fn add_checksum_behind_tail_truncates_stale_entries() {
        let mut record = ProgressRecord::new(1024, 4096);
        record.add_checksum(0, "aaa".into());
        record.add_checksum(1, "bbb".into());
        record.add_checksum(2, "ccc".into());

        // Re-recording chunk 1 invalidates everything after it.
        record.add_checksum(1, "BBB".into());
        assert_eq!(record.resume_index(), 2);
        assert_eq!(record.checksum_at(1), Some("BBB"));
        assert!(record.checksum_at(2).is_none());
    }

    #[test]
    fn serde_uses_camel_case() {
        let mut record = ProgressRecord::new(262_144, 786_432);
        record.add_checksum(0, "abc".into());

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"chunkSize\":262144"));
        assert!(json.contains("\"fileSize\":786432"));
        assert!(json.contains("\"started\":true"));

        let back: ProgressRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
