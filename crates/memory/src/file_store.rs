//! File-based memory store — persistent JSON-lines storage.
//!
//! One JSON-encoded `MemoryRecord` per line. Records are loaded into memory
//! on creation; each append writes exactly one new line, so earlier lines are
//! never rewritten. Simple, portable, human-inspectable.
//!
//! Storage location: `~/.mathmentor/memory.jsonl` by default.

use async_trait::async_trait;
use chrono::Utc;
use mathmentor_core::error::MemoryError;
use mathmentor_core::memory::{Feedback, MemoryRecord, MemoryStore, NewRecord};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A file-backed append-only store using JSONL.
///
/// All appends go through a single write lock: the next id is derived from
/// the in-memory tail and the line is durable on disk before the lock is
/// released, so concurrent feedback submissions can neither collide on ids
/// nor lose records.
pub struct FileStore {
    path: PathBuf,
    records: Arc<RwLock<Vec<MemoryRecord>>>,
}

impl FileStore {
    /// Open a store at the given path.
    ///
    /// If the file exists, records are loaded from it.
    /// If the file does not exist, starts empty (file created on first append).
    pub fn new(path: PathBuf) -> Self {
        let records = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = records.len(), "Memory log loaded");
        Self {
            path,
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Load records from a JSONL file, skipping lines that fail to parse.
    fn load_from_disk(path: &PathBuf) -> Vec<MemoryRecord> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(), // No log yet; first append creates it
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<MemoryRecord>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted memory record");
                    None
                }
            })
            .collect()
    }

    /// Append one record as a single line, durably.
    fn write_line(&self, record: &MemoryRecord) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MemoryError::Storage(format!("Could not create memory directory: {e}"))
            })?;
        }

        let line = serde_json::to_string(record)
            .map_err(|e| MemoryError::Serialization(e.to_string()))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MemoryError::Storage(format!("Failed to open memory file: {e}")))?;

        writeln!(file, "{line}")
            .and_then(|_| file.flush())
            .map_err(|e| MemoryError::Storage(format!("Failed to write memory record: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl MemoryStore for FileStore {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn append(&self, new: NewRecord) -> Result<MemoryRecord, MemoryError> {
        let mut records = self.records.write().await;

        let record = MemoryRecord {
            id: records.last().map(|r| r.id).unwrap_or(0) + 1,
            question: new.question,
            solution: new.solution,
            explanation: new.explanation,
            user_feedback: Feedback::Positive,
            created_at: Utc::now(),
        };

        // Durable before visible: if the disk write fails, the in-memory
        // tail (and the next id) is unchanged.
        self.write_line(&record)?;
        records.push(record.clone());

        Ok(record)
    }

    async fn all(&self) -> Result<Vec<MemoryRecord>, MemoryError> {
        Ok(self.records.read().await.clone())
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.records.read().await.len())
    }
}
