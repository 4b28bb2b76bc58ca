//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use mathmentor_core::error::MemoryError;
use mathmentor_core::memory::{Feedback, MemoryRecord, MemoryStore, NewRecord};
use tokio::sync::RwLock;

/// Keeps records in a `Vec`; same id discipline as the file store, no disk.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<MemoryRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory"
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
