//! Memory trait — the append-only log of confirmed solutions.
//!
//! When a human confirms a solved problem as correct, the question, solution,
//! and explanation are appended here and become retrievable context for
//! future runs. Records are never mutated or deleted; the log survives
//! process restarts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// The human verdict attached to a stored record.
///
/// Only positive confirmations are persisted; a "wrong answer" action never
/// produces a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Feedback {
    Positive,
}

/// A single confirmed solution in the memory log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Monotonic 1-based id, assigned by the store at append time
    pub id: u64,

    /// The question exactly as the user submitted it
    pub question: String,

    /// The step-by-step technical solution
    pub solution: String,

    /// The plain-language explanation
    pub explanation: String,

    /// The confirming feedback
    pub user_feedback: Feedback,

    /// When the record was appended
    pub created_at: DateTime<Utc>,
}

/// The caller-supplied part of a record; id and timestamp are assigned by
/// the store under its write lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub question: String,
    pub solution: String,
    pub explanation: String,
}

impl NewRecord {
    pub fn new(
        question: impl Into<String>,
        solution: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            solution: solution.into(),
            explanation: explanation.into(),
        }
    }
}

/// The core MemoryStore trait.
///
/// Implementations: JSONL file log, in-memory (for testing). The interface
/// is append-only; there is no delete or update.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The store name (e.g., "jsonl", "in-memory").
    fn name(&self) -> &str;

    /// Append a confirmed solution, returning the persisted record.
    ///
    /// Ids are strictly increasing; the append is durable before this
    /// returns.
    async fn append(&self, record: NewRecord) -> std::result::Result<MemoryRecord, MemoryError>;

    /// All records in append order.
    async fn all(&self) -> std::result::Result<Vec<MemoryRecord>, MemoryError>;

    /// Total record count.
    async fn count(&self) -> std::result::Result<usize, MemoryError>;
}
