//! Lexical relevance scan over the memory log.
//!
//! A record is relevant when any query token longer than four characters
//! appears verbatim inside the stored question; among relevant records the
//! most recently appended one wins. No embeddings, no scoring.

use mathmentor_core::memory::{MemoryRecord, MemoryStore};
use tracing::warn;

/// What the solving stage sees when no history applies.
pub const NO_MATCH: &str = "No similar past problems found.";

/// Find the most recently appended record sharing a token with the query.
///
/// Tokens of four characters or fewer are ignored; short algebra fragments
/// like "x", "=", "5" would otherwise match everything.
pub fn most_relevant<'a>(records: &'a [MemoryRecord], query: &str) -> Option<&'a MemoryRecord> {
    let tokens: Vec<&str> = query
        .split_whitespace()
        .filter(|w| w.chars().count() > 4)
        .collect();
    if tokens.is_empty() {
        return None;
    }

    records
        .iter()
        .rev()
        .find(|r| tokens.iter().any(|t| r.question.contains(t)))
}

/// Look up past-problem context for the solving stage.
///
/// Never fails: a broken store degrades to `None` with a warning, because
/// absent memory is not an error condition for the pipeline.
pub async fn recall(store: &dyn MemoryStore, query: &str) -> Option<String> {
    let records = match store.all().await {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "Memory lookup degraded; continuing without history");
            return None;
        }
    };

    most_relevant(&records, query).map(|r| {
        format!(
            "Similar Problem: {}\nExplanation: {}",
            r.question, r.explanation
        )
    })
}
