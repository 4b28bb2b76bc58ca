//! Splits a markdown reference document into retrieval-sized chunks.
//!
//! The source document is organized as `## `-headed sections. Each section
//! keeps its heading so retrieved context stays self-describing, and adjacent
//! small sections are merged until the configured chunk size is reached. A
//! single section larger than the chunk size is kept whole rather than cut
//! mid-formula.

use tracing::warn;

const SECTION_MARKER: &str = "\n## ";

/// Splits `text` into chunks of at most `chunk_size` characters where the
/// section structure allows it.
pub fn split_sections(text: &str, chunk_size: usize) -> Vec<String> {
    let sections: Vec<String> = text
        .split(SECTION_MARKER)
        .enumerate()
        .map(|(i, s)| {
            let s = s.trim();
            if i == 0 || s.is_empty() || s.starts_with("## ") {
                s.to_string()
            } else {
                format!("## {s}")
            }
        })
        .filter(|s| !s.is_empty())
        .collect();

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    for section in sections {
        if current.is_empty() {
            current = section;
        } else if current.chars().count() + 1 + section.chars().count() <= chunk_size {
            current.push('\n');
            current.push_str(&section);
        } else {
            chunks.push(current);
            current = section;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    for chunk in &chunks {
        let len = chunk.chars().count();
        if len > chunk_size {
            warn!(len, chunk_size, "section exceeds chunk size, keeping it whole");
        }
    }

    chunks
}
