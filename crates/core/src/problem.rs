//! Problem domain types — the parsed question and the routing verdict.
//!
//! A raw input string becomes a [`ParsedProblem`] in the Parse stage; the
//! Route stage then derives a [`RouteDecision`] from its topic. Both are
//! immutable value objects once produced.

use serde::{Deserialize, Serialize};

/// Topics the tutor is prepared to handle. Routing is a case-insensitive
/// substring test against this list.
pub const ALLOWED_TOPICS: [&str; 6] = [
    "algebra",
    "calculus",
    "probability",
    "linear algebra",
    "geometry",
    "statistics",
];

/// The structured form of a raw question, produced by the Parse stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedProblem {
    /// The cleaned problem statement
    pub problem_text: String,

    /// The identified math topic (e.g., "algebra"), or "Unknown"
    pub topic: String,

    /// Whether the input is too ambiguous to attempt a solution
    #[serde(default)]
    pub needs_clarification: bool,
}

impl ParsedProblem {
    /// The degraded default used when the model reply cannot be parsed.
    ///
    /// Upstream OCR/ASR text is noisy and the parser model sometimes answers
    /// with something other than JSON; in that case the raw input is carried
    /// forward unchanged rather than failing the run.
    pub fn fallback(raw_input: impl Into<String>) -> Self {
        Self {
            problem_text: raw_input.into(),
            topic: "Unknown".to_string(),
            needs_clarification: false,
        }
    }
}

/// The Route stage's advisory verdict on a topic.
///
/// `Flag` is recorded in the trace but does not stop the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteDecision {
    Proceed,
    Flag,
}

impl RouteDecision {
    /// Pure routing function: does the topic mention any supported area?
    pub fn from_topic(topic: &str) -> Self {
        let lowered = topic.to_lowercase();
        if ALLOWED_TOPICS.iter().any(|t| lowered.contains(t)) {
            RouteDecision::Proceed
        } else {
            RouteDecision::Flag
        }
    }
}

impl std::fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteDecision::Proceed => write!(f, "PROCEED"),
            RouteDecision::Flag => write!(f, "FLAG"),
        }
    }
}
