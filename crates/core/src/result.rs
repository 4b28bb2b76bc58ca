//! Pipeline output types — the externally visible result of one run.
//!
//! A run ends in one of two designed terminal states: `Success` (a solution
//! was produced, possibly with degraded confidence) or `Hitl` (the input was
//! too ambiguous and a human must clarify). Technical failures are not
//! represented here; they surface as errors from the orchestrator.

use serde::{Deserialize, Serialize};

/// Confidence assigned when the verifier approves the solution.
pub const VERIFIED_CONFIDENCE: f64 = 0.95;

/// Confidence assigned when the verifier rejects it. The run still completes;
/// the lowered score tells the presentation layer to warn the user.
pub const REJECTED_CONFIDENCE: f64 = 0.60;

/// Terminal state of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PipelineStatus {
    Success,
    Hitl,
}

/// The structured result handed to presentation layers.
///
/// `trace` is the ordered audit log of the run: every stage appends exactly
/// one entry, and entries are never reordered or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub status: PipelineStatus,

    /// Step-by-step technical solution (Success only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,

    /// Plain-language explanation (Success only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    /// Retrieved reference context shown for transparency (Success only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Ordered human-readable stage log
    pub trace: Vec<String>,

    /// Heuristic score in [0,1], derived from the verify verdict (Success only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Why the run stopped early (Hitl only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl PipelineResult {
    /// A completed run.
    pub fn solved(
        solution: String,
        explanation: String,
        context: String,
        trace: Vec<String>,
        confidence: f64,
    ) -> Self {
        Self {
            status: PipelineStatus::Success,
            solution: Some(solution),
            explanation: Some(explanation),
            context: Some(context),
            trace,
            confidence: Some(confidence),
            msg: None,
        }
    }

    /// A run stopped for human clarification.
    pub fn needs_human(msg: impl Into<String>, trace: Vec<String>) -> Self {
        Self {
            status: PipelineStatus::Hitl,
            solution: None,
            explanation: None,
            context: None,
            trace,
            confidence: None,
            msg: Some(msg.into()),
        }
    }
}

/// The verify stage's structured verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    Rejected { reason: String },
}

impl Verdict {
    /// Map the verdict to the fixed confidence score.
    pub fn confidence(&self) -> f64 {
        match self {
            Verdict::Verified => VERIFIED_CONFIDENCE,
            Verdict::Rejected { .. } => REJECTED_CONFIDENCE,
        }
    }
}
