//! The staged solving pipeline.
//!
//! Sequences Parse → Route → Memory lookup → Knowledge retrieval → Solve →
//! Verify → Explain over a shared provider. Each stage appends exactly one
//! entry to the run's trace; the trace preserves execution order and is the
//! user-facing explanation of what happened.
//!
//! Parse and Memory lookup recover locally from failures (logged, never
//! raised). Retrieval, Solve, Verify, and Explain propagate errors to the
//! caller. A rejected verification lowers the confidence score but does not
//! abort the run.

use std::sync::Arc;

use mathmentor_core::{
    CompletionRequest, KnowledgeStore, MemoryRecord, MemoryStore, NewRecord, ParsedProblem,
    PipelineResult, Provider, Result, RouteDecision, Verdict,
};
use mathmentor_memory::{NO_MATCH, recall};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::prompts;

/// Message shown when the parser asks for clarification.
const AMBIGUOUS_INPUT: &str = "Ambiguous Input";

/// Default number of knowledge chunks merged into the solving context.
const DEFAULT_TOP_K: usize = 2;

/// The pipeline orchestrator.
///
/// Holds the provider and both stores behind trait objects so runs are
/// testable with scripted mocks.
pub struct Pipeline {
    provider: Arc<dyn Provider>,
    memory: Arc<dyn MemoryStore>,
    knowledge: Arc<dyn KnowledgeStore>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    top_k: usize,
}

impl Pipeline {
    pub fn new(
        provider: Arc<dyn Provider>,
        memory: Arc<dyn MemoryStore>,
        knowledge: Arc<dyn KnowledgeStore>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            memory,
            knowledge,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set the sampling temperature for every stage call.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap the tokens generated per stage call.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set how many knowledge chunks are retrieved for the solving context.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Execute one full run over `raw_text`.
    ///
    /// Returns `Hitl` when the parser asks for clarification, `Success`
    /// otherwise. Store or provider failures past the parse stage surface as
    /// errors; the caller decides how to present them.
    pub async fn run(&self, raw_text: &str) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        let mut trace: Vec<String> = Vec::new();

        info!(%run_id, input_len = raw_text.len(), "pipeline run started");

        // 1. Parse
        let parsed = self.parse(raw_text).await;
        trace.push(format!("✅ Parser: Identified topic '{}'", parsed.topic));

        if parsed.needs_clarification {
            info!(%run_id, "input ambiguous, stopping for human clarification");
            return Ok(PipelineResult::needs_human(AMBIGUOUS_INPUT, trace));
        }

        // 2. Route (advisory: recorded, never short-circuits)
        let route = RouteDecision::from_topic(&parsed.topic);
        trace.push(format!("✅ Router: Action '{route}'"));
        debug!(%run_id, topic = %parsed.topic, action = %route, "routed");

        // 3. Memory lookup
        let remembered = recall(self.memory.as_ref(), &parsed.problem_text).await;
        trace.push(match &remembered {
            Some(_) => "🧠 Memory: Found similar past problem.".to_string(),
            None => "🧠 Memory: No relevant history found.".to_string(),
        });
        let memory_context = remembered.unwrap_or_else(|| NO_MATCH.to_string());

        // 4. Knowledge retrieval
        let context = self
            .knowledge
            .retrieve(&parsed.problem_text, self.top_k)
            .await?;
        trace.push(format!(
            "📚 RAG: Retrieved {} words of context.",
            context.split_whitespace().count()
        ));

        // 5. Solve
        let solution = self
            .complete(prompts::solver(&parsed.problem_text, &context, &memory_context))
            .await?;
        trace.push("⚙️ Solver: Generated solution.".to_string());

        // 6. Verify
        let reply = self
            .complete(prompts::verifier(&parsed.problem_text, &solution))
            .await?;
        let verdict = parse_verdict(&reply);
        match &verdict {
            Verdict::Verified => {
                trace.push("✅ Verifier: Solution approved.".to_string());
            }
            Verdict::Rejected { reason } => {
                warn!(%run_id, reason = %reason, "verifier flagged the solution");
                trace.push(format!("⚠️ Verifier: Flagged issue - {reason}"));
            }
        }
        let confidence = verdict.confidence();

        // 7. Explain
        let explanation = self.complete(prompts::explainer(&solution)).await?;
        trace.push("🎓 Explainer: Formatted output.".to_string());

        info!(%run_id, confidence, "pipeline run finished");
        Ok(PipelineResult::solved(
            solution,
            explanation,
            context,
            trace,
            confidence,
        ))
    }

    /// Record positive human feedback for a completed run.
    ///
    /// `question` is the text exactly as the user submitted it, so future
    /// memory lookups match what users actually type.
    pub async fn confirm(
        &self,
        question: &str,
        solution: &str,
        explanation: &str,
    ) -> Result<MemoryRecord> {
        let record = self
            .memory
            .append(NewRecord::new(question, solution, explanation))
            .await?;
        info!(id = record.id, "feedback recorded");
        Ok(record)
    }

    /// Run the parse stage, falling back to the degraded default on any
    /// provider or decoding failure. Never errors.
    async fn parse(&self, raw_input: &str) -> ParsedProblem {
        match self.complete(prompts::parser(raw_input)).await {
            Ok(reply) => {
                let cleaned = strip_code_fence(&reply);
                match serde_json::from_str::<ParsedProblem>(&cleaned) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        warn!(error = %e, "parser reply was not valid JSON, using raw input");
                        ParsedProblem::fallback(raw_input)
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "parser stage failed, using raw input");
                ParsedProblem::fallback(raw_input)
            }
        }
    }

    /// One provider call with the pipeline's model settings.
    async fn complete(&self, prompt: String) -> Result<String> {
        let mut request =
            CompletionRequest::new(&self.model, prompt).with_temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        let response = self.provider.complete(request).await?;
        Ok(response.text)
    }
}

/// Interpret the verifier's reply.
///
/// A JSON `{"verdict", "reason"}` object is authoritative. Replies that
/// ignore the JSON instruction fall back to substring detection: "VERIFIED"
/// anywhere approves, anything else rejects with the full reply as the
/// reason.
fn parse_verdict(reply: &str) -> Verdict {
    #[derive(Deserialize)]
    struct VerdictReply {
        verdict: String,
        #[serde(default)]
        reason: Option<String>,
    }

    let cleaned = strip_code_fence(reply);
    if let Ok(tagged) = serde_json::from_str::<VerdictReply>(&cleaned) {
        if tagged.verdict.trim().eq_ignore_ascii_case("VERIFIED") {
            return Verdict::Verified;
        }
        let reason = tagged
            .reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| reply.trim().to_string());
        return Verdict::Rejected { reason };
    }

    if reply.contains("VERIFIED") {
        return Verdict::Verified;
    }
    Verdict::Rejected {
        reason: reply.trim().to_string(),
    }
}

/// Remove markdown code fences models often wrap JSON in.
fn strip_code_fence(reply: &str) -> String {
    reply
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}
