//! Shared test helpers for pipeline tests.

use std::sync::Mutex;

use async_trait::async_trait;
use mathmentor_core::{
    CompletionRequest, CompletionResponse, KnowledgeError, KnowledgeStore, Provider, ProviderError,
};

/// A mock provider that replays a sequence of scripted completions.
///
/// Each call to `complete` returns the next response in the queue and records
/// the prompt it was given. Panics if more calls are made than responses
/// provided.
pub struct ScriptedProvider {
    responses: Mutex<Vec<String>>,
    call_count: Mutex<usize>,
    prompts_seen: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            call_count: Mutex::new(0),
            prompts_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// The prompts received so far, in call order.
    pub fn prompts_seen(&self) -> Vec<String> {
        self.prompts_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let mut count = self.call_count.lock().unwrap();
        let responses = self.responses.lock().unwrap();

        if *count >= responses.len() {
            panic!(
                "ScriptedProvider: no more responses (call #{}, have {})",
                *count,
                responses.len()
            );
        }

        self.prompts_seen.lock().unwrap().push(request.prompt);
        let text = responses[*count].clone();
        *count += 1;

        Ok(CompletionResponse {
            text,
            model: "scripted-model".into(),
            usage: None,
        })
    }
}

/// A knowledge store that returns one fixed context string.
pub struct FixedKnowledge {
    context: String,
}

impl FixedKnowledge {
    pub fn new(context: &str) -> Self {
        Self {
            context: context.to_string(),
        }
    }
}

#[async_trait]
impl KnowledgeStore for FixedKnowledge {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn retrieve(&self, _query: &str, _k: usize) -> Result<String, KnowledgeError> {
        Ok(self.context.clone())
    }

    async fn chunk_count(&self) -> Result<usize, KnowledgeError> {
        Ok(1)
    }
}
