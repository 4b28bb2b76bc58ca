//! MathMentor solving pipeline.
//!
//! The orchestrator wires the provider, memory store, and knowledge store
//! into the staged flow described in [`orchestrator::Pipeline::run`]:
//! parse the raw input, route it, gather remembered and retrieved context,
//! solve, verify, and explain. [`prompts`] holds the per-stage instruction
//! templates.

pub mod orchestrator;
pub mod prompts;

#[cfg(test)]
pub(crate) mod test_support;

pub use orchestrator::Pipeline;
