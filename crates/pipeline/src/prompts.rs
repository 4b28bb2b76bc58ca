//! Instruction templates for the model-backed stages.
//!
//! Each stage sends exactly one prompt. The parser and verifier ask for
//! strictly valid JSON; both callers tolerate replies that ignore that
//! instruction.

/// Parse raw input into `{problem_text, topic, needs_clarification}`.
pub fn parser(raw_input: &str) -> String {
    format!(
        "You are a Math Parser. Input: {raw_input}\n\
         Task: Clean text, identify topic. If no question, assume 'Solve'.\n\
         Output strictly valid JSON: {{\"problem_text\": \"...\", \"topic\": \"...\", \"needs_clarification\": bool}}"
    )
}

/// Produce a step-by-step solution grounded in retrieved and remembered
/// context.
pub fn solver(problem: &str, context: &str, memory: &str) -> String {
    format!(
        "Role: Math Mentor. Context: {context}. Memory: {memory}. Problem: {problem}. Solve step-by-step."
    )
}

/// Check the solution, returning a tagged verdict.
pub fn verifier(problem: &str, solution: &str) -> String {
    format!(
        "Verify the solution. Output strictly valid JSON: {{\"verdict\": \"VERIFIED\" or \"REJECTED\", \"reason\": \"...\"}}\n\
         Problem: {problem}\n\
         Solution: {solution}"
    )
}

/// Rewrite the solution in plain language for a learner.
pub fn explainer(solution: &str) -> String {
    format!("Explain simply:\n{solution}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_prompt_embeds_input_and_requests_json() {
        let prompt = parser("Solve x + 5 = 10");
        assert!(prompt.contains("Solve x + 5 = 10"));
        assert!(prompt.contains("strictly valid JSON"));
        assert!(prompt.contains("needs_clarification"));
    }

    #[test]
    fn solver_prompt_carries_both_contexts() {
        let prompt = solver("x + 5 = 10", "## Algebra facts", "Similar Problem: x + 2 = 4");
        assert!(prompt.contains("Context: ## Algebra facts."));
        assert!(prompt.contains("Memory: Similar Problem: x + 2 = 4."));
        assert!(prompt.contains("Solve step-by-step."));
    }

    #[test]
    fn verifier_prompt_requests_tagged_verdict() {
        let prompt = verifier("x + 5 = 10", "x = 5");
        assert!(prompt.contains("\"verdict\""));
        assert!(prompt.contains("VERIFIED"));
        assert!(prompt.contains("REJECTED"));
        assert!(prompt.contains("Problem: x + 5 = 10"));
        assert!(prompt.contains("Solution: x = 5"));
    }

    #[test]
    fn explainer_prompt_appends_solution() {
        let prompt = explainer("x = 5");
        assert!(prompt.starts_with("Explain simply:\n"));
        assert!(prompt.ends_with("x = 5"));
    }
}
