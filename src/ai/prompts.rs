pub const EVALUATOR_SYSTEM_INSTRUCTION: &str =
    "You are a world-class Prompt Engineer and educator. Your goal is to help users write better prompts.";

pub const EVALUATION_PROMPT: &str = r#"
Analyze the following prompt designed for an LLM.
Evaluate it based on clarity, context, constraints, and potential for hallucination.
Rate it out of 10.
Categorize it as Beginner, Intermediate, or Advanced based on the prompt engineering techniques used (e.g., zero-shot, few-shot, chain-of-thought, persona adoption).
Provide specific feedback and a rewritten 'Master' version.
"#;

/// Wraps the user's prompt in the evaluation instructions.
pub fn evaluation_request(prompt: &str) -> String {
    format!("{}\nPrompt to analyze:\n\"{}\"", EVALUATION_PROMPT.trim(), prompt)
}
