//! System prompt for context-grounded answers.
//!
//! Restricting answers to the embedded content is prompt-level steering. The
//! model is asked to comply; nothing in code can guarantee it.

/// The only reply allowed when the content does not answer the question.
pub const REFUSAL_MESSAGE: &str = "Sorry, there is no information about your query in this website.";

/// Instruction template. `{context}` receives the page text verbatim.
pub const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are an advanced question-answering chatbot. Use the following context extracted from a specific website to answer user queries:

{context}

Base your responses exclusively on this provided context. If asked a question that cannot be answered using the given information, reply: "{refusal}" and nothing else. Do not provide information beyond what is explicitly stated in the context."#;

/// Build the system turn text for `context`.
pub fn build_system_prompt(context: &str) -> String {
    // Refusal first so page text containing "{refusal}" is left untouched
    SYSTEM_PROMPT_TEMPLATE
        .replace("{refusal}", REFUSAL_MESSAGE)
        .replace("{context}", context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_content_and_refusal_verbatim() {
        let prompt = build_system_prompt("Paris is the capital of France.");
        assert!(prompt.contains("Paris is the capital of France."));
        assert!(prompt.contains(REFUSAL_MESSAGE));
        assert!(!prompt.contains("{context}"));
    }

    #[test]
    fn placeholders_inside_content_survive() {
        let prompt = build_system_prompt("Template uses {refusal} and {context} tokens.");
        assert!(prompt.contains("Template uses {refusal} and {context} tokens."));
    }
}
