//! Prompt assembly for the generation call.

/// Instruction prefix the question is appended to.
pub const PROMPT_TEMPLATE: &str =
    "Use the provided context from the documentation to answer this query: ";

/// Builds the final prompt handed to the generative model.
///
/// The question is interpolated verbatim; retrieved context travels
/// separately and is rendered by the generator.
pub fn build_prompt(question: &str) -> String {
    format!("{PROMPT_TEMPLATE}{question}")
}
