//! Answer generation through an external completion model.

use async_trait::async_trait;
use rig::completion::CompletionModel;
use rig::message::AssistantContent;

use crate::pipeline::retrieval::RetrievedSection;
use crate::types::PipelineError;

/// Seam for the generative model producing the final answer.
///
/// Implementations receive the assembled prompt together with the
/// retrieved sections and return the model's answer text. Failures are
/// reported as [`PipelineError::Generation`] and treated as fatal by the
/// default run policy.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produces an answer for `prompt` given the retrieved `context`.
    async fn generate(
        &self,
        prompt: &str,
        context: &[RetrievedSection],
    ) -> Result<String, PipelineError>;
}

/// [`Generator`] backed by a rig [`CompletionModel`].
///
/// Builds a single-shot completion request per call: the retrieved
/// sections are rendered as a plain-text context block ahead of the
/// prompt, and the assistant text parts of the response are concatenated
/// into the answer.
pub struct RigGenerator<M>
where
    M: CompletionModel,
{
    model: M,
}

impl<M> RigGenerator<M>
where
    M: CompletionModel,
{
    /// Wraps a completion model.
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M> Generator for RigGenerator<M>
where
    M: CompletionModel,
{
    async fn generate(
        &self,
        prompt: &str,
        context: &[RetrievedSection],
    ) -> Result<String, PipelineError> {
        let request = self
            .model
            .completion_request(rig::completion::Message::user(render_request(
                prompt, context,
            )))
            .build();

        let response = self
            .model
            .completion(request)
            .await
            .map_err(|err| PipelineError::Generation(err.to_string()))?;

        let answer = response
            .choice
            .into_iter()
            .filter_map(|content| match content {
                AssistantContent::Text(text) => Some(text.text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if answer.is_empty() {
            return Err(PipelineError::Generation(
                "model returned no text content".to_string(),
            ));
        }
        Ok(answer)
    }
}

/// Renders the retrieved sections ahead of the prompt as one user message.
fn render_request(prompt: &str, context: &[RetrievedSection]) -> String {
    if context.is_empty() {
        return prompt.to_string();
    }
    let mut rendered = String::from("Context:\n\n");
    for section in context {
        rendered.push_str(&format!(
            "[{} #{}]\n{}\n\n",
            section.source, section.section_index, section.content
        ));
    }
    rendered.push_str(prompt);
    rendered
}
