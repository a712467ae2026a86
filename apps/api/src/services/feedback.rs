//! Feedback Generation Service — improvement suggestions from a generative model.
//!
//! A missing or blank completion is not an error: the service substitutes
//! [`NO_FEEDBACK_PLACEHOLDER`] so the pipeline still completes. Only failures
//! to reach or understand the backend surface as [`GenerationError`].

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::models::analysis::NO_FEEDBACK_PLACEHOLDER;
use crate::services::prompts::render_feedback_prompt;

pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 200;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model invocation failed: {0}")]
    Invocation(String),

    #[error("model response could not be parsed: {0}")]
    MalformedResponse(String),
}

/// Sampling parameters passed to every model invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Caps the length of the generated response.
    pub max_output_tokens: u32,
    /// Controls sampling randomness.
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Narrowed model response. `completion` is `None` when the backend
/// returned no completion field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub completion: Option<String>,
}

#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn invoke_model(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ModelResponse, GenerationError>;
}

#[derive(Clone)]
pub struct FeedbackGenerator {
    backend: Arc<dyn ModelBackend>,
    params: GenerationParams,
}

impl FeedbackGenerator {
    pub fn new(backend: Arc<dyn ModelBackend>, params: GenerationParams) -> Self {
        Self { backend, params }
    }

    pub async fn generate_feedback(&self, resume_text: &str) -> Result<String, GenerationError> {
        let prompt = render_feedback_prompt(resume_text);
        let response = self.backend.invoke_model(&prompt, &self.params).await?;

        match response.completion {
            Some(completion) if !completion.trim().is_empty() => Ok(completion),
            _ => {
                warn!("Model returned no usable completion, using placeholder feedback");
                Ok(NO_FEEDBACK_PLACEHOLDER.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fakes::FakeModelBackend;

    #[tokio::test]
    async fn test_missing_completion_yields_placeholder() {
        let backend = Arc::new(FakeModelBackend::responding(None));
        let generator = FeedbackGenerator::new(backend, GenerationParams::default());

        let feedback = generator.generate_feedback("Jane Doe\n").await.unwrap();
        assert_eq!(feedback, "No feedback generated.");
    }

    #[tokio::test]
    async fn test_blank_completion_yields_placeholder() {
        let backend = Arc::new(FakeModelBackend::responding(Some("  \n")));
        let generator = FeedbackGenerator::new(backend, GenerationParams::default());

        let feedback = generator.generate_feedback("Jane Doe\n").await.unwrap();
        assert_eq!(feedback, NO_FEEDBACK_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_prompt_and_params_reach_backend() {
        let backend = Arc::new(FakeModelBackend::responding(Some(" Add metrics.")));
        let params = GenerationParams {
            max_output_tokens: 64,
            temperature: 0.2,
        };
        let generator = FeedbackGenerator::new(backend.clone(), params);

        let feedback = generator.generate_feedback("Jane Doe\n").await.unwrap();
        assert_eq!(feedback, " Add metrics.");

        let (prompt, seen) = backend.last_call().unwrap();
        assert!(prompt.starts_with("Analyze this resume and provide improvement suggestions:"));
        assert!(prompt.ends_with("Jane Doe\n"));
        assert_eq!(seen, params);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let backend = Arc::new(FakeModelBackend::failing("access denied"));
        let generator = FeedbackGenerator::new(backend, GenerationParams::default());

        let err = generator.generate_feedback("text").await.unwrap_err();
        assert!(matches!(err, GenerationError::Invocation(_)));
    }
}
