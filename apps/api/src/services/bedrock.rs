//! Bedrock model backend using the Claude text-completions body format.

use async_trait::async_trait;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::services::feedback::{GenerationError, GenerationParams, ModelBackend, ModelResponse};
use crate::services::prompts::frame_completion_prompt;

pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-v2:1";
const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    max_tokens_to_sample: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    completion: Option<String>,
    stop_reason: Option<String>,
}

pub struct BedrockBackend {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl BedrockBackend {
    pub fn new(client: aws_sdk_bedrockruntime::Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }
}

fn encode_request(prompt: &str, params: &GenerationParams) -> Result<Vec<u8>, GenerationError> {
    let framed = frame_completion_prompt(prompt);
    serde_json::to_vec(&CompletionRequest {
        prompt: &framed,
        max_tokens_to_sample: params.max_output_tokens,
        temperature: params.temperature,
    })
    .map_err(|e| GenerationError::Invocation(format!("failed to encode request body: {e}")))
}

fn decode_response(body: &[u8]) -> Result<ModelResponse, GenerationError> {
    let response: CompletionResponse = serde_json::from_slice(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    debug!("Bedrock completion stop_reason={:?}", response.stop_reason);
    Ok(ModelResponse {
        completion: response.completion,
    })
}

#[async_trait]
impl ModelBackend for BedrockBackend {
    async fn invoke_model(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ModelResponse, GenerationError> {
        let body = encode_request(prompt, params)?;

        let output = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type(JSON_CONTENT_TYPE)
            .accept(JSON_CONTENT_TYPE)
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| GenerationError::Invocation(DisplayErrorContext(&e).to_string()))?;

        decode_response(output.body().as_ref())
    }
}
