use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::pipeline::orchestrator::PipelineSettings;
use crate::services::bedrock::DEFAULT_MODEL_ID;
use crate::services::entities::DEFAULT_LANGUAGE;
use crate::services::feedback::{GenerationParams, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackBackend {
    Bedrock { model_id: String },
    Anthropic { api_key: String },
}

/// Application configuration loaded from environment variables.
/// Startup fails if a value is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub aws_region: String,
    /// Used when a request names no bucket.
    pub default_bucket: Option<String>,
    /// Overrides the S3 endpoint (MinIO, localstack).
    pub s3_endpoint: Option<String>,
    pub entity_language: String,
    pub feedback_backend: FeedbackBackend,
    pub generation: GenerationParams,
    pub stage_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let feedback_backend = match get("FEEDBACK_BACKEND").as_deref().unwrap_or("bedrock") {
            "bedrock" => FeedbackBackend::Bedrock {
                model_id: get("BEDROCK_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            },
            "anthropic" => FeedbackBackend::Anthropic {
                api_key: get("ANTHROPIC_API_KEY").context(
                    "Required environment variable 'ANTHROPIC_API_KEY' is not set \
                     (FEEDBACK_BACKEND=anthropic)",
                )?,
            },
            other => bail!("FEEDBACK_BACKEND must be 'bedrock' or 'anthropic', got '{other}'"),
        };

        let temperature = parse_or(&get, "FEEDBACK_TEMPERATURE", DEFAULT_TEMPERATURE)?;
        if !(0.0..=1.0).contains(&temperature) {
            bail!("FEEDBACK_TEMPERATURE must be between 0.0 and 1.0, got {temperature}");
        }
        let max_output_tokens = parse_or(&get, "FEEDBACK_MAX_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS)?;
        if max_output_tokens == 0 {
            bail!("FEEDBACK_MAX_TOKENS must be greater than zero");
        }
        let stage_timeout_secs: u64 = parse_or(&get, "STAGE_TIMEOUT_SECS", 30)?;
        if stage_timeout_secs == 0 {
            bail!("STAGE_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Config {
            port: parse_or(&get, "PORT", 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            aws_region: get("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            default_bucket: get("S3_BUCKET"),
            s3_endpoint: get("S3_ENDPOINT"),
            entity_language: get("ENTITY_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            feedback_backend,
            generation: GenerationParams {
                max_output_tokens,
                temperature,
            },
            stage_timeout: Duration::from_secs(stage_timeout_secs),
        })
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            language: self.entity_language.clone(),
            stage_timeout: self.stage_timeout,
        }
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
