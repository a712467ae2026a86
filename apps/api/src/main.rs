mod config;
mod errors;
mod llm_client;
mod models;
mod pipeline;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, FeedbackBackend};
use crate::llm_client::LlmClient;
use crate::pipeline::orchestrator::Pipeline;
use crate::routes::build_router;
use crate::services::bedrock::BedrockBackend;
use crate::services::entities::ComprehendRecognizer;
use crate::services::extraction::{TextExtractor, TextractEngine};
use crate::services::feedback::{FeedbackGenerator, ModelBackend};
use crate::services::store::S3DocumentStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer v{}", env!("CARGO_PKG_VERSION"));

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .load()
        .await;
    info!("AWS config loaded (region: {})", config.aws_region);

    let pipeline = build_pipeline(&config, &sdk_config)?;

    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds one client per external service and wires them into the pipeline.
fn build_pipeline(config: &Config, sdk_config: &SdkConfig) -> Result<Pipeline> {
    let store = S3DocumentStore::new(build_s3_client(config, sdk_config));
    info!("S3 client initialized");

    let extractor = TextExtractor::new(Arc::new(TextractEngine::new(
        aws_sdk_textract::Client::new(sdk_config),
    )));
    info!("Textract client initialized");

    let recognizer = ComprehendRecognizer::new(aws_sdk_comprehend::Client::new(sdk_config));
    info!(
        "Comprehend client initialized (language: {})",
        config.entity_language
    );

    let backend: Arc<dyn ModelBackend> = match &config.feedback_backend {
        FeedbackBackend::Bedrock { model_id } => {
            info!("Feedback backend: Bedrock (model: {model_id})");
            Arc::new(BedrockBackend::new(
                aws_sdk_bedrockruntime::Client::new(sdk_config),
                model_id.clone(),
            ))
        }
        FeedbackBackend::Anthropic { api_key } => {
            info!("Feedback backend: Anthropic (model: {})", llm_client::MODEL);
            Arc::new(LlmClient::new(api_key.clone())?)
        }
    };
    info!(
        "Feedback generation: max_output_tokens={} temperature={}",
        config.generation.max_output_tokens, config.generation.temperature
    );

    Ok(Pipeline::new(
        Arc::new(store),
        extractor,
        Arc::new(recognizer),
        FeedbackGenerator::new(backend, config.generation),
        config.pipeline_settings(),
    ))
}

/// Constructs an S3 client for AWS, or for MinIO/localstack when S3_ENDPOINT is set.
fn build_s3_client(config: &Config, sdk_config: &SdkConfig) -> aws_sdk_s3::Client {
    match &config.s3_endpoint {
        Some(endpoint) => {
            let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
                .endpoint_url(endpoint)
                .force_path_style(true)
                .build();
            aws_sdk_s3::Client::from_conf(s3_config)
        }
        None => aws_sdk_s3::Client::new(sdk_config),
    }
}
