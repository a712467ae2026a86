//! Pipeline Orchestrator — runs one analysis invocation end to end.
//!
//! Flow: fetch → extract → {recognize ∥ generate} → assemble.
//!
//! Fetch and extract are sequential. Recognition and generation share the
//! extracted text and run concurrently; both settle before the result is
//! assembled or a failure is reported. Every external call is bounded by the
//! stage timeout and attempted exactly once.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::models::analysis::{AnalysisResult, DocumentReference};
use crate::pipeline::error::{PipelineError, PipelineState, Stage, StageError};
use crate::services::entities::{EntityRecognizer, DEFAULT_LANGUAGE};
use crate::services::extraction::TextExtractor;
use crate::services::feedback::FeedbackGenerator;
use crate::services::store::{DocumentStore, StoreError};

pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Language code passed to entity recognition.
    pub language: String,
    /// Upper bound on each external call.
    pub stage_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
        }
    }
}

/// Holds one client per external service. Built once at startup and shared
/// across invocations; it carries no per-invocation state.
pub struct Pipeline {
    store: Arc<dyn DocumentStore>,
    extractor: TextExtractor,
    recognizer: Arc<dyn EntityRecognizer>,
    feedback: FeedbackGenerator,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        extractor: TextExtractor,
        recognizer: Arc<dyn EntityRecognizer>,
        feedback: FeedbackGenerator,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            extractor,
            recognizer,
            feedback,
            settings,
        }
    }

    /// Runs the full pipeline for `reference`.
    ///
    /// Every log event emitted during the run carries a fresh `invocation_id`.
    pub async fn analyze(
        &self,
        reference: &DocumentReference,
    ) -> Result<AnalysisResult, PipelineError> {
        let invocation_id = Uuid::new_v4();
        let span = info_span!(
            "analysis",
            %invocation_id,
            bucket = reference.bucket(),
            key = reference.key()
        );

        async {
            info!(state = %PipelineState::Start, "Analysis invoked");
            let outcome = self.run_stages(reference).await;
            match &outcome {
                Ok(result) => info!(
                    state = %PipelineState::Done,
                    text_len = result.resume_text.len(),
                    entities = result.skills.len(),
                    "Analysis completed"
                ),
                Err(e) => error!(
                    state = %PipelineState::Failed,
                    stage = %e.stage(),
                    retryable = e.is_retryable(),
                    "Analysis failed: {e}"
                ),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run_stages(
        &self,
        reference: &DocumentReference,
    ) -> Result<AnalysisResult, PipelineError> {
        // Step 1: Fetch. The bytes only prove the document exists; extraction
        // re-reads it from the store.
        let bytes = self
            .bounded(Stage::Fetch, self.store.fetch(reference))
            .await
            .map_err(|e| match e {
                StageError::Store(StoreError::NotFound { reference }) => {
                    PipelineError::MissingInput { reference }
                }
                other => PipelineError::at(Stage::Fetch, other),
            })?;
        info!(state = %PipelineState::Fetched, bytes = bytes.len(), "Document fetched");
        drop(bytes);

        // Step 2: Extract
        let resume_text = self
            .bounded(Stage::Extract, self.extractor.extract_text(reference))
            .await
            .map_err(|e| PipelineError::at(Stage::Extract, e))?;
        info!(
            state = %PipelineState::Extracted,
            text_len = resume_text.len(),
            "Text extracted"
        );

        // Step 3: Recognize and generate concurrently; join waits for both.
        let text = resume_text.as_str();
        let (entities, feedback) = tokio::join!(
            async {
                let entities = self
                    .bounded(
                        Stage::Recognize,
                        self.recognizer
                            .detect_entities(text, &self.settings.language),
                    )
                    .await?;
                info!(
                    state = %PipelineState::EntitiesDone,
                    entities = entities.len(),
                    "Entities detected"
                );
                Ok::<_, StageError>(entities)
            },
            async {
                let feedback = self
                    .bounded(Stage::Generate, self.feedback.generate_feedback(text))
                    .await?;
                info!(state = %PipelineState::FeedbackDone, "Feedback generated");
                Ok::<_, StageError>(feedback)
            },
        );

        // Both branches have settled; report the earlier stage first.
        let skills = entities.map_err(|e| PipelineError::at(Stage::Recognize, e))?;
        let feedback = feedback.map_err(|e| PipelineError::at(Stage::Generate, e))?;

        // Step 4: Assemble
        let result = AnalysisResult {
            resume_text,
            skills,
            feedback,
        };
        info!(state = %PipelineState::Assembled, "Result assembled");
        Ok(result)
    }

    /// Awaits one external call under the stage timeout.
    async fn bounded<T, E>(
        &self,
        stage: Stage,
        call: impl Future<Output = Result<T, E>>,
    ) -> Result<T, StageError>
    where
        E: Into<StageError>,
    {
        info!(%stage, "Stage started");
        match tokio::time::timeout(self.settings.stage_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(StageError::TimedOut {
                after: self.settings.stage_timeout,
            }),
        }
    }
}
