use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::models::analysis::DocumentReference;
use crate::services::entities::RecognitionError;
use crate::services::extraction::ExtractionError;
use crate::services::feedback::GenerationError;
use crate::services::store::StoreError;

/// One step of the linear pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Extract,
    Recognize,
    Generate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Extract => "extract",
            Stage::Recognize => "recognize",
            Stage::Generate => "generate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orchestrator states. `Failed` is reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Fetched,
    Extracted,
    EntitiesDone,
    FeedbackDone,
    Assembled,
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Start => "START",
            PipelineState::Fetched => "FETCHED",
            PipelineState::Extracted => "EXTRACTED",
            PipelineState::EntitiesDone => "ENTITIES_DONE",
            PipelineState::FeedbackDone => "FEEDBACK_DONE",
            PipelineState::Assembled => "ASSEMBLED",
            PipelineState::Done => "DONE",
            PipelineState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Underlying cause of a stage failure.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("timed out after {after:?}")]
    TimedOut { after: Duration },
}

/// Terminal failure of one pipeline invocation. No partial result accompanies it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input document {reference} was not found")]
    MissingInput { reference: DocumentReference },

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: StageError,
    },
}

impl PipelineError {
    pub fn at(stage: Stage, source: impl Into<StageError>) -> Self {
        PipelineError::Stage {
            stage,
            source: source.into(),
        }
    }

    /// The stage the failure originated in. A missing input is a fetch failure.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::MissingInput { .. } => Stage::Fetch,
            PipelineError::Stage { stage, .. } => *stage,
        }
    }

    /// Missing input will not appear on its own; every other failure may
    /// succeed when the caller re-invokes the pipeline.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, PipelineError::MissingInput { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            PipelineError::Stage {
                source: StageError::TimedOut { .. },
                ..
            }
        )
    }
}
