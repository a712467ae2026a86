//! Entity Recognition Service — named entities (skills, roles, organizations)
//! detected in the extracted text.

use async_trait::async_trait;
use aws_sdk_comprehend::error::DisplayErrorContext;
use aws_sdk_comprehend::types::LanguageCode;
use thiserror::Error;
use tracing::debug;

use crate::models::analysis::{Entity, EntityCategory};

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Error)]
#[error("entity recognition failed: {0}")]
pub struct RecognitionError(pub String);

#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Returns entities in backend order. Empty input yields an empty list.
    async fn detect_entities(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Vec<Entity>, RecognitionError>;
}

/// Untyped entity as it arrives from the backend, before narrowing.
#[derive(Debug, Clone)]
pub struct WireEntity<'a> {
    pub text: Option<&'a str>,
    pub category: Option<&'a str>,
    pub score: Option<f32>,
    pub begin_offset: Option<i32>,
    pub end_offset: Option<i32>,
}

impl WireEntity<'_> {
    pub fn narrow(&self, index: usize) -> Result<Entity, RecognitionError> {
        let missing = |field: &str| RecognitionError(format!("entity {index} is missing {field}"));

        let text = self.text.ok_or_else(|| missing("text"))?;
        let category_name = self.category.ok_or_else(|| missing("type"))?;
        let category = EntityCategory::from_wire(category_name).ok_or_else(|| {
            RecognitionError(format!("entity {index} has unknown type '{category_name}'"))
        })?;
        let score = self.score.ok_or_else(|| missing("score"))?;
        let begin_offset = offset(self.begin_offset.ok_or_else(|| missing("begin offset"))?, index)?;
        let end_offset = offset(self.end_offset.ok_or_else(|| missing("end offset"))?, index)?;
        if end_offset < begin_offset {
            return Err(RecognitionError(format!(
                "entity {index} ends ({end_offset}) before it begins ({begin_offset})"
            )));
        }

        Ok(Entity {
            text: text.to_string(),
            category,
            score,
            begin_offset,
            end_offset,
        })
    }
}

fn offset(raw: i32, index: usize) -> Result<usize, RecognitionError> {
    usize::try_from(raw)
        .map_err(|_| RecognitionError(format!("entity {index} has negative offset {raw}")))
}

/// Amazon Comprehend `DetectEntities`.
pub struct ComprehendRecognizer {
    client: aws_sdk_comprehend::Client,
}

impl ComprehendRecognizer {
    pub fn new(client: aws_sdk_comprehend::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EntityRecognizer for ComprehendRecognizer {
    async fn detect_entities(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Vec<Entity>, RecognitionError> {
        // Comprehend rejects empty input outright.
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let output = self
            .client
            .detect_entities()
            .text(text)
            .language_code(LanguageCode::from(language))
            .send()
            .await
            .map_err(|e| RecognitionError(DisplayErrorContext(&e).to_string()))?;

        let entities = output
            .entities()
            .iter()
            .enumerate()
            .map(|(index, entity)| {
                WireEntity {
                    text: entity.text(),
                    category: entity.r#type().map(|t| t.as_str()),
                    score: entity.score(),
                    begin_offset: entity.begin_offset(),
                    end_offset: entity.end_offset(),
                }
                .narrow(index)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Comprehend detected {} entities", entities.len());
        Ok(entities)
    }
}
