//! Text Extraction Service — turns a stored document into plain text lines.
//!
//! The engine reads the document from the store itself; only the reference is
//! passed. The engine's block list is narrowed into [`TextBlock`]s and the
//! service keeps line blocks, in the order the engine returned them.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_textract::error::DisplayErrorContext;
use aws_sdk_textract::types::{BlockType, Document, S3Object};
use thiserror::Error;
use tracing::debug;

use crate::models::analysis::DocumentReference;

#[derive(Debug, Error)]
#[error("text extraction failed: {0}")]
pub struct ExtractionError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Page,
    Line,
    Word,
    Table,
    Cell,
    Other,
}

/// One unit of recognized content as returned by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub text: Option<String>,
}

#[cfg(test)]
impl TextBlock {
    pub fn line(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Line,
            text: Some(text.into()),
        }
    }

    pub fn word(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Word,
            text: Some(text.into()),
        }
    }
}

#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    async fn detect_blocks(
        &self,
        reference: &DocumentReference,
    ) -> Result<Vec<TextBlock>, ExtractionError>;
}

#[derive(Clone)]
pub struct TextExtractor {
    engine: Arc<dyn ExtractionEngine>,
}

impl TextExtractor {
    pub fn new(engine: Arc<dyn ExtractionEngine>) -> Self {
        Self { engine }
    }

    pub async fn extract_text(&self, reference: &DocumentReference) -> Result<String, ExtractionError> {
        let blocks = self.engine.detect_blocks(reference).await?;
        join_lines(&blocks)
    }
}

/// Concatenates line blocks, each terminated by `\n`. Other block kinds are
/// skipped. A line block with no text is treated as a malformed response.
pub fn join_lines(blocks: &[TextBlock]) -> Result<String, ExtractionError> {
    let mut text = String::new();
    for (index, block) in blocks.iter().enumerate() {
        if block.kind != BlockKind::Line {
            continue;
        }
        let line = block
            .text
            .as_deref()
            .ok_or_else(|| ExtractionError(format!("line block {index} has no text")))?;
        text.push_str(line);
        text.push('\n');
    }
    Ok(text)
}

/// Amazon Textract `DetectDocumentText` against an S3 object.
pub struct TextractEngine {
    client: aws_sdk_textract::Client,
}

impl TextractEngine {
    pub fn new(client: aws_sdk_textract::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExtractionEngine for TextractEngine {
    async fn detect_blocks(
        &self,
        reference: &DocumentReference,
    ) -> Result<Vec<TextBlock>, ExtractionError> {
        let document = Document::builder()
            .s3_object(
                S3Object::builder()
                    .bucket(reference.bucket())
                    .name(reference.key())
                    .build(),
            )
            .build();

        let output = self
            .client
            .detect_document_text()
            .document(document)
            .send()
            .await
            .map_err(|e| ExtractionError(DisplayErrorContext(&e).to_string()))?;

        let blocks = output
            .blocks()
            .iter()
            .enumerate()
            .map(|(index, block)| {
                let kind = match block.block_type() {
                    Some(BlockType::Page) => BlockKind::Page,
                    Some(BlockType::Line) => BlockKind::Line,
                    Some(BlockType::Word) => BlockKind::Word,
                    Some(BlockType::Table) => BlockKind::Table,
                    Some(BlockType::Cell) => BlockKind::Cell,
                    Some(_) => BlockKind::Other,
                    None => {
                        return Err(ExtractionError(format!(
                            "block {index} is missing its block type"
                        )))
                    }
                };
                Ok(TextBlock {
                    kind,
                    text: block.text().map(String::from),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Textract returned {} blocks for {}", blocks.len(), reference);
        Ok(blocks)
    }
}
