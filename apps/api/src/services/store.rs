//! Document Store Client — reads raw document bytes from S3.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::models::analysis::DocumentReference;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {reference} does not exist")]
    NotFound { reference: DocumentReference },

    #[error("store access failed: {0}")]
    Access(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, reference: &DocumentReference) -> Result<Bytes, StoreError>;
}

pub struct S3DocumentStore {
    client: aws_sdk_s3::Client,
}

impl S3DocumentStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentStore for S3DocumentStore {
    async fn fetch(&self, reference: &DocumentReference) -> Result<Bytes, StoreError> {
        let output = self
            .client
            .get_object()
            .bucket(reference.bucket())
            .key(reference.key())
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    StoreError::NotFound {
                        reference: reference.clone(),
                    }
                } else {
                    StoreError::Access(DisplayErrorContext(&service_error).to_string())
                }
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Access(format!("failed to read object body: {e}")))?
            .into_bytes();

        debug!("Read {} bytes from {}", body.len(), reference);
        Ok(body)
    }
}
