//! In-memory stage clients for tests. Each records how often it was called.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Barrier;
use tokio::time::Instant;

use crate::models::analysis::{DocumentReference, Entity, EntityCategory};
use crate::services::entities::{EntityRecognizer, RecognitionError};
use crate::services::extraction::{ExtractionEngine, ExtractionError, TextBlock};
use crate::services::feedback::{GenerationError, GenerationParams, ModelBackend, ModelResponse};
use crate::services::store::{DocumentStore, StoreError};

#[derive(Default)]
pub struct FakeDocumentStore {
    documents: HashMap<DocumentReference, Bytes>,
    access_error: Option<String>,
    calls: AtomicUsize,
}

impl FakeDocumentStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_document(reference: &DocumentReference, content: &'static [u8]) -> Self {
        let mut documents = HashMap::new();
        documents.insert(reference.clone(), Bytes::from_static(content));
        Self {
            documents,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            access_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for FakeDocumentStore {
    async fn fetch(&self, reference: &DocumentReference) -> Result<Bytes, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.access_error {
            return Err(StoreError::Access(message.clone()));
        }
        self.documents
            .get(reference)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                reference: reference.clone(),
            })
    }
}

pub struct FakeExtractionEngine {
    outcome: Result<Vec<TextBlock>, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeExtractionEngine {
    /// Emits each line as a LINE block followed by its WORD blocks, the way
    /// Textract interleaves them.
    pub fn with_lines(lines: &[&str]) -> Self {
        let blocks = lines
            .iter()
            .flat_map(|line| {
                std::iter::once(TextBlock::line(*line))
                    .chain(line.split_whitespace().map(TextBlock::word))
            })
            .collect();
        Self::with_blocks(blocks)
    }

    pub fn with_blocks(blocks: Vec<TextBlock>) -> Self {
        Self {
            outcome: Ok(blocks),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionEngine for FakeExtractionEngine {
    async fn detect_blocks(
        &self,
        _reference: &DocumentReference,
    ) -> Result<Vec<TextBlock>, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone().map_err(ExtractionError)
    }
}

/// Reports every occurrence of the configured terms, with byte offsets into
/// the input text.
pub struct FakeEntityRecognizer {
    terms: Vec<(String, EntityCategory)>,
    error: Option<String>,
    gate: Option<Arc<Barrier>>,
    calls: AtomicUsize,
    last_language: Mutex<Option<String>>,
    started_at: Mutex<Option<Instant>>,
}

impl FakeEntityRecognizer {
    pub fn matching(terms: &[(&str, EntityCategory)]) -> Self {
        Self {
            terms: terms
                .iter()
                .map(|(term, category)| (term.to_string(), *category))
                .collect(),
            error: None,
            gate: None,
            calls: AtomicUsize::new(0),
            last_language: Mutex::new(None),
            started_at: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::matching(&[])
        }
    }

    /// Waits on `gate` before answering.
    pub fn gated(mut self, gate: Arc<Barrier>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_language(&self) -> Option<String> {
        self.last_language.lock().unwrap().clone()
    }

    pub fn started_at(&self) -> Option<Instant> {
        *self.started_at.lock().unwrap()
    }
}

#[async_trait]
impl EntityRecognizer for FakeEntityRecognizer {
    async fn detect_entities(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Vec<Entity>, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.started_at.lock().unwrap() = Some(Instant::now());
        *self.last_language.lock().unwrap() = Some(language.to_string());

        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        if let Some(message) = &self.error {
            return Err(RecognitionError(message.clone()));
        }

        let mut entities: Vec<Entity> = self
            .terms
            .iter()
            .flat_map(|(term, category)| {
                text.match_indices(term.as_str()).map(move |(begin, matched)| Entity {
                    text: matched.to_string(),
                    category: *category,
                    score: 0.9,
                    begin_offset: begin,
                    end_offset: begin + matched.len(),
                })
            })
            .collect();
        entities.sort_by_key(|e| e.begin_offset);
        Ok(entities)
    }
}

pub struct FakeModelBackend {
    outcome: Result<Option<String>, String>,
    delay: Option<Duration>,
    gate: Option<Arc<Barrier>>,
    calls: AtomicUsize,
    finished: AtomicBool,
    last_call: Mutex<Option<(String, GenerationParams)>>,
}

impl FakeModelBackend {
    pub fn responding(completion: Option<&str>) -> Self {
        Self {
            outcome: Ok(completion.map(String::from)),
            delay: None,
            gate: None,
            calls: AtomicUsize::new(0),
            finished: AtomicBool::new(false),
            last_call: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            ..Self::responding(None)
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Waits on `gate` before answering.
    pub fn gated(mut self, gate: Arc<Barrier>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// True once an invocation has run to completion.
    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<(String, GenerationParams)> {
        self.last_call.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelBackend for FakeModelBackend {
    async fn invoke_model(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ModelResponse, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap() = Some((prompt.to_string(), *params));

        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.finished.store(true, Ordering::SeqCst);

        match &self.outcome {
            Ok(completion) => Ok(ModelResponse {
                completion: completion.clone(),
            }),
            Err(message) => Err(GenerationError::Invocation(message.clone())),
        }
    }
}
