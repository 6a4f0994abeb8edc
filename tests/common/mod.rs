#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use csv_rag_query::embeddings::Embedder;
use csv_rag_query::error::AppError;
use csv_rag_query::llm::LanguageModel;

pub const SAMPLE_CSV: &str = "Name,Type 1,Type 2,Total,HP,Attack,Defense,Sp. Atk,Sp. Def,Generation,Legendary
Bulbasaur,Grass,Poison,318,45,49,49,65,65,1,False
Charmander,Fire,,309,39,52,43,60,50,1,False
Chikorita,Grass,,318,45,49,65,49,65,2,False
Cyndaquil,Fire,,309,39,52,43,60,50,2,False
Lugia,Psychic,Flying,680,106,90,130,90,154,2,True
";

pub struct CountingEmbedder {
    pub texts_embedded: AtomicUsize,
    pub batches: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new() -> Self {
        Self {
            texts_embedded: AtomicUsize::new(0),
            batches: AtomicUsize::new(0),
        }
    }

    pub fn batch_count(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    pub fn text_count(&self) -> usize {
        self.texts_embedded.load(Ordering::SeqCst)
    }
}

/// Deterministic embedding: [len + 1, commas, digit '2' count]
pub fn fake_vector(input: &str) -> Vec<f32> {
    vec![
        input.len() as f32 + 1.0,
        input.matches(',').count() as f32,
        input.matches('2').count() as f32,
    ]
}

#[async_trait]
impl Embedder for CountingEmbedder {
    fn model(&self) -> &str {
        "mock-embedding"
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.texts_embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| fake_vector(t)).collect())
    }
}

pub struct FailingEmbedder {
    pub calls: AtomicUsize,
}

impl FailingEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for FailingEmbedder {
    fn model(&self) -> &str {
        "failing-embedding"
    }

    async fn embed_batch(&self, _texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::ProviderMessage("invalid api key".into()))
    }
}

/// Fails the first `failures` calls with a retryable error, then embeds.
pub struct FlakyEmbedder {
    pub failures: usize,
    pub calls: AtomicUsize,
}

impl FlakyEmbedder {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FlakyEmbedder {
    fn model(&self) -> &str {
        "mock-embedding"
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(AppError::ProviderMessage("service unavailable".into()));
        }
        Ok(texts.iter().map(|t| fake_vector(t)).collect())
    }
}

/// Returns a fixed completion and records every user message it saw.
pub struct CannedModel {
    pub answer: String,
    pub seen: Mutex<Vec<String>>,
}

impl CannedModel {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.into(),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LanguageModel for CannedModel {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, AppError> {
        self.seen.lock().unwrap().push(user.to_string());
        Ok(self.answer.clone())
    }
}

pub struct FailingModel;

#[async_trait]
impl LanguageModel for FailingModel {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, AppError> {
        Err(AppError::ProviderMessage("model overloaded".into()))
    }
}

/// Never answers within any reasonable deadline.
pub struct SlowModel;

#[async_trait]
impl LanguageModel for SlowModel {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, AppError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("too late".into())
    }
}

pub fn write_corpus(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(format!("{name}.csv"));
    std::fs::write(&path, contents).expect("write corpus");
    path
}
