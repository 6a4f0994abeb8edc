use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::chunking::Chunker;
use crate::embeddings::{embed_all, Embedder};
use crate::error::AppError;
use crate::files::Corpus;
use crate::policy::CallPolicy;

const META_FILE: &str = "meta.json";
const SEGMENTS_FILE: &str = "segments.json";

/// How an existing index artifact is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Load whatever is on disk; never look at the corpus again.
    Trust,
    /// Rebuild when the corpus hash or chunk size no longer matches.
    #[default]
    VerifyHash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    Loaded,
    Built,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub model: String,
    pub dims: usize,
    pub chunk_size: usize,
    pub corpus_sha256: String,
    pub segment_count: usize,
    pub built_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedSegment {
    pub id: Uuid,
    pub ordinal: usize,
    pub text: String,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSegment {
    pub id: Uuid,
    pub ordinal: usize,
    pub text: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    pub meta: IndexMeta,
    pub segments: Vec<IndexedSegment>,
}

impl VectorIndex {
    /// Chunks the corpus, embeds every segment and assembles the index in memory.
    pub async fn build(
        corpus: &Corpus,
        chunker: &Chunker,
        embedder: &dyn Embedder,
        policy: &CallPolicy,
    ) -> Result<Self, AppError> {
        let texts = chunker.split(&corpus.contents);
        if texts.is_empty() {
            return Err(AppError::Validation(format!(
                "Corpus {} has no text to index",
                corpus.path.display()
            )));
        }

        info!(
            segments = texts.len(),
            chunk_size = chunker.chunk_size(),
            model = embedder.model(),
            "Embedding corpus segments"
        );

        let vectors = embed_all(embedder, &texts, policy).await?;

        let dims = vectors.first().map(Vec::len).unwrap_or_default();
        if let Some((ordinal, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dims) {
            return Err(AppError::LlmParsing(format!(
                "Embedding dimension mismatch across segments: expected={dims}; got={}; ordinal={ordinal}",
                v.len()
            )));
        }

        let segments: Vec<IndexedSegment> = texts
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(ordinal, (text, vector))| IndexedSegment {
                id: Uuid::new_v4(),
                ordinal,
                text,
                vector,
            })
            .collect();

        Ok(Self {
            meta: IndexMeta {
                model: embedder.model().to_string(),
                dims,
                chunk_size: chunker.chunk_size(),
                corpus_sha256: corpus.sha256.clone(),
                segment_count: segments.len(),
                built_at: Utc::now(),
            },
            segments,
        })
    }

    pub fn load(dir: &Path) -> Result<Self, AppError> {
        let meta: IndexMeta = read_json(&dir.join(META_FILE))?;
        let segments: Vec<IndexedSegment> = read_json(&dir.join(SEGMENTS_FILE))?;

        if segments.len() != meta.segment_count {
            return Err(AppError::corrupt_index(
                dir,
                format!(
                    "meta lists {} segments, found {}",
                    meta.segment_count,
                    segments.len()
                ),
            ));
        }
        if let Some(bad) = segments.iter().find(|s| s.vector.len() != meta.dims) {
            return Err(AppError::corrupt_index(
                dir,
                format!(
                    "segment {} has {} dims, expected {}",
                    bad.ordinal,
                    bad.vector.len(),
                    meta.dims
                ),
            ));
        }

        Ok(Self { meta, segments })
    }

    /// Writes into a sibling `.tmp` directory and renames it into place, so a
    /// failed save never leaves a half-written artifact at `dir`.
    pub fn save(&self, dir: &Path) -> Result<(), AppError> {
        let tmp = tmp_dir_for(dir);
        if tmp.exists() {
            fs::remove_dir_all(&tmp)?;
        }
        fs::create_dir_all(&tmp)?;

        let written = write_json(&tmp.join(META_FILE), &self.meta)
            .and_then(|_| write_json(&tmp.join(SEGMENTS_FILE), &self.segments));
        if let Err(e) = written {
            let _ = fs::remove_dir_all(&tmp);
            return Err(e);
        }

        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        fs::rename(&tmp, dir)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Cosine-similarity search. Ties keep corpus order.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredSegment>, AppError> {
        if query.len() != self.meta.dims {
            return Err(AppError::Retrieval(format!(
                "Query embedding dims do not match index dims: index_dims={}; query_dims={}",
                self.meta.dims,
                query.len()
            )));
        }

        let qnorm = l2_norm(query);
        if qnorm == 0.0 {
            return Err(AppError::Retrieval("Query embedding norm is zero".into()));
        }

        let mut hits: Vec<(&IndexedSegment, f32)> = self
            .segments
            .iter()
            .filter_map(|segment| {
                let vnorm = l2_norm(&segment.vector);
                (vnorm != 0.0)
                    .then(|| (segment, cosine_similarity(query, &segment.vector, qnorm, vnorm)))
            })
            .collect();

        hits.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.ordinal.cmp(&b.0.ordinal))
        });
        hits.truncate(top_k.max(1));

        Ok(hits
            .into_iter()
            .map(|(segment, score)| ScoredSegment {
                id: segment.id,
                ordinal: segment.ordinal,
                text: segment.text.clone(),
                score,
            })
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
    chunker: Chunker,
    call_policy: CallPolicy,
}

impl IndexStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunker: Chunker::default(),
            call_policy: CallPolicy::none(),
        }
    }

    /// Timeout and retry for the embedding calls made while building.
    pub fn with_call_policy(mut self, policy: CallPolicy) -> Self {
        self.call_policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the cached index when it is usable, otherwise builds and persists
    /// a fresh one from the corpus at `corpus_path`.
    pub async fn acquire(
        &self,
        corpus_path: &Path,
        embedder: &dyn Embedder,
        policy: CachePolicy,
    ) -> Result<(VectorIndex, IndexSource), AppError> {
        if self.exists() {
            let index = VectorIndex::load(&self.path)?;
            match policy {
                CachePolicy::Trust => {
                    info!(path = %self.path.display(), "Vector index exists, loading");
                    return Ok((index, IndexSource::Loaded));
                }
                CachePolicy::VerifyHash => match Corpus::load(corpus_path) {
                    Ok(corpus) if self.is_fresh(&index, &corpus) => {
                        info!(path = %self.path.display(), "Vector index exists, loading");
                        return Ok((index, IndexSource::Loaded));
                    }
                    Ok(corpus) => {
                        warn!(
                            path = %self.path.display(),
                            stored = %index.meta.corpus_sha256,
                            current = %corpus.sha256,
                            "Vector index is stale, rebuilding"
                        );
                        return self.build(&corpus, embedder).await;
                    }
                    Err(AppError::FileNotFound { path }) => {
                        warn!(
                            corpus = %path.display(),
                            "Corpus missing; using cached vector index unverified"
                        );
                        return Ok((index, IndexSource::Loaded));
                    }
                    Err(e) => return Err(e),
                },
            }
        }

        let corpus = Corpus::load(corpus_path)?;
        self.build(&corpus, embedder).await
    }

    fn is_fresh(&self, index: &VectorIndex, corpus: &Corpus) -> bool {
        index.meta.corpus_sha256 == corpus.sha256
            && index.meta.chunk_size == self.chunker.chunk_size()
    }

    async fn build(
        &self,
        corpus: &Corpus,
        embedder: &dyn Embedder,
    ) -> Result<(VectorIndex, IndexSource), AppError> {
        let index =
            VectorIndex::build(corpus, &self.chunker, embedder, &self.call_policy).await?;
        index.save(&self.path)?;
        info!(
            path = %self.path.display(),
            segments = index.len(),
            dims = index.meta.dims,
            "Vector index built and saved"
        );
        Ok((index, IndexSource::Built))
    }
}

pub fn tmp_dir_for(dir: &Path) -> PathBuf {
    let mut name = dir.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    dir.with_file_name(name)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, AppError> {
    let bytes = fs::read(path).map_err(|e| {
        AppError::corrupt_index(path, format!("failed to read: {e}"))
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::corrupt_index(path, format!("failed to decode: {e}")))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let json = serde_json::to_vec(value)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

pub fn cosine_similarity(a: &[f32], b: &[f32], a_norm: f32, b_norm: f32) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (a_norm * b_norm)
}
