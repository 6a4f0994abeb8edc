use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::agents::{CallPolicy, CsvAgent};
use crate::config::AppConfig;
use crate::embeddings::Embedder;
use crate::error::AppError;
use crate::index::{CachePolicy, IndexSource, IndexStore};
use crate::llm::LanguageModel;
use crate::query::QueryConfig;
use crate::reply::ModelReply;
use crate::retriever::Retriever;

/// Everything a single question needs, detached from where it came from.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub corpus_path: PathBuf,
    pub index_path: PathBuf,
    pub cache_policy: CachePolicy,
    pub top_k: usize,
    pub query: QueryConfig,
}

impl From<&AppConfig> for RunSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            corpus_path: config.corpus_path(),
            index_path: config.index_path(),
            cache_policy: config.cache_policy,
            top_k: config.top_k,
            query: config.query(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub response: String,
    pub index_source: IndexSource,
}

/// Acquires (or builds) the index and wires it into an agent.
pub async fn prepare_agent(
    settings: &RunSettings,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LanguageModel>,
    policy: CallPolicy,
) -> Result<(CsvAgent, IndexSource), AppError> {
    let store = IndexStore::open(&settings.index_path).with_call_policy(policy);
    let (index, source) = store
        .acquire(&settings.corpus_path, embedder.as_ref(), settings.cache_policy)
        .await?;

    info!(
        source = ?source,
        segments = index.len(),
        "Vector index ready"
    );

    let retriever = Retriever::new(Arc::new(index), embedder).with_top_k(settings.top_k);
    Ok((CsvAgent::new(retriever, llm).with_policy(policy), source))
}

/// One pass: index, retrieve, ask, return. The response is not post-processed.
pub async fn run_once(
    settings: &RunSettings,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LanguageModel>,
) -> Result<RunOutcome, AppError> {
    let (agent, index_source) =
        prepare_agent(settings, embedder, llm, CallPolicy::none()).await?;

    let response = agent.prompt(&settings.query.render()).await?;

    match ModelReply::parse(&response) {
        Some(reply) => debug!(kind = reply.kind(), "Response matches a requested shape"),
        None => debug!("Response does not match any requested shape"),
    }

    Ok(RunOutcome {
        response,
        index_source,
    })
}
