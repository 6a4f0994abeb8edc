mod common;

use std::sync::Arc;

use std::time::Duration;

use common::{write_corpus, CannedModel, CountingEmbedder, FlakyEmbedder, SAMPLE_CSV};
use csv_rag_query::agents::CallPolicy;
use csv_rag_query::driver::{prepare_agent, run_once, RunSettings};
use csv_rag_query::index::{CachePolicy, IndexSource};
use csv_rag_query::query::{OutputFormat, QueryConfig, POKEMON_SCHEMA};

fn settings(dir: &std::path::Path) -> RunSettings {
    RunSettings {
        corpus_path: dir.join("pokemon.csv"),
        index_path: dir.join("pokemon.index"),
        cache_policy: CachePolicy::VerifyHash,
        top_k: 4,
        query: QueryConfig {
            question: "how many pokemon are generation 2?".into(),
            format: OutputFormat::Sql {
                schema: POKEMON_SCHEMA.into(),
            },
        },
    }
}

#[tokio::test]
async fn response_is_passed_through_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_corpus(dir.path(), "pokemon", SAMPLE_CSV);
    let raw = "  {\"sql\": \"select count(*) from pokemon where generation=2;\"}\n\nnot json at all ";
    let model = Arc::new(CannedModel::new(raw));

    let outcome = run_once(
        &settings(dir.path()),
        Arc::new(CountingEmbedder::new()),
        model.clone(),
    )
    .await
    .expect("run");

    assert_eq!(outcome.response, raw);
    assert_eq!(outcome.index_source, IndexSource::Built);
}

#[tokio::test]
async fn prompt_carries_query_and_retrieved_context() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_corpus(dir.path(), "pokemon", SAMPLE_CSV);
    let model = Arc::new(CannedModel::new("{\"answer\": \"I do not know.\"}"));

    run_once(
        &settings(dir.path()),
        Arc::new(CountingEmbedder::new()),
        model.clone(),
    )
    .await
    .expect("run");

    let seen = model.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let prompt = &seen[0];
    assert!(prompt.contains("Lugia,Psychic,Flying"));
    assert!(prompt.contains("For database schema as '"));
    assert!(prompt.contains("how many pokemon are generation 2?\nHelpful Answer:"));
}

#[tokio::test]
async fn repeated_runs_reuse_the_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_corpus(dir.path(), "pokemon", SAMPLE_CSV);
    let embedder = Arc::new(CountingEmbedder::new());
    let model = Arc::new(CannedModel::new("ok"));

    let first = run_once(&settings(dir.path()), embedder.clone(), model.clone())
        .await
        .expect("first run");
    let embedded_after_first = embedder.text_count();
    let second = run_once(&settings(dir.path()), embedder.clone(), model)
        .await
        .expect("second run");

    assert_eq!(first.index_source, IndexSource::Built);
    assert_eq!(second.index_source, IndexSource::Loaded);
    // Only the query itself is embedded on the second run.
    assert_eq!(embedder.text_count(), embedded_after_first + 1);
}

#[tokio::test]
async fn index_build_retries_transient_embedding_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_corpus(dir.path(), "pokemon", SAMPLE_CSV);
    let embedder = Arc::new(FlakyEmbedder::new(1));

    let (_, source) = prepare_agent(
        &settings(dir.path()),
        embedder.clone(),
        Arc::new(CannedModel::new("unused")),
        CallPolicy::new(Duration::from_secs(5), 3),
    )
    .await
    .expect("index built after retry");

    assert_eq!(source, IndexSource::Built);
    assert_eq!(embedder.call_count(), 2);
    assert!(dir.path().join("pokemon.index").join("meta.json").exists());
}

#[tokio::test]
async fn one_shot_runs_do_not_retry_index_builds() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_corpus(dir.path(), "pokemon", SAMPLE_CSV);
    let embedder = Arc::new(FlakyEmbedder::new(1));

    let result = run_once(
        &settings(dir.path()),
        embedder.clone(),
        Arc::new(CannedModel::new("unused")),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(embedder.call_count(), 1);
}
