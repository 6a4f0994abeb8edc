use std::sync::Arc;
use std::time::Duration;

use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use clap::{Parser, Subcommand};
use csv_rag_query::{
    agents::CallPolicy,
    config::{get_config, AppConfig},
    driver::{prepare_agent, run_once, RunSettings},
    embeddings::{Embedder, OpenAIEmbedder},
    llm::{LanguageModel, OpenAIChat},
    server::{router, AppState},
};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(about = "Ask questions about a CSV file through a cached vector index")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask one question and print the model's raw answer (default)
    Ask {
        /// Replaces the configured question; `-` reads it from stdin
        #[arg(long, short)]
        question: Option<String>,
    },
    /// Serve `POST /prompt` against the same index
    Serve {
        #[arg(long, env = "HTTP_PORT")]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .ok();

    let cli = Cli::parse();
    let config = get_config()?;
    if config.openai_api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set; provider calls will be rejected");
    }

    let client = OpenAIClient::with_config(
        OpenAIConfig::new()
            .with_api_key(&config.openai_api_key)
            .with_api_base(&config.openai_base_url),
    );
    let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::new(
        client.clone(),
        &config.embedding_model,
    ));
    let llm: Arc<dyn LanguageModel> = Arc::new(OpenAIChat::new(client, &config.prompt_model));

    match cli.command.unwrap_or(Command::Ask { question: None }) {
        Command::Ask { question } => ask(&config, question, embedder, llm).await,
        Command::Serve { port } => serve(&config, port, embedder, llm).await,
    }
}

async fn ask(
    config: &AppConfig,
    question: Option<String>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LanguageModel>,
) -> anyhow::Result<()> {
    let mut settings = RunSettings::from(config);
    match question.as_deref() {
        Some("-") => {
            let question = read_question(tokio::io::stdin()).await?;
            settings.query = settings.query.with_question(question);
        }
        Some(question) => settings.query = settings.query.with_question(question),
        None => {}
    }

    let outcome = run_once(&settings, embedder, llm).await?;

    info!(index = ?outcome.index_source, "Answer received");
    println!("{}", outcome.response);
    Ok(())
}

async fn read_question(mut input: impl AsyncRead + Unpin) -> anyhow::Result<String> {
    let mut question = String::new();
    input.read_to_string(&mut question).await?;
    let question = question.trim();
    if question.is_empty() {
        anyhow::bail!("no question on stdin");
    }
    Ok(question.to_string())
}

async fn serve(
    config: &AppConfig,
    port: Option<u16>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LanguageModel>,
) -> anyhow::Result<()> {
    let settings = RunSettings::from(config);
    let policy = CallPolicy::new(
        Duration::from_secs(config.request_timeout_secs),
        config.max_retries,
    );
    let (agent, _) = prepare_agent(&settings, embedder, llm, policy).await?;

    let state = AppState {
        agent: Arc::new(agent),
        query: settings.query,
    };

    let port = port.unwrap_or(config.http_port);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on 0.0.0.0:{}", port);
    axum::serve(listener, router(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stdin_question_is_trimmed() {
        let question = read_question(&b"  how many pokemon are generation 2?\n"[..])
            .await
            .expect("question");
        assert_eq!(question, "how many pokemon are generation 2?");
    }

    #[tokio::test]
    async fn blank_stdin_is_rejected() {
        assert!(read_question(&b" \n"[..]).await.is_err());
    }

    #[test]
    fn ask_is_the_default_command() {
        let cli = Cli::parse_from(["csv-rag-query"]);
        assert!(cli.command.is_none());
        let cli = Cli::parse_from(["csv-rag-query", "ask", "-q", "-"]);
        assert!(matches!(
            cli.command,
            Some(Command::Ask { question: Some(q) }) if q == "-"
        ));
    }
}
