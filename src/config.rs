use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppError;
use crate::index::CachePolicy;
use crate::query::{OutputFormat, QueryConfig};

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    /// Empty when unset; the provider then rejects the first request.
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_corpus_name")]
    pub corpus_name: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_prompt_model")]
    pub prompt_model: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub cache_policy: CachePolicy,
    #[serde(default = "default_question")]
    pub question: String,
    #[serde(default)]
    pub output_format: OutputFormatKind,
    /// Column schema handed to the model when translating questions into SQL.
    #[serde(default = "default_sql_schema")]
    pub sql_schema: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

#[derive(Clone, Copy, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatKind {
    #[default]
    Sql,
    Chart,
    Plot,
    Plain,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_data_dir() -> String {
    ".".to_string()
}

fn default_corpus_name() -> String {
    "pokemon".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_prompt_model() -> String {
    "gpt-4o".to_string()
}

fn default_top_k() -> usize {
    4
}

fn default_question() -> String {
    "how many pokemon are generation 2?".to_string()
}

fn default_sql_schema() -> String {
    crate::query::POKEMON_SCHEMA.to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> usize {
    3
}

impl AppConfig {
    pub fn corpus_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(format!("{}.csv", self.corpus_name))
    }

    pub fn index_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(format!("{}.index", self.corpus_name))
    }

    pub fn query(&self) -> QueryConfig {
        let format = match self.output_format {
            OutputFormatKind::Sql => OutputFormat::Sql {
                schema: self.sql_schema.clone(),
            },
            OutputFormatKind::Chart => OutputFormat::Chart,
            OutputFormatKind::Plot => OutputFormat::Plot,
            OutputFormatKind::Plain => OutputFormat::Plain,
        };
        QueryConfig {
            question: self.question.clone(),
            format,
        }
    }
}

pub fn get_config() -> Result<AppConfig, AppError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    Ok(config.try_deserialize()?)
}
