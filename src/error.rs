use std::path::PathBuf;

use async_openai::error::OpenAIError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt index at {}: {reason}", path.display())]
    CorruptIndex { path: PathBuf, reason: String },
    #[error("Provider error: {0}")]
    Provider(#[from] OpenAIError),
    #[error("Provider error: {0}")]
    ProviderMessage(String),
    #[error("LLM parsing error: {0}")]
    LlmParsing(String),
    #[error("Retrieval error: {0}")]
    Retrieval(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AppError {
    pub fn corrupt_index(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::CorruptIndex {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether a provider call that failed this way is worth repeating.
    /// Auth failures and malformed requests are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Provider(OpenAIError::Reqwest(_)) => true,
            Self::Provider(OpenAIError::ApiError(api)) => matches!(
                api.r#type.as_deref(),
                Some("server_error" | "requests" | "tokens")
            ),
            Self::Provider(_) => false,
            Self::ProviderMessage(_) | Self::Timeout(_) => true,
            _ => false,
        }
    }
}
