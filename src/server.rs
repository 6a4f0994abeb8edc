use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::agents::CsvAgent;
use crate::error::AppError;
use crate::query::QueryConfig;
use crate::reply::ModelReply;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<CsvAgent>,
    /// Format directive wrapped around every incoming question.
    pub query: QueryConfig,
}

#[derive(Deserialize)]
pub struct Prompt {
    question: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PromptResponse {
    pub answer: String,
    pub reply: Option<ModelReply>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Upstream provider error")]
    Upstream,
    #[error("Upstream provider timed out")]
    Timeout,
    #[error("Internal server error")]
    Internal,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(msg) => Self::Validation(msg),
            AppError::Timeout(_) => {
                error!("Provider timeout: {:?}", err);
                Self::Timeout
            }
            AppError::Provider(_) | AppError::ProviderMessage(_) | AppError::LlmParsing(_) => {
                error!("Provider error: {:?}", err);
                Self::Upstream
            }
            _ => {
                error!("Internal error: {:?}", err);
                Self::Internal
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    status: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream => StatusCode::BAD_GATEWAY,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.to_string(),
            status: "error".to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/prompt", post(prompt))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn prompt(
    State(state): State<AppState>,
    Json(json): Json<Prompt>,
) -> Result<Json<PromptResponse>, ApiError> {
    if json.question.trim().is_empty() {
        return Err(ApiError::Validation("question must not be empty".into()));
    }

    let query = state.query.clone().with_question(json.question);
    let answer = state.agent.prompt(&query.render()).await?;
    let reply = ModelReply::parse(&answer);

    Ok(Json(PromptResponse { answer, reply }))
}
