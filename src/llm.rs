use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use async_trait::async_trait;
use tracing::debug;

use crate::error::AppError;

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends one system + user exchange and returns the completion text as-is.
    async fn complete(&self, system: &str, user: &str) -> Result<String, AppError>;
}

#[derive(Clone)]
pub struct OpenAIChat {
    client: OpenAIClient<OpenAIConfig>,
    model: String,
}

impl OpenAIChat {
    pub fn new(client: OpenAIClient<OpenAIConfig>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAIChat {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AppError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(0.0)
            .messages(vec![
                ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(system)
                        .build()?,
                ),
                ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(user)
                        .build()?,
                ),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;

        debug!(
            model = %self.model,
            usage = ?response.usage,
            "Received chat completion"
        );

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::LlmParsing("No content found in LLM response".into()))
    }
}
