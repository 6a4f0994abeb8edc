// Retrieval-augmented answering over the indexed CSV
use std::sync::Arc;

use tracing::info;

use crate::error::AppError;
use crate::llm::LanguageModel;
pub use crate::policy::CallPolicy;
use crate::retriever::{RetrievedSegment, Retriever};

pub static SYSTEM_MESSAGE: &str = "
    You are a world-class data analyst, specialising in analysing comma-delimited CSV files.

	Your job is to analyse some CSV snippets and determine what the results are for the question that the user is asking.

	You should aim to be concise. If you don't know something, don't make it up but say 'I don't know.'.
    ";

#[derive(Clone)]
pub struct CsvAgent {
    retriever: Retriever,
    llm: Arc<dyn LanguageModel>,
    policy: CallPolicy,
}

impl CsvAgent {
    pub fn new(retriever: Retriever, llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            retriever,
            llm,
            policy: CallPolicy::none(),
        }
    }

    pub fn with_policy(mut self, policy: CallPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Retrieves context for `prompt`, asks the model, and returns its text untouched.
    pub async fn prompt(&self, prompt: &str) -> Result<String, AppError> {
        let segments = self
            .policy
            .run("retrieval", || self.retriever.retrieve(prompt))
            .await?;

        let input = compose_prompt(prompt, &segments);

        let res = self
            .policy
            .run("completion", || self.llm.complete(SYSTEM_MESSAGE, &input))
            .await?;

        info!(
            context_segments = segments.len(),
            response_chars = res.chars().count(),
            "Retrieved result from prompt"
        );

        Ok(res)
    }
}

/// Stuffs every retrieved segment into one question-answering prompt.
pub fn compose_prompt(question: &str, segments: &[RetrievedSegment]) -> String {
    let context = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n{context}\n\nQuestion: {question}\nHelpful Answer:"
    )
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn hit(ordinal: usize, text: &str) -> RetrievedSegment {
        RetrievedSegment {
            id: Uuid::new_v4(),
            ordinal,
            text: text.into(),
            score: 0.5,
        }
    }

    #[test]
    fn prompt_stuffs_segments_in_retrieval_order() {
        let prompt = compose_prompt(
            "how many?",
            &[hit(3, "Chikorita,Grass"), hit(1, "Bulbasaur,Grass")],
        );
        assert!(prompt.starts_with("Use the following pieces of context"));
        assert!(prompt.contains("\n\nChikorita,Grass\n\nBulbasaur,Grass\n\n"));
        assert!(prompt.ends_with("Question: how many?\nHelpful Answer:"));
    }
}
