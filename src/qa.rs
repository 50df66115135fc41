use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::api::shapes::{self, AnswerSource};
use crate::api::ApiClient;
use crate::docs::types::{DocId, Document};
use crate::error::{FetchError, ValidationError};

const QA_PATH: [&str; 2] = ["nlp", "qa"];

pub const QA_FAILURE_MESSAGE: &str = "Failed to get an answer. Please try again.";
pub const NO_ANSWER_MESSAGE: &str = "No answer found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QaStatus {
    Answered,
    Failed,
}

/// One question/answer round trip. Never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct QaExchange {
    pub doc_id: DocId,
    pub question: String,
    pub answer: String,
    pub status: QaStatus,
    pub sources: Vec<AnswerSource>,
    pub asked_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct QaRequest<'a> {
    question: &'a str,
    doc_id: &'a str,
}

pub struct QaClient {
    api: Arc<ApiClient>,
    top_k: u32,
}

impl QaClient {
    pub fn new(api: Arc<ApiClient>, top_k: u32) -> Self {
        Self { api, top_k }
    }

    /// Ask about a document. Validation failures make no request; transport or
    /// shape failures come back as a `Failed` exchange with a fixed answer.
    pub async fn ask(
        &self,
        doc_id: Option<&DocId>,
        question: &str,
    ) -> Result<QaExchange, ValidationError> {
        let doc_id = doc_id.ok_or(ValidationError::NoDocumentSelected)?;
        let question = question.trim();
        if question.is_empty() {
            return Err(ValidationError::EmptyQuestion);
        }

        let (answer, sources, status) = match self.try_ask(doc_id, question).await {
            Ok((answer, sources)) => (answer, sources, QaStatus::Answered),
            Err(e) => {
                warn!(doc_id = %doc_id, error = %e, "question failed");
                (QA_FAILURE_MESSAGE.to_string(), vec![], QaStatus::Failed)
            }
        };
        info!(doc_id = %doc_id, ?status, sources = sources.len(), "question resolved");

        Ok(QaExchange {
            doc_id: doc_id.clone(),
            question: question.to_string(),
            answer,
            status,
            sources,
            asked_at: Utc::now(),
        })
    }

    async fn try_ask(
        &self,
        doc_id: &str,
        question: &str,
    ) -> Result<(String, Vec<AnswerSource>), FetchError> {
        let value: Value = self
            .api
            .post_json(
                &QA_PATH,
                &[("top_k", self.top_k.to_string())],
                &QaRequest { question, doc_id },
            )
            .await?;
        let answer = shapes::text_payload(&value, shapes::ANSWER_FIELDS)?;
        Ok((answer, shapes::answer_sources(&value)))
    }
}

/// The QA input field and the most recent exchange.
#[derive(Debug, Default)]
pub struct QaPanel {
    pub input: String,
    last: Option<QaExchange>,
}

impl QaPanel {
    /// The last exchange, only if it belongs to `doc_id`.
    pub fn exchange_for(&self, doc_id: &str) -> Option<&QaExchange> {
        self.last.as_ref().filter(|e| e.doc_id == doc_id)
    }

    /// Submit the current input. The input is left as typed so it can be retried;
    /// on validation failure the previous answer is kept.
    pub async fn submit(
        &mut self,
        client: &QaClient,
        document: Option<&Document>,
    ) -> Result<&QaExchange, ValidationError> {
        let exchange = client.ask(document.map(|d| &d.id), &self.input).await?;
        Ok(&*self.last.insert(exchange))
    }
}
