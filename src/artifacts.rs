use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{shapes, ApiClient};
use crate::docs::types::DocId;
use crate::error::FetchError;

/// Derived results the backend computes per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Summary,
    Flowchart,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Summary, ArtifactKind::Flowchart];

    /// Route under `/nlp/`; the document id follows as its own segment.
    fn route(self) -> &'static str {
        match self {
            ArtifactKind::Summary => "summary",
            ArtifactKind::Flowchart => "visualization",
        }
    }

    fn fields(self) -> &'static [&'static str] {
        match self {
            ArtifactKind::Summary => shapes::SUMMARY_FIELDS,
            ArtifactKind::Flowchart => shapes::FLOWCHART_FIELDS,
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            ArtifactKind::Summary => "Failed to load summary.",
            ArtifactKind::Flowchart => "Failed to load flowchart.",
        }
    }

    pub fn loading_message(self) -> &'static str {
        match self {
            ArtifactKind::Summary => "Fetching summary...",
            ArtifactKind::Flowchart => "Loading flowchart...",
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            ArtifactKind::Summary => "No summary available",
            ArtifactKind::Flowchart => "No flowchart available",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Summary => f.write_str("Summary"),
            ArtifactKind::Flowchart => f.write_str("Flowchart"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// One derived artifact, keyed by the document that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub owner: Option<DocId>,
    pub content: String,
    pub status: ArtifactStatus,
}

impl Artifact {
    pub fn idle(kind: ArtifactKind, owner: Option<DocId>) -> Self {
        Self {
            kind,
            owner,
            content: String::new(),
            status: ArtifactStatus::Idle,
        }
    }

    pub fn loading(kind: ArtifactKind, owner: &DocId) -> Self {
        Self {
            status: ArtifactStatus::Loading,
            ..Self::idle(kind, Some(owner.clone()))
        }
    }

    pub fn ready(kind: ArtifactKind, owner: &DocId, content: String) -> Self {
        Self {
            kind,
            owner: Some(owner.clone()),
            content,
            status: ArtifactStatus::Ready,
        }
    }

    /// Carries the fixed fallback message as its content.
    pub fn failed(kind: ArtifactKind, owner: &DocId) -> Self {
        Self {
            kind,
            owner: Some(owner.clone()),
            content: kind.failure_message().to_string(),
            status: ArtifactStatus::Failed,
        }
    }
}

/// Resolves Summary and Flowchart artifacts. Failures never escape: they come
/// back as a `Failed` artifact.
pub struct ArtifactFetcher {
    api: Arc<ApiClient>,
}

impl ArtifactFetcher {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn fetch(&self, kind: ArtifactKind, doc_id: &DocId) -> Artifact {
        match self.try_fetch(kind, doc_id).await {
            Ok(content) => {
                debug!(doc_id = %doc_id, %kind, len = content.len(), "artifact ready");
                Artifact::ready(kind, doc_id, content)
            }
            Err(e) => {
                warn!(doc_id = %doc_id, %kind, error = %e, "artifact fetch failed");
                Artifact::failed(kind, doc_id)
            }
        }
    }

    async fn try_fetch(&self, kind: ArtifactKind, doc_id: &DocId) -> Result<String, FetchError> {
        let value = self.api.get_json(&["nlp", kind.route(), doc_id.as_str()]).await?;
        Ok(shapes::text_payload(&value, kind.fields())?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ClientConfig;

    fn fetcher_for(server: &MockServer) -> ArtifactFetcher {
        let config = ClientConfig::default().with_base_url(server.uri());
        ArtifactFetcher::new(Arc::new(ApiClient::new(&config).unwrap()))
    }

    #[tokio::test]
    async fn test_summary_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nlp/summary/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "Seven things."})))
            .mount(&server)
            .await;

        let artifact = fetcher_for(&server)
            .fetch(ArtifactKind::Summary, &"7".to_string())
            .await;
        assert_eq!(artifact.status, ArtifactStatus::Ready);
        assert_eq!(artifact.content, "Seven things.");
        assert_eq!(artifact.owner.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_flowchart_chart_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nlp/visualization/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chart": "graph TD\nN0-->N1"})))
            .mount(&server)
            .await;

        let artifact = fetcher_for(&server)
            .fetch(ArtifactKind::Flowchart, &"7".to_string())
            .await;
        assert_eq!(artifact, Artifact::ready(ArtifactKind::Flowchart, &"7".to_string(), "graph TD\nN0-->N1".into()));
    }

    #[tokio::test]
    async fn test_server_error_is_absorbed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let artifact = fetcher_for(&server)
            .fetch(ArtifactKind::Summary, &"7".to_string())
            .await;
        assert_eq!(artifact.status, ArtifactStatus::Failed);
        assert_eq!(artifact.content, "Failed to load summary.");
    }

    #[tokio::test]
    async fn test_unrecognized_payload_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "Provide file or raw_text"})))
            .mount(&server)
            .await;

        let artifact = fetcher_for(&server)
            .fetch(ArtifactKind::Flowchart, &"7".to_string())
            .await;
        assert_eq!(artifact.status, ArtifactStatus::Failed);
        assert_eq!(artifact.content, "Failed to load flowchart.");
    }

    #[tokio::test]
    async fn test_opaque_id_stays_one_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nlp/summary/reports%2F2024%23q1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("Q1 report.")))
            .expect(1)
            .mount(&server)
            .await;

        let artifact = fetcher_for(&server)
            .fetch(ArtifactKind::Summary, &"reports/2024#q1".to_string())
            .await;
        assert_eq!(artifact.status, ArtifactStatus::Ready);
        assert_eq!(artifact.content, "Q1 report.");
    }
}
