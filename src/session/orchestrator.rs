use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::artifacts::{Artifact, ArtifactFetcher, ArtifactKind};
use crate::docs::types::{DocId, Document};
use crate::docs::upload::UploadCoordinator;
use crate::docs::DocumentRegistry;
use crate::error::{TransportError, UploadError};

use super::{Effect, SessionEvent, SessionState};

/// A resolved artifact on its way back to the session.
#[derive(Debug)]
pub struct ArtifactUpdate {
    pub generation: u64,
    pub artifact: Artifact,
}

/// An in-flight fetch keyed by (document id, artifact kind).
struct FetchTask {
    doc_id: DocId,
    kind: ArtifactKind,
    handle: JoinHandle<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

/// Owns the session state and runs the effects its transitions ask for.
///
/// Artifact fetches run as independent tasks and report back over a channel;
/// callers drain it with [`Orchestrator::next_update`] / [`Orchestrator::apply_update`]
/// or [`Orchestrator::settle`].
pub struct Orchestrator {
    state: SessionState,
    registry: DocumentRegistry,
    fetcher: Arc<ArtifactFetcher>,
    uploader: UploadCoordinator,
    auto_select: bool,
    tasks: Vec<FetchTask>,
    tx: mpsc::UnboundedSender<ArtifactUpdate>,
    rx: mpsc::UnboundedReceiver<ArtifactUpdate>,
}

impl Orchestrator {
    pub fn new(
        registry: DocumentRegistry,
        fetcher: ArtifactFetcher,
        uploader: UploadCoordinator,
        auto_select: bool,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::default(),
            registry,
            fetcher: Arc::new(fetcher),
            uploader,
            auto_select,
            tasks: Vec::new(),
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn uploader(&self) -> &UploadCoordinator {
        &self.uploader
    }

    /// Apply an event and run the resulting effects.
    pub async fn dispatch(&mut self, event: SessionEvent) {
        if self.commit(event) {
            self.refresh_documents().await;
        }
    }

    pub async fn select_document(&mut self, document: Option<Document>) {
        match &document {
            Some(d) => info!(doc_id = %d.id, filename = %d.filename, "document selected"),
            None => info!("selection cleared"),
        }
        self.dispatch(SessionEvent::Select(document)).await;
    }

    /// Look an id up in the listing, re-listing once if it is not there yet.
    /// Ids deleted in this session never resolve.
    pub async fn resolve_document(&mut self, id: &str) -> Option<Document> {
        if self.state.was_deleted(id) {
            debug!(doc_id = id, "ignoring deleted document");
            return None;
        }
        if self.state.find_document(id).is_none() {
            self.refresh_documents().await;
        }
        self.state.find_document(id).cloned()
    }

    /// Select a listed document by id. Returns false when the id is unknown or
    /// was deleted in this session; nothing is fetched in that case.
    pub async fn select_by_id(&mut self, id: &str) -> bool {
        let Some(document) = self.resolve_document(id).await else {
            return false;
        };
        self.select_document(Some(document)).await;
        true
    }

    pub async fn set_processing(&mut self, processing: bool) {
        self.dispatch(SessionEvent::SetProcessing(processing)).await;
    }

    pub async fn on_upload_complete(&mut self, document: Document) {
        self.dispatch(SessionEvent::UploadCompleted {
            document,
            auto_select: self.auto_select,
        })
        .await;
    }

    /// Upload a file. `processing` is raised just before the request goes out
    /// and lowered on every exit path after it.
    pub async fn upload(&mut self, file: Option<&Path>) -> Result<Document, UploadError> {
        let pending = self.uploader.prepare(file).await?;
        info!(filename = pending.filename(), size = pending.len(), "processing started");
        self.set_processing(true).await;
        match self.uploader.send(pending).await {
            Ok(document) => {
                self.on_upload_complete(document.clone()).await;
                Ok(document)
            }
            Err(e) => {
                warn!(error = %e, "upload failed");
                self.set_processing(false).await;
                Err(e)
            }
        }
    }

    /// Re-list documents. Failures are absorbed into `documents_error`.
    pub async fn refresh_documents(&mut self) {
        let event = match self.registry.list().await {
            Ok(documents) => SessionEvent::DocumentsListed(documents),
            Err(e) => {
                warn!(error = %e, "listing documents failed");
                SessionEvent::DocumentsListFailed(e.to_string())
            }
        };
        self.commit(event);
    }

    /// Delete a document once the user has confirmed. Transport failures are
    /// returned so the caller can alert.
    pub async fn delete_document(
        &mut self,
        id: &DocId,
        confirmed: bool,
    ) -> Result<DeleteOutcome, TransportError> {
        if !confirmed {
            return Ok(DeleteOutcome::Declined);
        }
        self.registry.delete(id).await?;
        self.dispatch(SessionEvent::DocumentDeleted(id.clone())).await;
        Ok(DeleteOutcome::Deleted)
    }

    /// Wait for the next artifact result from any fetch task.
    pub async fn next_update(&mut self) -> Option<ArtifactUpdate> {
        self.rx.recv().await
    }

    pub fn apply_update(&mut self, update: ArtifactUpdate) {
        if !self
            .state
            .accepts(update.generation, update.artifact.owner.as_ref())
        {
            debug!(
                generation = update.generation,
                current = self.state.generation,
                kind = %update.artifact.kind,
                "discarding stale artifact"
            );
        }
        self.commit(SessionEvent::ArtifactResolved {
            generation: update.generation,
            artifact: update.artifact,
        });
    }

    /// Apply results until no artifact of the current selection is loading.
    pub async fn settle(&mut self) {
        while self.state.is_loading() {
            match self.rx.recv().await {
                Some(update) => self.apply_update(update),
                None => break,
            }
        }
    }

    /// Apply one event. Returns whether a document refresh was requested.
    fn commit(&mut self, event: SessionEvent) -> bool {
        let (next, effects) = std::mem::take(&mut self.state).apply(event);
        self.state = next;

        let mut refresh = false;
        for effect in effects {
            match effect {
                Effect::FetchArtifacts {
                    document,
                    generation,
                } => self.spawn_fetches(document, generation),
                Effect::CancelFetches => self.cancel_fetches(),
                Effect::RefreshDocuments => refresh = true,
            }
        }
        refresh
    }

    fn spawn_fetches(&mut self, document: Document, generation: u64) {
        self.cancel_fetches();
        for kind in ArtifactKind::ALL {
            let fetcher = self.fetcher.clone();
            let tx = self.tx.clone();
            let doc_id = document.id.clone();
            let handle = tokio::spawn(async move {
                let artifact = fetcher.fetch(kind, &doc_id).await;
                let _ = tx.send(ArtifactUpdate {
                    generation,
                    artifact,
                });
            });
            self.tasks.push(FetchTask {
                doc_id: document.id.clone(),
                kind,
                handle,
            });
        }
        debug!(doc_id = %document.id, generation, "artifact fetches started");
    }

    fn cancel_fetches(&mut self) {
        for task in self.tasks.drain(..) {
            if !task.handle.is_finished() {
                debug!(doc_id = %task.doc_id, kind = %task.kind, "aborting superseded fetch");
                task.handle.abort();
            }
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.cancel_fetches();
    }
}
