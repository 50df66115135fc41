//! Session state as a value: `apply(old state, event) -> (new state, effects)`.
//!
//! Nothing in here performs I/O. The [`orchestrator`] runs the effects and feeds
//! results back in as events.

pub mod orchestrator;

use std::collections::HashSet;

use crate::artifacts::{Artifact, ArtifactKind, ArtifactStatus};
use crate::docs::types::{DocId, Document};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Select(Option<Document>),
    SetProcessing(bool),
    ArtifactResolved { generation: u64, artifact: Artifact },
    DocumentsListed(Vec<Document>),
    DocumentsListFailed(String),
    DocumentDeleted(DocId),
    UploadCompleted { document: Document, auto_select: bool },
}

/// Work the runtime must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch every artifact kind for `document`, tagged with `generation`.
    /// Supersedes any fetches already in flight.
    FetchArtifacts { document: Document, generation: u64 },
    CancelFetches,
    RefreshDocuments,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub selected: Option<Document>,
    /// While set, the main view shows only the loader and selection fetches wait.
    pub processing: bool,
    /// Bumped on every selection change; results tagged with an older value are dropped.
    pub generation: u64,
    pub summary: Artifact,
    pub flowchart: Artifact,
    pub documents: Vec<Document>,
    pub documents_error: Option<String>,
    deleted: HashSet<DocId>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            selected: None,
            processing: false,
            generation: 0,
            summary: Artifact::idle(ArtifactKind::Summary, None),
            flowchart: Artifact::idle(ArtifactKind::Flowchart, None),
            documents: Vec::new(),
            documents_error: None,
            deleted: HashSet::new(),
        }
    }
}

impl SessionState {
    pub fn artifact(&self, kind: ArtifactKind) -> &Artifact {
        match kind {
            ArtifactKind::Summary => &self.summary,
            ArtifactKind::Flowchart => &self.flowchart,
        }
    }

    fn artifact_mut(&mut self, kind: ArtifactKind) -> &mut Artifact {
        match kind {
            ArtifactKind::Summary => &mut self.summary,
            ArtifactKind::Flowchart => &mut self.flowchart,
        }
    }

    pub fn is_loading(&self) -> bool {
        ArtifactKind::ALL
            .iter()
            .any(|k| self.artifact(*k).status == ArtifactStatus::Loading)
    }

    pub fn find_document(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn was_deleted(&self, id: &str) -> bool {
        self.deleted.contains(id)
    }

    /// Whether a result from `generation` for `owner` may be applied now.
    pub fn accepts(&self, generation: u64, owner: Option<&DocId>) -> bool {
        generation == self.generation
            && owner.is_some()
            && self.selected.as_ref().map(|d| &d.id) == owner
    }

    pub fn apply(mut self, event: SessionEvent) -> (Self, Vec<Effect>) {
        let mut effects = Vec::new();
        match event {
            SessionEvent::Select(document) => self.select(document, &mut effects),
            SessionEvent::SetProcessing(true) => self.processing = true,
            SessionEvent::SetProcessing(false) => self.finish_processing(&mut effects),
            SessionEvent::ArtifactResolved {
                generation,
                artifact,
            } => {
                if self.accepts(generation, artifact.owner.as_ref()) {
                    let kind = artifact.kind;
                    *self.artifact_mut(kind) = artifact;
                }
            }
            SessionEvent::DocumentsListed(documents) => {
                self.documents = documents
                    .into_iter()
                    .filter(|d| !self.deleted.contains(&d.id))
                    .collect();
                self.documents_error = None;
            }
            SessionEvent::DocumentsListFailed(reason) => self.documents_error = Some(reason),
            SessionEvent::DocumentDeleted(id) => {
                self.documents.retain(|d| d.id != id);
                if self.selected.as_ref().is_some_and(|d| d.id == id) {
                    self.select(None, &mut effects);
                }
                self.deleted.insert(id);
                effects.push(Effect::RefreshDocuments);
            }
            SessionEvent::UploadCompleted {
                document,
                auto_select,
            } => {
                self.deleted.remove(&document.id);
                if self.find_document(&document.id).is_none() {
                    self.documents.push(document.clone());
                }
                effects.push(Effect::RefreshDocuments);
                if auto_select {
                    self.processing = false;
                    self.select(Some(document), &mut effects);
                } else {
                    self.finish_processing(&mut effects);
                }
            }
        }
        (self, effects)
    }

    fn select(&mut self, document: Option<Document>, effects: &mut Vec<Effect>) {
        let Some(document) = document else {
            self.selected = None;
            self.generation += 1;
            self.reset_artifacts(None);
            effects.push(Effect::CancelFetches);
            return;
        };
        // A document deleted during this session can't be selected again.
        if self.deleted.contains(&document.id) {
            return;
        }

        self.generation += 1;
        if self.processing {
            self.reset_artifacts(Some(&document.id));
            effects.push(Effect::CancelFetches);
        } else {
            self.start_loading(&document.id);
            effects.push(Effect::FetchArtifacts {
                document: document.clone(),
                generation: self.generation,
            });
        }
        self.selected = Some(document);
    }

    /// Clears the gate and starts any fetch a selection made during processing deferred.
    fn finish_processing(&mut self, effects: &mut Vec<Effect>) {
        self.processing = false;
        let Some(document) = self.selected.clone() else {
            return;
        };
        if self.summary.status == ArtifactStatus::Idle {
            self.start_loading(&document.id);
            effects.push(Effect::FetchArtifacts {
                document,
                generation: self.generation,
            });
        }
    }

    fn reset_artifacts(&mut self, owner: Option<&DocId>) {
        for kind in ArtifactKind::ALL {
            *self.artifact_mut(kind) = Artifact::idle(kind, owner.cloned());
        }
    }

    fn start_loading(&mut self, owner: &DocId) {
        for kind in ArtifactKind::ALL {
            *self.artifact_mut(kind) = Artifact::loading(kind, owner);
        }
    }
}
