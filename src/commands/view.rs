use std::fmt::Write;

use crate::artifacts::{Artifact, ArtifactKind, ArtifactStatus};
use crate::console::Console;
use crate::qa::{QaExchange, QaPanel, QaStatus, NO_ANSWER_MESSAGE};
use crate::session::SessionState;
use crate::state::AppState;

pub fn show(app: &AppState, console: &Console) {
    console.say(render_main(app.session.state(), &app.qa_panel));
}

fn artifact_body(artifact: &Artifact) -> String {
    match artifact.status {
        ArtifactStatus::Idle => String::new(),
        ArtifactStatus::Loading => artifact.kind.loading_message().to_string(),
        ArtifactStatus::Failed => artifact.content.clone(),
        ArtifactStatus::Ready if artifact.content.trim().is_empty() => {
            artifact.kind.empty_message().to_string()
        }
        ArtifactStatus::Ready => match artifact.kind {
            ArtifactKind::Summary => artifact.content.clone(),
            // Diagram markup is printed as-is.
            ArtifactKind::Flowchart => artifact
                .content
                .lines()
                .map(|l| format!("    {}", l))
                .collect::<Vec<_>>()
                .join("\n"),
        },
    }
}

pub fn render_exchange(exchange: &QaExchange) -> String {
    let answer = if exchange.status == QaStatus::Answered && exchange.answer.trim().is_empty() {
        NO_ANSWER_MESSAGE
    } else {
        exchange.answer.as_str()
    };
    let mut out = format!(
        "Q: {}  [{}]\nA: {}",
        exchange.question,
        exchange.asked_at.format("%H:%M:%S UTC"),
        answer
    );
    if !exchange.sources.is_empty() {
        out.push_str("\nSources:");
        for source in &exchange.sources {
            let name = source.source.as_deref().unwrap_or("passage");
            match source.score {
                Some(score) => {
                    let _ = write!(out, "\n  - {} ({:.2}): {}", name, score, source.snippet);
                }
                None => {
                    let _ = write!(out, "\n  - {}: {}", name, source.snippet);
                }
            }
        }
    }
    out
}

/// The main view: loader, empty prompt, or the three panels.
pub fn render_main(state: &SessionState, panel: &QaPanel) -> String {
    if state.processing {
        return "Processing document...".to_string();
    }
    let Some(doc) = &state.selected else {
        return "Select or upload a document to begin.".to_string();
    };

    let mut out = format!("== {} (id: {}) ==", doc.filename, doc.id);
    for kind in ArtifactKind::ALL {
        let _ = write!(out, "\n\n[{}]\n{}", kind, artifact_body(state.artifact(kind)));
    }
    out.push_str("\n\n[Questions]\n");
    match panel.exchange_for(&doc.id) {
        Some(exchange) => out.push_str(&render_exchange(exchange)),
        None => out.push_str("Ask a question with `ask <question>`."),
    }
    out
}

pub fn render_documents(state: &SessionState) -> String {
    let mut out = String::from("Documents");
    if state.documents.is_empty() {
        out.push_str("\n  No documents yet");
    }
    let selected = state.selected.as_ref().map(|d| d.id.as_str());
    for doc in &state.documents {
        let marker = if Some(doc.id.as_str()) == selected { '>' } else { ' ' };
        let _ = write!(out, "\n{} {}  (id: {})", marker, doc.filename, doc.id);
    }
    if state.documents_error.is_some() {
        out.push_str("\n  Failed to load documents.");
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::api::shapes::AnswerSource;
    use crate::docs::types::Document;
    use crate::session::SessionEvent;

    fn selected(id: &str) -> SessionState {
        SessionState::default()
            .apply(SessionEvent::Select(Some(Document::new(id, "a.pdf"))))
            .0
    }

    #[test]
    fn test_nothing_selected() {
        let view = render_main(&SessionState::default(), &QaPanel::default());
        assert_eq!(view, "Select or upload a document to begin.");
    }

    #[test]
    fn test_processing_hides_panels() {
        let state = selected("1").apply(SessionEvent::SetProcessing(true)).0;
        assert_eq!(render_main(&state, &QaPanel::default()), "Processing document...");
    }

    #[test]
    fn test_loading_and_failed_panels() {
        let state = selected("1")
            .apply(SessionEvent::ArtifactResolved {
                generation: 1,
                artifact: Artifact::failed(ArtifactKind::Summary, &"1".into()),
            })
            .0;
        let view = render_main(&state, &QaPanel::default());
        assert!(view.starts_with("== a.pdf (id: 1) =="));
        assert!(view.contains("[Summary]\nFailed to load summary."));
        assert!(view.contains("[Flowchart]\nLoading flowchart..."));
        assert!(view.contains("ask <question>"));
    }

    #[test]
    fn test_empty_ready_artifacts_show_placeholder() {
        let state = ArtifactKind::ALL.iter().fold(selected("1"), |state, kind| {
            state
                .apply(SessionEvent::ArtifactResolved {
                    generation: 1,
                    artifact: Artifact::ready(*kind, &"1".into(), String::new()),
                })
                .0
        });
        let view = render_main(&state, &QaPanel::default());
        assert!(view.contains("No summary available"));
        assert!(view.contains("No flowchart available"));
    }

    #[test]
    fn test_flowchart_markup_is_indented() {
        let state = selected("1")
            .apply(SessionEvent::ArtifactResolved {
                generation: 1,
                artifact: Artifact::ready(ArtifactKind::Flowchart, &"1".into(), "graph TD\nN0-->N1".into()),
            })
            .0;
        let view = render_main(&state, &QaPanel::default());
        assert!(view.contains("[Flowchart]\n    graph TD\n    N0-->N1"));
    }

    #[test]
    fn test_render_exchange() {
        let exchange = QaExchange {
            doc_id: "1".into(),
            question: "What?".into(),
            answer: String::new(),
            status: QaStatus::Answered,
            sources: vec![AnswerSource {
                score: Some(0.734),
                source: Some("a.pdf".into()),
                snippet: "Some passage".into(),
            }],
            asked_at: DateTime::from_timestamp(45_296, 0).unwrap(),
        };
        assert_eq!(
            render_exchange(&exchange),
            "Q: What?  [12:34:56 UTC]\nA: No answer found.\nSources:\n  - a.pdf (0.73): Some passage"
        );
    }

    #[test]
    fn test_render_documents() {
        let state = selected("2")
            .apply(SessionEvent::DocumentsListed(vec![
                Document::new("1", "x.pdf"),
                Document::new("2", "a.pdf"),
            ]))
            .0;
        assert_eq!(
            render_documents(&state),
            "Documents\n  x.pdf  (id: 1)\n> a.pdf  (id: 2)"
        );

        let empty = SessionState::default()
            .apply(SessionEvent::DocumentsListFailed("boom".into()))
            .0;
        assert_eq!(
            render_documents(&empty),
            "Documents\n  No documents yet\n  Failed to load documents."
        );
    }
}
