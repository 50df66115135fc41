use anyhow::Result;
use tracing::info;

use crate::console::Console;
use crate::session::orchestrator::DeleteOutcome;
use crate::state::AppState;

use super::view::render_documents;

pub async fn list(app: &mut AppState, console: &mut Console) {
    app.session.refresh_documents().await;
    console.say(render_documents(app.session.state()));
}

pub async fn select(app: &mut AppState, console: &mut Console, id: &str) {
    if app.session.state().was_deleted(id) {
        console.say(format!("Document {} was deleted.", id));
        return;
    }
    if app.session.select_by_id(id).await {
        if let Some(doc) = &app.session.state().selected {
            console.say(format!("Selected {}. Loading summary and flowchart...", doc.filename));
        }
    } else {
        console.say(format!("No document with id {}. Use `list` to see documents.", id));
    }
}

pub async fn clear(app: &mut AppState, console: &mut Console) {
    app.session.select_document(None).await;
    console.say("Select or upload a document to begin.");
}

pub async fn delete(app: &mut AppState, console: &mut Console, id: &str) -> Result<()> {
    if app.session.state().was_deleted(id) {
        console.say(format!("Document {} was already deleted.", id));
        return Ok(());
    }
    let Some(document) = app.session.resolve_document(id).await else {
        console.say(format!("No document with id {}. Use `list` to see documents.", id));
        return Ok(());
    };
    let name = document.filename;

    let confirmed = console
        .confirm(&format!("Delete {}? This cannot be undone.", name))
        .await?;

    match app.session.delete_document(&document.id, confirmed).await {
        Ok(DeleteOutcome::Declined) => console.say("Delete cancelled."),
        Ok(DeleteOutcome::Deleted) => {
            info!(doc_id = id, "deleted via console");
            console.say(format!("Deleted {}.", name));
            console.say(render_documents(app.session.state()));
        }
        Err(e) => console.alert(format!("Failed to delete {}: {}", name, e)),
    }
    Ok(())
}
