use std::io::Write;
use std::path::PathBuf;

use crate::console::Console;
use crate::error::UploadError;
use crate::state::AppState;

pub async fn upload(app: &mut AppState, console: &mut Console, path: Option<PathBuf>) {
    let mut progress = app.session.uploader().progress();
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let pct = *progress.borrow_and_update();
            if pct > 0 {
                print!("\rUploading... {}%", pct);
                let _ = std::io::stdout().flush();
            }
        }
    });

    let result = app.session.upload(path.as_deref()).await;
    printer.abort();

    match result {
        Ok(doc) => {
            console.say(format!("\rUploaded {} (id: {}).", doc.filename, doc.id));
            if app.session.state().selected.as_ref() == Some(&doc) {
                console.say("Loading summary and flowchart... (`wait` to block until ready)");
            }
        }
        Err(UploadError::Validation(e)) => console.say(e.prompt()),
        Err(e) => console.alert(format!("Failed to upload document: {}", e)),
    }
}
