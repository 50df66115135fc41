use crate::console::Console;
use crate::state::AppState;

use super::view::render_exchange;

/// Ask about the selected document. `None` resends the input as it stands.
pub async fn ask(app: &mut AppState, console: &mut Console, question: Option<String>) {
    if let Some(question) = question {
        app.qa_panel.input = question;
    }

    let selected = app.session.state().selected.clone();
    match app.qa_panel.submit(&app.qa, selected.as_ref()).await {
        Ok(exchange) => console.say(render_exchange(exchange)),
        Err(e) => console.say(e.prompt()),
    }
}
