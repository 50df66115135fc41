use crate::console::Console;
use crate::state::AppState;

/// Show the effective client configuration.
pub fn config(app: &AppState, console: &Console) {
    let c = &app.config;
    console.say(format!(
        "Configuration:\n\
         \x20 API_BASE_URL: {}\n\
         \x20 FETCH_TIMEOUT_SECS: {}\n\
         \x20 UPLOAD_TIMEOUT_SECS: {}\n\
         \x20 QA_TOP_K: {}\n\
         \x20 AUTO_SELECT_UPLOADS: {}\n\
         \x20 upload flags: extract={} save_to_db={} create_embeddings={}",
        c.base_url,
        c.fetch_timeout.as_secs(),
        c.upload_timeout.as_secs(),
        c.qa_top_k,
        c.auto_select_uploads,
        c.upload_flags.extract,
        c.upload_flags.save_to_db,
        c.upload_flags.create_embeddings,
    ));
}
