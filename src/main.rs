mod api;
mod artifacts;
mod commands;
mod config;
mod console;
mod docs;
mod error;
mod qa;
mod session;
mod state;

use tracing::{debug, info};

use commands::{Command, Flow};
use config::ClientConfig;
use console::Console;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load env
    let _ = dotenv::dotenv();
    let config = ClientConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .init();

    info!(base_url = %config.base_url, "Starting document client");

    let mut app = AppState::new(config)?;
    let mut console = Console::stdin();

    console.say("Document Intelligence. Type `help` for commands.");
    app.session.refresh_documents().await;
    console.say(commands::render_documents(app.session.state()));
    console.prompt();

    loop {
        tokio::select! {
            line = console.next_line() => {
                let Some(line) = line? else { break };
                let command = Command::parse(&line);
                debug!(?command, "command");
                if commands::run(&mut app, &mut console, command).await? == Flow::Quit {
                    break;
                }
                console.prompt();
            }
            Some(update) = app.session.next_update() => {
                let was_loading = app.session.state().is_loading();
                app.session.apply_update(update);
                if was_loading && !app.session.state().is_loading() {
                    if let Some(doc) = &app.session.state().selected {
                        console.say(format!("\nPanels ready for {}. Type `show` to view.", doc.filename));
                        console.prompt();
                    }
                }
            }
        }
    }

    info!("Document client exiting");
    Ok(())
}
