mod ask;
mod config;
mod documents;
mod upload;
mod view;

use std::path::PathBuf;

use anyhow::Result;

use crate::console::Console;
use crate::state::AppState;

pub use view::render_documents;

const HELP: &str = "\
Commands:
  list                 refresh and show the document list
  upload <path>        upload a file and select it
  select <id>          select a listed document
  clear                clear the selection
  ask <question>       ask about the selected document
  retry                resend the last question as typed
  delete <id>          delete a document (asks for confirmation)
  show                 show the selected document's panels
  wait                 wait for pending summary/flowchart loads, then show
  config               show the client configuration
  help                 this text
  quit                 exit";

/// A parsed REPL line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    List,
    Upload(Option<PathBuf>),
    Select(String),
    Clear,
    Ask(String),
    Retry,
    Delete(String),
    Show,
    Wait,
    Config,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Command::Empty,
            "list" | "ls" => Command::List,
            "upload" => Command::Upload((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "select" if !rest.is_empty() => Command::Select(rest.to_string()),
            "select" => Command::Invalid("usage: select <id>".into()),
            "clear" => Command::Clear,
            "ask" => Command::Ask(rest.to_string()),
            "retry" => Command::Retry,
            "delete" | "rm" if !rest.is_empty() => Command::Delete(rest.to_string()),
            "delete" | "rm" => Command::Invalid("usage: delete <id>".into()),
            "show" => Command::Show,
            "wait" => Command::Wait,
            "config" => Command::Config,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Invalid(format!("unknown command `{}`, try `help`", other)),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub async fn run(app: &mut AppState, console: &mut Console, command: Command) -> Result<Flow> {
    match command {
        Command::Empty => {}
        Command::List => documents::list(app, console).await,
        Command::Upload(path) => upload::upload(app, console, path).await,
        Command::Select(id) => documents::select(app, console, &id).await,
        Command::Clear => documents::clear(app, console).await,
        Command::Ask(question) => ask::ask(app, console, Some(question)).await,
        Command::Retry => ask::ask(app, console, None).await,
        Command::Delete(id) => documents::delete(app, console, &id).await?,
        Command::Show => view::show(app, console),
        Command::Wait => {
            app.session.settle().await;
            view::show(app, console);
        }
        Command::Config => config::config(app, console),
        Command::Help => console.say(HELP),
        Command::Quit => return Ok(Flow::Quit),
        Command::Invalid(message) => console.say(message),
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload() {
        assert_eq!(
            Command::parse("upload  ./docs/report 2024.pdf "),
            Command::Upload(Some(PathBuf::from("./docs/report 2024.pdf")))
        );
        assert_eq!(Command::parse("upload"), Command::Upload(None));
    }

    #[test]
    fn test_parse_ask_keeps_question() {
        assert_eq!(
            Command::parse("ask What does section 2 say?"),
            Command::Ask("What does section 2 say?".into())
        );
        assert_eq!(Command::parse("ask"), Command::Ask(String::new()));
    }

    #[test]
    fn test_parse_select_and_delete() {
        assert_eq!(Command::parse("select 42"), Command::Select("42".into()));
        assert_eq!(Command::parse("RM 7"), Command::Delete("7".into()));
        assert!(matches!(Command::parse("select"), Command::Invalid(_)));
        assert!(matches!(Command::parse("delete"), Command::Invalid(_)));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(Command::parse("ls"), Command::List);
        assert_eq!(Command::parse("exit"), Command::Quit);
        assert!(matches!(Command::parse("frobnicate"), Command::Invalid(_)));
    }
}
