use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Line-oriented terminal I/O for the REPL.
pub struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Next input line, `None` at end of input. Cancel safe.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        self.lines.next_line().await.context("Failed to read stdin")
    }

    pub fn prompt(&self) {
        print!("> ");
        let _ = std::io::stdout().flush();
    }

    pub fn say(&self, text: impl AsRef<str>) {
        println!("{}", text.as_ref());
    }

    /// A message the user must not miss (failed upload or delete).
    pub fn alert(&self, text: impl AsRef<str>) {
        println!("!! {}", text.as_ref());
    }

    /// Ask a yes/no question. Anything but an explicit yes is a no.
    pub async fn confirm(&mut self, question: &str) -> Result<bool> {
        print!("{} [y/N] ", question);
        let _ = std::io::stdout().flush();
        let answer = self.next_line().await?.unwrap_or_default();
        Ok(is_yes(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }
}
