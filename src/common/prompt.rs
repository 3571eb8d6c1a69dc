use colored::*;
use std::io::{BufRead, Write};

/// Blocking yes/no question put to the user before anything is deleted.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str, default: bool) -> bool;
}

/// Asks on stdout and reads the answer from stdin.
/// An empty answer or a read failure selects the default.
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str, default: bool) -> bool {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        print!("\n  {} {} {} ", "❓", prompt, hint.dimmed());
        if std::io::stdout().flush().is_err() {
            return default;
        }

        let mut input = String::new();
        match std::io::stdin().lock().read_line(&mut input) {
            Ok(0) | Err(_) => default,
            Ok(_) => parse_answer(&input, default),
        }
    }
}

/// Answers every question the same way; for non-interactive runs.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, prompt: &str, _default: bool) -> bool {
        tracing::debug!(prompt, answer = self.0, "auto-answered confirmation");
        self.0
    }
}

fn parse_answer(input: &str, default: bool) -> bool {
    match input.trim().to_ascii_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}
