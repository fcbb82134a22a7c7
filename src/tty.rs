//! Terminal I/O utilities for the CLI.

use std::io::{self, BufRead, IsTerminal, Write};

pub fn is_stdin_tty() -> bool {
    io::stdin().is_terminal()
}

/// Prompt on stderr and read one trimmed line from stdin.
pub fn prompt(message: &str) -> stagehand::Result<String> {
    eprint!("{}", message);
    io::stderr().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line).map_err(|e| {
        stagehand::Error::internal_io(
            format!("Failed to read input: {}", e),
            Some("prompt".to_string()),
        )
    })?;

    Ok(line.trim().to_string())
}
